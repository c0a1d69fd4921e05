//! Markup Compiler
//!
//! 行リストをグループキーで連続する区間ごとにまとめ、
//! FOLDER / JOB 階層の要素ツリーを組み立てるモジュール。
//!
//! 出力構造:
//!
//! ```text
//! DEFTABLE
//! └─ FOLDER            （グループの先頭行で属性を解決）
//!    └─ JOB            （1行につき1要素、宣言順に属性を解決）
//!       ├─ VARIABLE    （スキーマの変数定義ごとに1要素）
//!       ├─ QUANTITATIVE（数量チェック列のトークンごとに1要素）
//!       └─ ON          （常に1要素）
//!          └─ DOMAIL
//! ```

use log::{debug, warn};

use crate::api::ColumnLayout;
use crate::correction::Corrections;
use crate::error::XlsxJobsError;
use crate::output::{Document, Element};
use crate::resolver::{resolve_source, Resolution, Resolver};
use crate::schema::{
    AttributeDef, AttributeRule, ElementSchema, MergedSchema, NotificationField, ValueSource,
};
use crate::types::Row;

/// 数量チェック要素の固定属性
const QUANTITATIVE_FIXED: [(&str, &str); 3] = [("QUANT", "1"), ("ONFAIL", "R"), ("ONOK", "R")];

/// 数量チェック要素の名前属性
const QUANTITATIVE_NAME: &str = "NAME";

/// マークアップコンパイラー
///
/// スキーマ・列レイアウト・補正データを読み取り専用で保持します。
/// `compile`は入力だけで結果が決まる純粋な処理です。
pub struct Compiler<'a> {
    schema: &'a MergedSchema,
    layout: &'a ColumnLayout,
    resolver: Resolver<'a>,
}

impl<'a> Compiler<'a> {
    /// 新しいコンパイラーを生成
    pub fn new(
        schema: &'a MergedSchema,
        layout: &'a ColumnLayout,
        corrections: &'a Corrections,
    ) -> Self {
        Self {
            schema,
            layout,
            resolver: Resolver::new(layout, corrections),
        }
    }

    /// 行リストをドキュメントに変換する
    ///
    /// すべての行がグループキーを持つことを最初に検証し、
    /// 1行でも欠けていれば何も出力せずにエラーを返します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Document)` - 変換に成功した場合（行が0件なら空のルートのみ）
    /// * `Err(XlsxJobsError::RowShapeMismatch)` - グループキーのない行がある場合
    pub fn compile(&self, rows: &[Row]) -> Result<Document, XlsxJobsError> {
        let keys = self.group_keys(rows)?;

        let mut folders: Vec<Element> = Vec::new();
        let mut current_key: Option<&str> = None;

        for (row, key) in rows.iter().zip(keys) {
            if current_key != Some(key) {
                debug!("opening group '{}'", key);
                folders.push(self.build_element(&self.schema.folder, row));
                current_key = Some(key);
            }

            let job = self.build_job(row);
            if let Some(folder) = folders.last_mut() {
                folder.push_child(job);
            }
        }

        Ok(Document::new(folders))
    }

    /// 各行のグループキーを取り出す
    fn group_keys<'r>(&self, rows: &'r [Row]) -> Result<Vec<&'r str>, XlsxJobsError> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                row.get(&self.layout.group)
                    .ok_or_else(|| XlsxJobsError::RowShapeMismatch {
                        row: index + 1,
                        column: self.layout.group.clone(),
                    })
            })
            .collect()
    }

    /// スキーマの属性を宣言順に解決して要素を組み立てる（省略された属性は出力しない）
    fn build_element(&self, schema: &ElementSchema, row: &Row) -> Element {
        let mut element = Element::new(schema.name.as_str());
        for def in &schema.attributes {
            if let Resolution::Value(value) = self.resolver.resolve(def, row) {
                element.push_attribute(def.name.as_str(), value);
            }
        }
        element
    }

    fn build_job(&self, row: &Row) -> Element {
        let mut job = self.build_element(&self.schema.job, row);

        for variable in &self.schema.variables {
            job.push_child(self.build_element(variable, row));
        }

        for token in row
            .get(&self.layout.quantitative)
            .into_iter()
            .flat_map(str::split_whitespace)
        {
            job.push_child(self.build_quantitative(token, row));
        }

        job.push_child(self.build_notification(row));
        job
    }

    fn build_quantitative(&self, token: &str, row: &Row) -> Element {
        let mut element = Element::new(self.schema.quantitative.name.as_str())
            .with_attribute(QUANTITATIVE_NAME, token);
        for (name, value) in QUANTITATIVE_FIXED {
            element.push_attribute(name, value);
        }

        // スキーマ側の追加属性（固定属性と同名のものは無視）
        for def in &self.schema.quantitative.attributes {
            if element.has_attribute(&def.name) {
                continue;
            }
            if let Resolution::Value(value) = resolve_source(def.rule.source(), row) {
                element.push_attribute(def.name.as_str(), value);
            }
        }
        element
    }

    /// 通知ブロック（ON / DOMAIL）を組み立てる
    ///
    /// 通知キーに一致する完成した補正があれば、スキーマにない通知フィールドも補って出力します。
    fn build_notification(&self, row: &Row) -> Element {
        let schema = &self.schema.notification;
        let corrected = match self.resolver.notification_for(row) {
            Some(correction) if correction.is_complete() => true,
            Some(correction) => {
                warn!(
                    "notification correction '{}' is incomplete, using schema defaults",
                    correction.key
                );
                false
            }
            None => false,
        };

        let mut on = self.build_element(&schema.on, row);
        let mut mail = self.build_element(&schema.mail, row);

        if corrected {
            self.append_missing_fields(&mut on, &NotificationField::ON, row);
            self.append_missing_fields(&mut mail, &NotificationField::MAIL, row);
        }

        if !mail.attributes.is_empty() {
            on.push_child(mail);
        }
        on
    }

    fn append_missing_fields(&self, element: &mut Element, fields: &[NotificationField], row: &Row) {
        for field in fields {
            let name = field.attribute_name();
            if element.has_attribute(name) {
                continue;
            }
            let def = AttributeDef {
                name: name.to_string(),
                rule: AttributeRule::Notification(*field, ValueSource::Unresolvable),
            };
            if let Resolution::Value(value) = self.resolver.resolve(&def, row) {
                element.push_attribute(name, value);
            }
        }
    }
}

/// 行リストをグループキーで安定ソートする
///
/// 同じグループキーの行の相対順序は保たれます。グループキーのない行は末尾に集まります。
pub fn sort_by_group(rows: &mut [Row], layout: &ColumnLayout) {
    rows.sort_by(|a, b| match (a.get(&layout.group), b.get(&layout.group)) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
