//! Schema Model
//!
//! マージ済みスキーマJSONを、属性定義の閉じた型付き表現に変換します。
//!
//! 属性定義のJSON表現:
//!
//! ```json
//! { "default": "DC1" }
//! { "column": "BD" }
//! { "column": "AE", "enum": { "YES": "Y", "NO": "N" } }
//! ```
//!
//! 派生ルールは属性名で決まります（`NODEID`, `TIMEFROM`, `CYCLIC_TYPE`など）。
//! 派生ルールの属性では`default` / `column`は補正がない場合のフォールバックになります。

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::XlsxJobsError;
use crate::schema::ATTRIBUTES_KEY;

/// マージ済みの属性マッピングスキーマ
///
/// 変換要求ごとに1回構築され、以後は変更されません。
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSchema {
    /// グループ要素（FOLDER）
    pub folder: ElementSchema,
    /// 子要素（JOB）
    pub job: ElementSchema,
    /// 変数要素（VARIABLE）の定義。宣言順に1行あたり1要素ずつ出力
    pub variables: Vec<ElementSchema>,
    /// 数量チェック要素（QUANTITATIVE）の追加属性
    pub quantitative: ElementSchema,
    /// 通知ブロック（ON / DOMAIL）
    pub notification: NotificationSchema,
}

/// 1つの出力要素の属性定義（宣言順）
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSchema {
    /// 要素名
    pub name: String,
    /// 属性定義（宣言順）
    pub attributes: Vec<AttributeDef>,
}

/// 通知ブロックのスキーマ
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSchema {
    /// `ON`要素
    pub on: ElementSchema,
    /// `ON`の子要素`DOMAIL`
    pub mail: ElementSchema,
}

/// 1つの出力属性の定義
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    /// 出力属性名
    pub name: String,
    /// 値の導出ルール
    pub rule: AttributeRule,
}

/// 属性値の導出ルール
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeRule {
    /// デフォルト値または列参照のみ
    Plain(ValueSource),
    /// ノードID。上書き値が指定されていればそれを優先
    NodeId(ValueSource),
    /// 開始/終了時刻。時刻コードの修正があればそれを優先
    Time(TimeBound, ValueSource),
    /// 繰り返し間隔から導出される属性
    Interval(IntervalRole, ValueSource),
    /// 通知修正から導出される属性（ON / DOMAIL内のみ）
    Notification(NotificationField, ValueSource),
}

impl AttributeRule {
    /// フォールバックの値ソース
    pub fn source(&self) -> &ValueSource {
        match self {
            AttributeRule::Plain(source)
            | AttributeRule::NodeId(source)
            | AttributeRule::Time(_, source)
            | AttributeRule::Interval(_, source)
            | AttributeRule::Notification(_, source) => source,
        }
    }
}

/// デフォルト値・列参照による値ソース
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// 定数
    Default(String),
    /// 行の列参照（列挙変換付き）
    Column(ColumnLookup),
    /// 値ソースなし（派生ルールが値を出さなければ属性は省略）
    Unresolvable,
}

/// 列参照
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLookup {
    /// 列文字
    pub key: String,
    /// 列挙変換表（空の場合は変換なし）
    pub enums: BTreeMap<String, String>,
    /// 列挙表を引くキーの作り方
    pub enum_key: EnumKey,
}

/// 列挙表の検索キー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKey {
    /// 値全体を大文字化
    WholeValue,
    /// 空白区切りの2番目のトークンを大文字化（`TASKTYPE`のみ）
    SecondToken,
}

/// 時刻属性の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    From,
    To,
}

/// 繰り返し間隔から導出される属性の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalRole {
    /// `CYCLIC`: 常に`"1"`
    Flag,
    /// `CYCLIC_TYPE`: `C` / `S`
    Kind,
    /// `CYCLIC_TIMES_SEQUENCE`: 時刻列
    Sequence,
    /// `INTERVAL`: `00003H`形式
    Encoding,
    /// `TIMEZONE`: 時刻列のタイムゾーン
    Timezone,
}

/// 通知修正のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationField {
    /// `ON`の`CODE`（リターンコード条件）
    Code,
    /// `DOMAIL`の`DEST`
    Destination,
    /// `DOMAIL`の`SUBJECT`
    Subject,
    /// `DOMAIL`の`MESSAGE`
    Message,
    /// `DOMAIL`の`ATTACH_SYSOUT`
    AttachOutput,
}

impl NotificationField {
    /// `ON`要素が持つフィールド
    pub const ON: [NotificationField; 1] = [NotificationField::Code];

    /// `DOMAIL`要素が持つフィールド
    pub const MAIL: [NotificationField; 4] = [
        NotificationField::Destination,
        NotificationField::Subject,
        NotificationField::Message,
        NotificationField::AttachOutput,
    ];

    /// 出力属性名
    pub fn attribute_name(&self) -> &'static str {
        match self {
            NotificationField::Code => "CODE",
            NotificationField::Destination => "DEST",
            NotificationField::Subject => "SUBJECT",
            NotificationField::Message => "MESSAGE",
            NotificationField::AttachOutput => "ATTACH_SYSOUT",
        }
    }
}

/// 属性名の解釈範囲（セクションごとに有効な派生ルールが異なる）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Element,
    /// VARIABLE / QUANTITATIVE: 派生ルールなし
    PlainOnly,
    On,
    Mail,
}

impl MergedSchema {
    /// マージ済みスキーマJSONから型付きスキーマを構築する
    ///
    /// # 戻り値
    ///
    /// * `Ok(MergedSchema)` - 構築に成功した場合
    /// * `Err(XlsxJobsError::InvalidSchema)` - `FOLDER` / `JOB` / `ON`が見つからない、
    ///   または属性定義が不正な場合
    pub fn from_value(value: &Value) -> Result<Self, XlsxJobsError> {
        let folder = require_section(value, "FOLDER")?;
        let job = require_section(folder, "JOB")?;
        let on = require_section(job, "ON")?;

        let variables = match find_section(job, "VARIABLE") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let attributes = match item.get(ATTRIBUTES_KEY) {
                        Some(attrs) => attrs,
                        None => item,
                    };
                    parse_element("VARIABLE", attributes, SectionKind::PlainOnly)
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(section) => {
                let variable = parse_section("VARIABLE", section, SectionKind::PlainOnly)?;
                if variable.attributes.is_empty() {
                    Vec::new()
                } else {
                    vec![variable]
                }
            }
            None => Vec::new(),
        };

        let quantitative = match find_section(job, "QUANTITATIVE") {
            Some(section) => parse_section("QUANTITATIVE", section, SectionKind::PlainOnly)?,
            None => ElementSchema::empty("QUANTITATIVE"),
        };

        let mail = match find_section(on, "DOMAIL") {
            Some(section) => parse_section("DOMAIL", section, SectionKind::Mail)?,
            None => ElementSchema::empty("DOMAIL"),
        };

        Ok(Self {
            folder: parse_section("FOLDER", folder, SectionKind::Element)?,
            job: parse_section("JOB", job, SectionKind::Element)?,
            variables,
            quantitative,
            notification: NotificationSchema {
                on: parse_section("ON", on, SectionKind::On)?,
                mail,
            },
        })
    }
}

impl ElementSchema {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
        }
    }

    /// 属性名で属性定義を探す
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// 深さ優先で`name`という名前の最初のセクション（オブジェクトまたは配列）を探す
///
/// `attributes`マップの中は探索しません。
pub(crate) fn find_section<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                if key == ATTRIBUTES_KEY || !(child.is_object() || child.is_array()) {
                    continue;
                }
                if key == name {
                    return Some(child);
                }
                if let Some(found) = find_section(child, name) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| find_section(item, name)),
        _ => None,
    }
}

fn require_section<'a>(node: &'a Value, name: &str) -> Result<&'a Value, XlsxJobsError> {
    find_section(node, name)
        .ok_or_else(|| XlsxJobsError::InvalidSchema(format!("section '{}' not found", name)))
}

fn parse_section(
    name: &str,
    section: &Value,
    kind: SectionKind,
) -> Result<ElementSchema, XlsxJobsError> {
    match section.get(ATTRIBUTES_KEY) {
        Some(attributes) => parse_element(name, attributes, kind),
        None => Ok(ElementSchema::empty(name)),
    }
}

fn parse_element(
    name: &str,
    attributes: &Value,
    kind: SectionKind,
) -> Result<ElementSchema, XlsxJobsError> {
    let map = attributes.as_object().ok_or_else(|| {
        XlsxJobsError::InvalidSchema(format!("attributes of '{}' must be an object", name))
    })?;

    let attributes = map
        .iter()
        .map(|(attr_name, definition)| parse_attribute(name, attr_name, definition, kind))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ElementSchema {
        name: name.to_string(),
        attributes,
    })
}

fn parse_attribute(
    element: &str,
    name: &str,
    definition: &Value,
    kind: SectionKind,
) -> Result<AttributeDef, XlsxJobsError> {
    let invalid = |reason: &str| {
        XlsxJobsError::InvalidSchema(format!("attribute '{}.{}': {}", element, name, reason))
    };

    let map: &Map<String, Value> = definition
        .as_object()
        .ok_or_else(|| invalid("definition must be an object"))?;

    let enum_key = if name == "TASKTYPE" {
        EnumKey::SecondToken
    } else {
        EnumKey::WholeValue
    };

    let source = match (map.get("default"), map.get("column")) {
        (Some(default), _) => ValueSource::Default(
            scalar_text(default).ok_or_else(|| invalid("default must be a scalar"))?,
        ),
        (None, Some(Value::String(key))) => {
            let enums = match map.get("enum") {
                Some(Value::Object(table)) => table
                    .iter()
                    .map(|(k, v)| {
                        scalar_text(v)
                            .map(|v| (k.clone(), v))
                            .ok_or_else(|| invalid("enum values must be scalars"))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?,
                Some(_) => return Err(invalid("enum must be an object")),
                None => BTreeMap::new(),
            };
            ValueSource::Column(ColumnLookup {
                key: key.clone(),
                enums,
                enum_key,
            })
        }
        (None, Some(_)) => return Err(invalid("column must be a string")),
        (None, None) => ValueSource::Unresolvable,
    };

    let rule = classify(name, kind, source);

    if matches!(rule, AttributeRule::Plain(ValueSource::Unresolvable)) {
        return Err(invalid("needs a 'default' or a 'column'"));
    }

    Ok(AttributeDef {
        name: name.to_string(),
        rule,
    })
}

fn classify(name: &str, kind: SectionKind, source: ValueSource) -> AttributeRule {
    match (kind, name) {
        (SectionKind::PlainOnly, _) => AttributeRule::Plain(source),
        (SectionKind::On, "CODE") => AttributeRule::Notification(NotificationField::Code, source),
        (SectionKind::Mail, "DEST") => AttributeRule::Notification(NotificationField::Destination, source),
        (SectionKind::Mail, "SUBJECT") => AttributeRule::Notification(NotificationField::Subject, source),
        (SectionKind::Mail, "MESSAGE") => AttributeRule::Notification(NotificationField::Message, source),
        (SectionKind::Mail, "ATTACH_SYSOUT") => {
            AttributeRule::Notification(NotificationField::AttachOutput, source)
        }
        (SectionKind::On | SectionKind::Mail, _) => AttributeRule::Plain(source),
        (SectionKind::Element, "NODEID") => AttributeRule::NodeId(source),
        (SectionKind::Element, "TIMEFROM") => AttributeRule::Time(TimeBound::From, source),
        (SectionKind::Element, "TIMETO") => AttributeRule::Time(TimeBound::To, source),
        (SectionKind::Element, "CYCLIC") => AttributeRule::Interval(IntervalRole::Flag, source),
        (SectionKind::Element, "CYCLIC_TYPE") => AttributeRule::Interval(IntervalRole::Kind, source),
        (SectionKind::Element, "CYCLIC_TIMES_SEQUENCE") => {
            AttributeRule::Interval(IntervalRole::Sequence, source)
        }
        (SectionKind::Element, "INTERVAL") => AttributeRule::Interval(IntervalRole::Encoding, source),
        (SectionKind::Element, "TIMEZONE") => AttributeRule::Interval(IntervalRole::Timezone, source),
        (SectionKind::Element, _) => AttributeRule::Plain(source),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
