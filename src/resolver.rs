//! Attribute Resolver
//!
//! 1つの属性定義と1つの行から属性値を決定します。
//!
//! # 優先順位
//!
//! 1. ノードIDの上書き（`NODEID`、空でない上書き値があれば無条件に採用）
//! 2. 時刻コードの補正（`TIMEFROM` / `TIMETO`）
//! 3. 繰り返し間隔の補正から導出される属性（`CYCLIC`, `CYCLIC_TYPE`,
//!    `CYCLIC_TIMES_SEQUENCE`, `INTERVAL`, `TIMEZONE`）
//! 4. 通知の補正（`ON` / `DOMAIL`内の`CODE`, `DEST`, `SUBJECT`, `MESSAGE`, `ATTACH_SYSOUT`）
//! 5. デフォルト値 → 列参照（列挙変換付き）
//!
//! どのルールも値を出さなければ属性は省略されます（[`Resolution::Omit`]）。

use crate::api::{ColumnLayout, IntervalKind, IntervalUnit};
use crate::correction::{Corrections, IntervalCorrection, NotificationCorrection};
use crate::normalize::notification_key;
use crate::schema::{
    AttributeDef, AttributeRule, ColumnLookup, EnumKey, IntervalRole, NotificationField,
    TimeBound, ValueSource,
};
use crate::types::Row;

/// 属性の解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 属性を出力する
    Value(String),
    /// 属性を出力しない（エラーではない）
    Omit,
}

impl Resolution {
    /// `Option`として取り出す
    pub fn into_option(self) -> Option<String> {
        match self {
            Resolution::Value(value) => Some(value),
            Resolution::Omit => None,
        }
    }
}

/// 属性リゾルバー
///
/// 列レイアウトと補正データを束ねた読み取り専用のコンテキストです。
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    layout: &'a ColumnLayout,
    corrections: &'a Corrections,
}

impl<'a> Resolver<'a> {
    /// 新しいリゾルバーを生成
    pub fn new(layout: &'a ColumnLayout, corrections: &'a Corrections) -> Self {
        Self {
            layout,
            corrections,
        }
    }

    /// 属性定義を行に対して解決する
    pub fn resolve(&self, def: &AttributeDef, row: &Row) -> Resolution {
        match &def.rule {
            AttributeRule::Plain(source) => resolve_source(source, row),

            AttributeRule::NodeId(source) => match self.corrections.node_id() {
                Some(node_id) => Resolution::Value(node_id.to_string()),
                None => resolve_source(source, row),
            },

            AttributeRule::Time(bound, source) => {
                let column = match bound {
                    TimeBound::From => &self.layout.time_from,
                    TimeBound::To => &self.layout.time_to,
                };
                match row.get(column).and_then(|code| self.corrections.time(code)) {
                    Some(corrected) => Resolution::Value(corrected.to_string()),
                    None => resolve_source(source, row),
                }
            }

            AttributeRule::Interval(role, source) => match self.interval_for(row) {
                Some(correction) => derive_interval(*role, correction),
                None => resolve_source(source, row),
            },

            AttributeRule::Notification(field, source) => {
                match self
                    .notification_for(row)
                    .filter(|c| c.is_complete())
                    .and_then(|correction| notification_value(*field, correction))
                {
                    Some(value) => Resolution::Value(value),
                    None => resolve_source(source, row),
                }
            }
        }
    }

    /// 行の間隔コードに対応する補正
    pub fn interval_for(&self, row: &Row) -> Option<&'a IntervalCorrection> {
        row.get(&self.layout.interval)
            .and_then(|code| self.corrections.interval(code))
    }

    /// 行の通知キーに対応する補正（未完成のものも含む）
    pub fn notification_for(&self, row: &Row) -> Option<&'a NotificationCorrection> {
        row.get(&self.layout.notification)
            .and_then(|source| self.corrections.notification(&notification_key(source)))
    }
}

/// デフォルト値・列参照による解決
///
/// デフォルト値を持つ定義は行を一切参照しません。
pub fn resolve_source(source: &ValueSource, row: &Row) -> Resolution {
    match source {
        ValueSource::Default(value) => Resolution::Value(value.clone()),
        ValueSource::Column(lookup) => lookup_column(lookup, row),
        ValueSource::Unresolvable => Resolution::Omit,
    }
}

fn lookup_column(lookup: &ColumnLookup, row: &Row) -> Resolution {
    let Some(raw) = row.get(&lookup.key) else {
        return Resolution::Omit;
    };

    if lookup.enums.is_empty() {
        return Resolution::Value(raw.to_string());
    }

    let enum_key = match lookup.enum_key {
        EnumKey::WholeValue => Some(raw.to_uppercase()),
        EnumKey::SecondToken => raw.split(' ').nth(1).map(str::to_uppercase),
    };

    let value = enum_key
        .and_then(|key| lookup.enums.get(&key))
        .map(String::as_str)
        .unwrap_or(raw);

    Resolution::Value(value.to_string())
}

fn derive_interval(role: IntervalRole, correction: &IntervalCorrection) -> Resolution {
    let has_values = !correction.values.is_empty();

    match (role, correction.kind) {
        (IntervalRole::Flag, _) => Resolution::Value("1".to_string()),
        (IntervalRole::Kind, kind) => Resolution::Value(kind.code().to_string()),
        (IntervalRole::Sequence, IntervalKind::Sequence) if has_values => {
            Resolution::Value(correction.values.clone())
        }
        (IntervalRole::Encoding, IntervalKind::Cyclic) if has_values => {
            Resolution::Value(interval_encoding(&correction.values, correction.unit))
        }
        (IntervalRole::Timezone, IntervalKind::Sequence) => {
            Resolution::Value(correction.timezone.code().to_string())
        }
        _ => Resolution::Omit,
    }
}

/// 間隔の数値を5桁にゼロ埋めし、単位文字を付与する（`3`, 時間 → `00003H`）
pub fn interval_encoding(values: &str, unit: IntervalUnit) -> String {
    format!("{:0>5}{}", values, unit.suffix())
}

/// 補正の値が空なら`None`（スキーマ側の値ソースにフォールバック）
fn notification_value(field: NotificationField, correction: &NotificationCorrection) -> Option<String> {
    let value = match field {
        NotificationField::Code => correction.code.clone(),
        NotificationField::Destination => correction.destination.clone(),
        NotificationField::Subject => correction.subject.clone(),
        NotificationField::Message => correction.message.clone(),
        NotificationField::AttachOutput => correction.attach_flag().to_string(),
    };
    Some(value).filter(|v| !v.is_empty())
}
