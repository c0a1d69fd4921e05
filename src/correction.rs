//! Correction Model
//!
//! 修正フォームで利用者が入力した補正データ。
//! 補助キー（間隔コード・時刻コード・通知キー）ごとの不変の値として、
//! 送信時に1回だけ構築され、コンパイラに読み取り専用で渡されます。
//!
//! JSON表現（間隔の各項目名は修正フォームのフィールド名と同じ）:
//!
//! ```json
//! {
//!   "nodeId": "host01",
//!   "intervals": [
//!     { "interval": "5", "TYPE": "cyclic", "VALUES": "3", "MINORHOURS": "hours", "TIMEZONE": "cst" }
//!   ],
//!   "times": { "0800AM": "0800" },
//!   "notifications": [
//!     { "key": "%%JOBNAME:run", "CODE": "NOTOK", "DEST": "ops@example.com",
//!       "SUBJECT": "failed", "MESSAGE": "see log", "ATTACH": "Yes" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{IntervalKind, IntervalUnit, Timezone};
use crate::normalize::dedupe_key;

/// 利用者による補正データ一式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corrections {
    /// `NODEID`属性の上書き値（空文字列は未指定扱い）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// 繰り返し間隔の補正（間隔コードごと）
    #[serde(default)]
    pub intervals: Vec<IntervalCorrection>,

    /// 時刻コード → 補正後の時刻文字列
    #[serde(default)]
    pub times: BTreeMap<String, String>,

    /// 通知の補正（通知キーごと）
    #[serde(default)]
    pub notifications: Vec<NotificationCorrection>,
}

/// 繰り返し間隔の補正
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalCorrection {
    /// 対象の間隔コード（スプレッドシートの生の値）
    pub interval: String,

    /// 種別（cyclic / sequence）
    #[serde(rename = "TYPE", default)]
    pub kind: IntervalKind,

    /// cyclic: 間隔の数値、sequence: カンマ区切りの時刻列
    #[serde(rename = "VALUES", default)]
    pub values: String,

    /// cyclicの単位
    #[serde(rename = "MINORHOURS", default)]
    pub unit: IntervalUnit,

    /// sequenceのタイムゾーン
    #[serde(rename = "TIMEZONE", default)]
    pub timezone: Timezone,
}

/// 通知の補正
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCorrection {
    /// 対象の通知キー
    pub key: String,

    /// リターンコード条件
    #[serde(rename = "CODE", default)]
    pub code: String,

    /// 宛先
    #[serde(rename = "DEST", default)]
    pub destination: String,

    /// 件名
    #[serde(rename = "SUBJECT", default)]
    pub subject: String,

    /// 本文
    #[serde(rename = "MESSAGE", default)]
    pub message: String,

    /// 出力を添付するか（`"Yes"`のときのみ添付）
    #[serde(rename = "ATTACH", default)]
    pub attach_output: String,
}

impl NotificationCorrection {
    /// 本文・件名・宛先がすべて入力されているか
    ///
    /// 未完成の補正はスキーマのデフォルト通知に置き換えられます。
    pub fn is_complete(&self) -> bool {
        !self.message.is_empty() && !self.subject.is_empty() && !self.destination.is_empty()
    }

    /// `ATTACH_SYSOUT`属性の値
    pub fn attach_flag(&self) -> &'static str {
        if self.attach_output == "Yes" {
            "Y"
        } else {
            "N"
        }
    }
}

impl Corrections {
    /// 空の補正データ
    pub fn new() -> Self {
        Self::default()
    }

    /// ノードIDの上書き値を設定
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// 間隔の補正を追加
    pub fn with_interval(mut self, correction: IntervalCorrection) -> Self {
        self.intervals.push(correction);
        self
    }

    /// 時刻コードの補正を追加
    pub fn with_time(mut self, code: impl Into<String>, corrected: impl Into<String>) -> Self {
        self.times.insert(code.into(), corrected.into());
        self
    }

    /// 通知の補正を追加
    pub fn with_notification(mut self, correction: NotificationCorrection) -> Self {
        self.notifications.push(correction);
        self
    }

    /// 空でないノードIDの上書き値
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref().filter(|id| !id.is_empty())
    }

    /// 間隔コードの補正（最初に登録されたもの）
    pub fn interval(&self, code: &str) -> Option<&IntervalCorrection> {
        self.intervals.iter().find(|c| c.interval == code)
    }

    /// 時刻コードの空でない補正値
    pub fn time(&self, code: &str) -> Option<&str> {
        self.times
            .get(code)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// 通知キーの補正（大文字小文字・空白を無視して比較、最初に登録されたもの）
    pub fn notification(&self, key: &str) -> Option<&NotificationCorrection> {
        let wanted = dedupe_key(key);
        self.notifications
            .iter()
            .find(|c| dedupe_key(&c.key) == wanted)
    }
}
