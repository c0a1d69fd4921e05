//! Public API Types
//!
//! 公開APIで使用する列挙型と設定構造体を定義するモジュール。

use serde::{Deserialize, Serialize};

/// 繰り返し実行の種別
///
/// 修正フォームの`TYPE`欄に対応します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum IntervalKind {
    /// 一定間隔での繰り返し（例: 3時間ごと）
    ///
    /// 種別コード`C`、間隔属性は`00003H`形式で出力されます。
    #[default]
    Cyclic,

    /// 時刻列による繰り返し（例: `0800,1200,1600`）
    ///
    /// 種別コード`S`、値はそのまま時刻列属性に出力されます。
    Sequence,
}

impl IntervalKind {
    /// 出力XMLで使用する種別コード
    pub fn code(&self) -> &'static str {
        match self {
            IntervalKind::Cyclic => "C",
            IntervalKind::Sequence => "S",
        }
    }
}

/// 繰り返し間隔の単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum IntervalUnit {
    /// 分（デフォルト）
    #[default]
    Minutes,

    /// 時間
    Hours,
}

impl IntervalUnit {
    /// 間隔属性の末尾に付与する単位文字
    pub fn suffix(&self) -> char {
        match self {
            IntervalUnit::Minutes => 'M',
            IntervalUnit::Hours => 'H',
        }
    }
}

/// 時刻列による繰り返しで使用するタイムゾーン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Timezone {
    /// 米国中部標準時（デフォルト）
    #[default]
    Cst,
    /// 米国東部標準時
    Est,
    /// 中央ヨーロッパ時間
    Cet,
}

impl Timezone {
    /// 出力XMLでの表記（大文字）
    pub fn code(&self) -> &'static str {
        match self {
            Timezone::Cst => "CST",
            Timezone::Est => "EST",
            Timezone::Cet => "CET",
        }
    }
}

/// スプレッドシートの列レイアウト
///
/// 意味のあるフィールドがどの列（A1記法の列文字）に置かれているかを指定します。
/// スキーマの属性定義は列文字を直接参照しますが、行の正規化と派生属性は
/// この構造体の列を使用します。
///
/// # デフォルト
///
/// | フィールド | 列 |
/// | --- | --- |
/// | グループキー | `BD` |
/// | 繰り返し間隔コード | `Z` |
/// | 開始時刻コード | `AA` |
/// | 終了時刻コード | `AB` |
/// | 通知元テキスト | `BB` |
/// | 数量チェック名 | `BC` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// グループキー（FOLDER単位）の列
    pub group: String,
    /// 繰り返し間隔コードの列
    pub interval: String,
    /// 開始時刻コードの列
    pub time_from: String,
    /// 終了時刻コードの列
    pub time_to: String,
    /// 通知キーの元となる自由記述テキストの列
    pub notification: String,
    /// 空白区切りの数量チェック名の列
    pub quantitative: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            group: "BD".to_string(),
            interval: "Z".to_string(),
            time_from: "AA".to_string(),
            time_to: "AB".to_string(),
            notification: "BB".to_string(),
            quantitative: "BC".to_string(),
        }
    }
}

impl ColumnLayout {
    /// すべての列を（名前, 列文字）の組として返す
    pub(crate) fn columns(&self) -> [(&'static str, &str); 6] {
        [
            ("group", &self.group),
            ("interval", &self.interval),
            ("time_from", &self.time_from),
            ("time_to", &self.time_to),
            ("notification", &self.notification),
            ("quantitative", &self.quantitative),
        ]
    }
}
