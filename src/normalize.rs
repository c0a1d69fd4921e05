//! Row Normalizer
//!
//! 解析済みの行から補助キー（繰り返し間隔コード、時刻コード、通知キー）を導出します。
//! 補助キーは修正フォームの項目と、修正データの検索キーになります。

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::api::ColumnLayout;
use crate::types::Row;

/// 通知キーでジョブ名を置き換えるプレースホルダー
pub const JOBNAME_PLACEHOLDER: &str = "%%JOBNAME";

/// アンダースコアを1つ以上含む単語トークン
static UNDERSCORE_TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]*_[A-Za-z0-9_]*"));

/// 区切り文字（`:` `@` `-`）に隣接する空白
static SEPARATOR_SPACING: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\s*([:@-])\s*"));

/// 行から導出された補助キーの集合
///
/// 各リストは初出順で重複を除いています。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedKeys {
    /// 繰り返し間隔コード
    pub intervals: Vec<String>,
    /// 開始時刻コード
    pub time_froms: Vec<String>,
    /// 終了時刻コード
    pub time_tos: Vec<String>,
    /// 通知キー（最初に現れた表記を保持）
    pub notification_keys: Vec<String>,
}

/// 行リストから補助キーを導出する
///
/// - 間隔・時刻コード: 生の値の完全一致で重複除去
/// - 通知キー: [`dedupe_key`]による比較で重複除去し、最初の表記を保持
///
/// 通知元の列を持たない行は通知キーを生成しません。
pub fn derive_keys(rows: &[Row], layout: &ColumnLayout) -> DerivedKeys {
    let mut keys = DerivedKeys::default();
    let mut seen_notifications = HashSet::new();

    for row in rows {
        push_unique(&mut keys.intervals, row.get(&layout.interval));
        push_unique(&mut keys.time_froms, row.get(&layout.time_from));
        push_unique(&mut keys.time_tos, row.get(&layout.time_to));

        if let Some(source) = row.get(&layout.notification) {
            let key = notification_key(source);
            if seen_notifications.insert(dedupe_key(&key)) {
                keys.notification_keys.push(key);
            }
        }
    }

    keys
}

/// 自由記述テキストから通知キーを導出する
///
/// 1. アンダースコアを含む単語トークンを`%%JOBNAME`に置き換える
/// 2. `:` `@` `-` の前後の空白を取り除く
///
/// ```rust
/// use xlsxjobs::notification_key;
///
/// assert_eq!(notification_key("PAY_ROLL1 : finalize-run"), "%%JOBNAME:finalize-run");
/// ```
pub fn notification_key(source: &str) -> String {
    let mut key = source.to_string();
    if let Ok(ref pattern) = *UNDERSCORE_TOKEN {
        key = pattern.replace_all(&key, JOBNAME_PLACEHOLDER).into_owned();
    }
    if let Ok(ref pattern) = *SEPARATOR_SPACING {
        key = pattern.replace_all(&key, "$1").into_owned();
    }
    key
}

/// 通知キーの比較用キー（小文字化し、すべての空白を除去）
pub fn dedupe_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn push_unique(list: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = value {
        if !list.iter().any(|v| v == value) {
            list.push(value.to_string());
        }
    }
}
