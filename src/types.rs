//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// スプレッドシートの1行（1ジョブ定義）
///
/// 列文字（`A`, `Z`, `BD`など）をキー、セルの生テキストを値とする開いたマップです。
/// 値のないセルはキー自体が存在しません。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, String>,
}

impl Row {
    /// 空の行を生成
    pub fn new() -> Self {
        Self::default()
    }

    /// セルを設定した行を返す（テスト・組み立て用）
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// セルの値を設定
    pub fn insert(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(column.to_string(), value.into());
    }

    /// 列の値を取得
    ///
    /// 列が存在しない、または値が空文字列の場合は`None`を返します。
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// セルが1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// セル数
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 列インデックスを列文字に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
pub(crate) fn col_index_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// 列文字として有効かどうか（大文字の英字1〜3文字）
pub(crate) fn is_column_key(key: &str) -> bool {
    (1..=3).contains(&key.len()) && key.bytes().all(|b| b.is_ascii_uppercase())
}
