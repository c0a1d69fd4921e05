//! Parser Module
//!
//! calamineを使用したスプレッドシート解析。
//! 先頭シートのデータ行を列文字キーの`Row`として抽出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
