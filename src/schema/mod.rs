//! Schema Module
//!
//! 属性マッピングスキーマの読み込み（ベース + 上書き断片のマージ）と、
//! 型付きスキーマへの変換を提供します。

mod loader;
mod model;

use std::path::Path;

use crate::error::XlsxJobsError;

pub use loader::{merge_overrides, BASE_SCHEMA_FILE, OVERRIDE_SECTIONS};
pub use model::{
    AttributeDef, AttributeRule, ColumnLookup, ElementSchema, EnumKey, IntervalRole,
    MergedSchema, NotificationField, NotificationSchema, TimeBound, ValueSource,
};

/// 各セクションで属性定義マップを保持するキー
pub(crate) const ATTRIBUTES_KEY: &str = "attributes";

/// 作業ディレクトリからスキーマを読み込み、マージして型付きスキーマを返す
///
/// 作業ディレクトリには`config.json`と5つの上書き断片
/// （`FOLDER.json`, `JOB.json`, `ON.json`, `QUANTITATIVE.json`, `VARIABLE.json`）が必要です。
///
/// # 使用例
///
/// ```rust,no_run
/// # fn main() -> Result<(), xlsxjobs::XlsxJobsError> {
/// let schema = xlsxjobs::load_schema("./jobs")?;
/// println!("{} job attributes", schema.job.attributes.len());
/// # Ok(())
/// # }
/// ```
pub fn load_schema(dir: impl AsRef<Path>) -> Result<MergedSchema, XlsxJobsError> {
    let merged = loader::load_dir(dir.as_ref())?;
    MergedSchema::from_value(&merged)
}
