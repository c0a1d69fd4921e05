//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxjobsクレート全体で使用するエラー型
///
/// スキーマの読み込み、スプレッドシートの解析、XML生成中に発生する
/// すべての致命的エラーを統一的に扱うために使用されます。
///
/// 属性が解決できない場合（値が得られない場合）はエラーではなく、
/// 属性の省略として扱われます。
///
/// # エラーの種類
///
/// - `ConfigMissing`: スキーマ断片ファイルが読めない、またはJSONとして不正
/// - `ScheduleTargetMissing`: 上書き断片の対象セクションがベーススキーマに存在しない
/// - `RowShapeMismatch`: 行にグループキーの値がない
/// - `Io` / `Parse` / `Json` / `Xml`: 下位ライブラリ由来のエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxjobs::{load_schema, XlsxJobsError};
///
/// match load_schema("./jobs") {
///     Err(XlsxJobsError::ConfigMissing { file, reason }) => {
///         eprintln!("{} を読み込めません: {}", file, reason);
///     }
///     Err(e) => eprintln!("{}", e),
///     Ok(_) => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxJobsError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// JSONの解析・生成エラー（修正データの読み込みなど）
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XMLの書き出しエラー（quick-xml由来）
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// 必須のスキーマ断片ファイルを読み込めない、または解析できない
    ///
    /// 変換要求全体が中断され、出力ファイルは書き込まれません。
    #[error("Schema file '{file}' is missing or unreadable: {reason}")]
    ConfigMissing {
        /// ファイル名（例: `JOB.json`）
        file: String,
        /// 失敗の詳細
        reason: String,
    },

    /// 上書き断片が指すセクションがベーススキーマのどこにも存在しない
    #[error("Override target section '{0}' does not exist in the base schema")]
    ScheduleTargetMissing(String),

    /// マージ後のスキーマの形が不正（必須セクションの欠落、不正な属性定義など）
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// 行にグループキー列の値がない
    ///
    /// 出力の生成を開始する前に検出されます。
    #[error("Row {row} has no value in grouping column '{column}'")]
    RowShapeMismatch {
        /// データ行の1始まりの番号（ヘッダー行は数えない）
        row: usize,
        /// グループキーの列（例: `BD`）
        column: String,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に検出されます。
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズ、行数、出力ファイル名の制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
