//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use log::info;
use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::api::ColumnLayout;
use crate::compiler::{sort_by_group, Compiler};
use crate::correction::Corrections;
use crate::error::XlsxJobsError;
use crate::normalize::{self, DerivedKeys};
use crate::output::Document;
use crate::parser::WorkbookParser;
use crate::schema::{load_schema, MergedSchema};
use crate::security::validate_output_name;
use crate::types::{is_column_key, Row};

/// デフォルトのヘッダー行数
pub const DEFAULT_HEADER_ROWS: usize = 3;

/// デフォルトの出力ファイル名
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "output.xml";

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConversionConfig {
    /// 列レイアウト
    pub layout: ColumnLayout,

    /// データの前にあるヘッダー行数
    pub header_rows: usize,

    /// 作業ディレクトリに書き出すファイル名
    pub output_file_name: String,

    /// コンパイル前に行をグループキーで安定ソートするか
    pub sort_rows: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            header_rows: DEFAULT_HEADER_ROWS,
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
            sort_rows: false,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxjobs::{ColumnLayout, ConverterBuilder};
///
/// # fn main() -> Result<(), xlsxjobs::XlsxJobsError> {
/// let converter = ConverterBuilder::new()
///     .with_layout(ColumnLayout { group: "C".to_string(), ..ColumnLayout::default() })
///     .with_header_rows(1)
///     .sort_rows(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 列レイアウト: [`ColumnLayout::default`]
    /// - ヘッダー行数: 3
    /// - 出力ファイル名: `output.xml`
    /// - 行のソート: しない
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 列レイアウトを指定する
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// データの前にあるヘッダー行数を指定する
    ///
    /// # 引数
    ///
    /// * `rows: usize`: シートの1行目から数えたヘッダー行の数（0でヘッダーなし）
    pub fn with_header_rows(mut self, rows: usize) -> Self {
        self.config.header_rows = rows;
        self
    }

    /// `convert_in_dir`で書き出すファイル名を指定する
    ///
    /// ファイル名のみ指定可能です（ディレクトリ区切りや`..`は`build()`で拒否されます）。
    pub fn with_output_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_file_name = name.into();
        self
    }

    /// コンパイル前に行をグループキーで安定ソートするかを指定する
    ///
    /// # 引数
    ///
    /// * `sort: bool`:
    ///   * `true`: 同じグループキーの行を1つのFOLDERにまとめる
    ///   * `false`: シート上の順序のまま連続する区間ごとにFOLDERを作る（デフォルト）
    pub fn sort_rows(mut self, sort: bool) -> Self {
        self.config.sort_rows = sort;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合
    /// * `Err(XlsxJobsError::Config)`: 列キーが列文字（`A`〜`ZZZ`）でない場合
    /// * `Err(XlsxJobsError::SecurityViolation)`: 出力ファイル名がパスを含む場合
    pub fn build(self) -> Result<Converter, XlsxJobsError> {
        // 1. 列レイアウトの検証
        for (field, column) in self.config.layout.columns() {
            if !is_column_key(column) {
                return Err(XlsxJobsError::Config(format!(
                    "Invalid column key for {}: '{}'",
                    field, column
                )));
            }
        }

        // 2. 出力ファイル名の検証
        validate_output_name(&self.config.output_file_name)
            .map_err(XlsxJobsError::SecurityViolation)?;

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// スプレッドシートの読み込み、補助キーの導出、XMLへのコンパイルを提供します。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use xlsxjobs::{ConverterBuilder, Corrections};
///
/// # fn main() -> Result<(), xlsxjobs::XlsxJobsError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("./jobs/jobs.xlsx")?;
/// let path = converter.convert_in_dir("./jobs", input, &Corrections::new())?;
/// println!("written to {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// 列レイアウト
    pub fn layout(&self) -> &ColumnLayout {
        &self.config.layout
    }

    /// スプレッドシートの先頭シートからデータ行を読み込む
    ///
    /// ヘッダー行と空行は除外され、行はシート上の順序で返されます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Row>)` - データ行
    /// * `Err(XlsxJobsError::SecurityViolation)` - 入力サイズ・行数が上限を超えた場合
    /// * `Err(XlsxJobsError::Parse)` - スプレッドシートとして解析できない場合
    pub fn read_rows<R: Read>(&self, input: R) -> Result<Vec<Row>, XlsxJobsError> {
        let mut parser = WorkbookParser::open(input)?;
        parser.parse_rows(self.config.header_rows)
    }

    /// 行リストから補助キー（修正フォームの項目）を導出する
    pub fn derive_keys(&self, rows: &[Row]) -> DerivedKeys {
        normalize::derive_keys(rows, &self.config.layout)
    }

    /// 行リストをXML文字列にコンパイルする
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxjobs::{load_schema, ConverterBuilder, Corrections, Row};
    ///
    /// # fn main() -> Result<(), xlsxjobs::XlsxJobsError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let schema = load_schema("./jobs")?;
    /// let rows = vec![Row::new().with("A", "JOB_A").with("BD", "F1")];
    /// let xml = converter.compile(&rows, &schema, &Corrections::new())?;
    /// assert!(xml.contains("<FOLDER"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn compile(
        &self,
        rows: &[Row],
        schema: &MergedSchema,
        corrections: &Corrections,
    ) -> Result<String, XlsxJobsError> {
        self.build_document(rows, schema, corrections)?
            .to_xml_string()
    }

    /// スプレッドシートを読み込み、XMLとして書き出す
    ///
    /// ドキュメント全体を組み立ててから書き込むため、
    /// 読み込み・検証エラーの場合は出力先に何も書き込まれません。
    ///
    /// # 引数
    ///
    /// * `input` - スプレッドシートのリーダー
    /// * `schema` - マージ済みスキーマ
    /// * `corrections` - 補正データ
    /// * `output` - XML出力先のライター
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        schema: &MergedSchema,
        corrections: &Corrections,
        output: W,
    ) -> Result<(), XlsxJobsError> {
        let rows = self.read_rows(input)?;
        let document = self.build_document(&rows, schema, corrections)?;

        let mut writer = BufWriter::new(output);
        document.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// スプレッドシートを読み込み、XML文字列に変換する
    pub fn convert_to_string<R: Read>(
        &self,
        input: R,
        schema: &MergedSchema,
        corrections: &Corrections,
    ) -> Result<String, XlsxJobsError> {
        let rows = self.read_rows(input)?;
        self.compile(&rows, schema, corrections)
    }

    /// 作業ディレクトリのスキーマでスプレッドシートを変換し、
    /// 同じディレクトリに出力ファイル（デフォルト`output.xml`）を書き出す
    ///
    /// スキーマの読み込み・行の検証のいずれかに失敗した場合、出力ファイルは作成も上書きもされません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(PathBuf)` - 書き出したファイルのパス
    /// * `Err(XlsxJobsError)` - エラーが発生した場合
    pub fn convert_in_dir<P: AsRef<Path>, R: Read>(
        &self,
        dir: P,
        input: R,
        corrections: &Corrections,
    ) -> Result<PathBuf, XlsxJobsError> {
        let dir = dir.as_ref();
        let schema = load_schema(dir)?;
        let rows = self.read_rows(input)?;
        let document = self.build_document(&rows, &schema, corrections)?;
        let xml = document.to_xml_string()?;

        let path = dir.join(&self.config.output_file_name);
        fs::write(&path, xml)?;

        let jobs: usize = document.folders().iter().map(|f| f.children.len()).sum();
        info!(
            "wrote {} folders with {} jobs to {}",
            document.folders().len(),
            jobs,
            path.display()
        );
        Ok(path)
    }

    fn build_document(
        &self,
        rows: &[Row],
        schema: &MergedSchema,
        corrections: &Corrections,
    ) -> Result<Document, XlsxJobsError> {
        let rows: Cow<[Row]> = if self.config.sort_rows {
            let mut sorted = rows.to_vec();
            sort_by_group(&mut sorted, &self.config.layout);
            Cow::Owned(sorted)
        } else {
            Cow::Borrowed(rows)
        };

        Compiler::new(schema, &self.config.layout, corrections).compile(&rows)
    }
}
