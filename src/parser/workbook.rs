//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックを開き先頭シートの行を抽出します。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use log::debug;
use std::io::{Cursor, Read, Seek};

use crate::error::XlsxJobsError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;
use crate::types::{col_index_to_letter, Row};

/// ワークブックパーサー
///
/// XLSX / XLS / ODS のいずれの形式もcalamineの自動判別で開きます。
pub(crate) struct WorkbookParser<RS: Read + Seek> {
    /// calamineのワークブック
    workbook: Sheets<RS>,
    /// セルフォーマッター
    formatter: CellFormatter,
    /// セキュリティ制限
    security: SecurityConfig,
}

impl WorkbookParser<Cursor<Vec<u8>>> {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込んでからcalamineに渡します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(XlsxJobsError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(XlsxJobsError::Parse)` - スプレッドシートとして解析できない場合
    pub fn open<R: Read>(mut reader: R) -> Result<Self, XlsxJobsError> {
        let security = SecurityConfig::default();

        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;

        if bytes_read as u64 > security.max_input_file_size {
            return Err(XlsxJobsError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, security.max_input_file_size
            )));
        }

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;

        Ok(Self {
            workbook,
            formatter: CellFormatter::new(),
            security,
        })
    }
}

impl<RS: Read + Seek> WorkbookParser<RS> {
    /// 先頭シートのデータ行を抽出する
    ///
    /// # 引数
    ///
    /// * `header_rows` - データの前にあるヘッダー行の数（シートの1行目から数える）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Row>)` - データ行（空行は除外）
    /// * `Err(XlsxJobsError)` - シートがない、または解析エラー
    ///
    /// 列キーはシート上の絶対位置の列文字です（使用範囲がC列から始まる場合も`C`）。
    pub fn parse_rows(&mut self, header_rows: usize) -> Result<Vec<Row>, XlsxJobsError> {
        let sheet_name = self
            .workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| XlsxJobsError::Config("Workbook has no worksheets".to_string()))?;

        let range = self.workbook.worksheet_range(&sheet_name)?;

        let (start_row, start_col) = match range.start() {
            Some(start) => start,
            None => {
                debug!("sheet '{}' is empty", sheet_name);
                return Ok(Vec::new());
            }
        };

        let mut rows = Vec::new();

        for (row_offset, cells) in range.rows().enumerate() {
            let row_idx = start_row as usize + row_offset;
            if row_idx < header_rows {
                continue;
            }

            let mut row = Row::new();
            for (col_offset, cell) in cells.iter().enumerate() {
                if let Some(text) = self.formatter.format_cell(cell)? {
                    let column = col_index_to_letter(start_col + col_offset as u32);
                    row.insert(&column, text);
                }
            }

            if row.is_empty() {
                continue;
            }

            if rows.len() >= self.security.max_rows {
                return Err(XlsxJobsError::SecurityViolation(format!(
                    "Sheet '{}' exceeds the maximum of {} data rows",
                    sheet_name, self.security.max_rows
                )));
            }

            rows.push(row);
        }

        debug!(
            "parsed {} data rows from sheet '{}' (header rows: {})",
            rows.len(),
            sheet_name,
            header_rows
        );

        Ok(rows)
    }
}

// テストは統合テスト（tests/）で実装します。
// 実際のXLSXファイルが必要なため、単体テストではなく統合テストとして実装します。
