//! Formatter Module
//!
//! セル値を行のテキストに変換するモジュール。
//! スキーマの列参照はセルの生テキストを受け取るため、ここでの表記が
//! そのまま出力XMLの属性値や修正フォームのキーになります。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::XlsxJobsError;

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,

    /// 数値フォーマッター
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// セル値をテキストに変換
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(String))` - 値のあるセル
    /// * `Ok(None)` - 空セル、エラーセル、空文字列
    /// * `Err(XlsxJobsError)` - 日付の計算に失敗した場合
    pub fn format_cell(&self, cell: &Data) -> Result<Option<String>, XlsxJobsError> {
        let text = match cell {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => self.number_formatter.format(*f),
            Data::String(s) => s.clone(),
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::DateTime(dt) => self.date_formatter.format(dt.as_f64())?,
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            // エラーセル（#N/Aなど）は値なしとして扱う
            Data::Error(_) | Data::Empty => return Ok(None),
        };

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。常に1900年エポックとして処理します。
///
/// - シリアル値が1未満（時刻のみ）: `HHMM`（スケジューラの時刻表記）
/// - それ以外: `YYYYMMDD`
#[derive(Debug, Default)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    pub fn format(&self, serial_value: f64) -> Result<String, XlsxJobsError> {
        if serial_value < 0.0 {
            return Err(XlsxJobsError::Config(format!(
                "Negative date serial value: {}",
                serial_value
            )));
        }

        if serial_value < 1.0 {
            let seconds = (serial_value * 86_400.0).round() as u32;
            let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds % 86_400, 0)
                .ok_or_else(|| {
                    XlsxJobsError::Config(format!("Invalid time serial value: {}", serial_value))
                })?;
            return Ok(time.format("%H%M").to_string());
        }

        // 1900年システム: 1899年12月30日起算（Excelの1900年うるう年バグを考慮）
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
            .ok_or_else(|| XlsxJobsError::Config("Invalid epoch date".to_string()))?;
        let days = serial_value.floor() as i64;
        let date = epoch
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| {
                XlsxJobsError::Config(format!(
                    "Date calculation overflow: serial_value={}",
                    serial_value
                ))
            })?;

        Ok(date.format("%Y%m%d").to_string())
    }
}

/// 数値フォーマッター
///
/// 整数値の浮動小数点数は小数点なしで出力します（`5.0` → `"5"`）。
#[derive(Debug, Default)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    pub fn format(&self, value: f64) -> String {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            value.to_string()
        }
    }
}
