//! Integration Tests for xlsxjobs
//!
//! スプレッドシートの生成（rust_xlsxwriter）から作業ディレクトリへの
//! `output.xml`書き出しまでの一連の流れを検証します。

use rust_xlsxwriter::*;
use serde_json::json;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use xlsxjobs::{
    load_schema, ConverterBuilder, Corrections, IntervalCorrection, IntervalKind, IntervalUnit,
    MergedSchema, NotificationCorrection, Row, Timezone,
};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    pub const COL_JOBNAME: u16 = 0; // A
    pub const COL_TASKTYPE: u16 = 2; // C
    pub const COL_INTERVAL: u16 = 25; // Z
    pub const COL_TIME_FROM: u16 = 26; // AA
    pub const COL_VARIABLE: u16 = 28; // AC
    pub const COL_NOTIFICATION: u16 = 53; // BB
    pub const COL_QUANTITATIVE: u16 = 54; // BC
    pub const COL_GROUP: u16 = 55; // BD

    /// 3行のヘッダーとジョブ行を持つワークブックを生成
    pub fn generate_job_sheet(jobs: &[[&str; 6]]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        // Header rows
        worksheet.write_string(0, COL_JOBNAME, "Job definitions")?;
        worksheet.write_string(1, COL_JOBNAME, "Job name")?;
        worksheet.write_string(1, COL_GROUP, "Folder")?;
        worksheet.write_string(2, COL_JOBNAME, "(required)")?;

        // Data rows: [jobname, tasktype, interval, notification, quantitative, group]
        for (i, job) in jobs.iter().enumerate() {
            let row = 3 + i as u32;
            let [name, tasktype, interval, notification, quantitative, group] = *job;
            worksheet.write_string(row, COL_JOBNAME, name)?;
            if !tasktype.is_empty() {
                worksheet.write_string(row, COL_TASKTYPE, tasktype)?;
            }
            if let Ok(number) = interval.parse::<f64>() {
                worksheet.write_number(row, COL_INTERVAL, number)?;
            }
            if !notification.is_empty() {
                worksheet.write_string(row, COL_NOTIFICATION, notification)?;
            }
            if !quantitative.is_empty() {
                worksheet.write_string(row, COL_QUANTITATIVE, quantitative)?;
            }
            if !group.is_empty() {
                worksheet.write_string(row, COL_GROUP, group)?;
            }
            worksheet.write_string(row, COL_TIME_FROM, "8AM")?;
            worksheet.write_string(row, COL_VARIABLE, "/data/in")?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 3ジョブ・2フォルダーの標準シナリオ
    pub fn generate_scenario() -> Result<Vec<u8>, XlsxError> {
        generate_job_sheet(&[
            ["JOB_A", "Unix script", "5", "JOB_A: run", "DB_LOCK", "F1"],
            ["JOB_B", "Unix command", "5", "JOB_B: run", "", "F1"],
            ["JOB_C", "Unix script", "10", "JOB_C: stop", "", "F2"],
        ])
    }

    /// 作業ディレクトリにスキーマファイル一式を書き出す
    pub fn write_schema_dir(dir: &Path) {
        let base = json!({
            "DEFTABLE": {
                "FOLDER": {
                    "attributes": {
                        "DATACENTER": { "default": "DC1" },
                        "FOLDER_NAME": { "column": "BD" }
                    },
                    "JOB": {
                        "attributes": {
                            "JOBNAME": { "column": "A" },
                            "NODEID": { "default": "host01" },
                            "TASKTYPE": { "column": "C", "enum": { "SCRIPT": "Job", "COMMAND": "Command" } },
                            "CYCLIC": {},
                            "CYCLIC_TYPE": {},
                            "CYCLIC_TIMES_SEQUENCE": {},
                            "INTERVAL": { "default": "00000M" },
                            "TIMEZONE": {},
                            "TIMEFROM": { "column": "AA" }
                        },
                        "VARIABLE": [],
                        "QUANTITATIVE": { "attributes": {} },
                        "ON": {
                            "attributes": { "STMT": { "default": "*" }, "CODE": { "default": "NOTOK" } },
                            "DOMAIL": {
                                "attributes": {
                                    "URGENCY": { "default": "R" },
                                    "DEST": { "default": "ops@example.com" }
                                }
                            }
                        }
                    }
                }
            }
        });
        fs::write(dir.join("config.json"), base.to_string()).unwrap();

        // FOLDER断片: APPLICATIONを追加（オブジェクトの浅いマージでattributesごと置き換え）
        let folder = json!({
            "attributes": {
                "DATACENTER": { "default": "DC1" },
                "FOLDER_NAME": { "column": "BD" },
                "APPLICATION": { "default": "PAYROLL" }
            }
        });
        fs::write(dir.join("FOLDER.json"), folder.to_string()).unwrap();
        fs::write(dir.join("JOB.json"), "{}").unwrap();
        fs::write(dir.join("ON.json"), "{}").unwrap();
        fs::write(
            dir.join("QUANTITATIVE.json"),
            json!({ "attributes": { "NODE": { "default": "@" } } }).to_string(),
        )
        .unwrap();
        fs::write(
            dir.join("VARIABLE.json"),
            json!([{ "NAME": { "default": "%%INPUT" }, "VALUE": { "column": "AC" } }]).to_string(),
        )
        .unwrap();
    }
}

fn scenario_corrections() -> Corrections {
    Corrections::new()
        .with_node_id("batch01")
        .with_interval(IntervalCorrection {
            interval: "5".to_string(),
            kind: IntervalKind::Cyclic,
            values: "3".to_string(),
            unit: IntervalUnit::Hours,
            timezone: Timezone::Cst,
        })
        .with_interval(IntervalCorrection {
            interval: "10".to_string(),
            kind: IntervalKind::Sequence,
            values: "0800,1600".to_string(),
            unit: IntervalUnit::Minutes,
            timezone: Timezone::Est,
        })
        .with_time("8AM", "0800")
        .with_notification(NotificationCorrection {
            key: "%%JOBNAME:run".to_string(),
            code: "NOTOK".to_string(),
            destination: "team@example.com".to_string(),
            subject: "%%JOBNAME failed".to_string(),
            message: "see output".to_string(),
            attach_output: "Yes".to_string(),
        })
}

#[test]
fn test_convert_in_dir_writes_output_xml() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let excel = fixtures::generate_scenario().unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let path = converter
        .convert_in_dir(dir.path(), Cursor::new(excel), &scenario_corrections())
        .unwrap();

    assert_eq!(path, dir.path().join("output.xml"));
    let xml = fs::read_to_string(&path).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert_eq!(xml.matches("<FOLDER ").count(), 2);
    assert_eq!(xml.matches("<JOB ").count(), 3);
    assert!(xml.contains("<FOLDER DATACENTER=\"DC1\" FOLDER_NAME=\"F1\" APPLICATION=\"PAYROLL\">"));
}

#[test]
fn test_job_attributes_with_corrections() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let schema = load_schema(dir.path()).unwrap();
    let excel = fixtures::generate_scenario().unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let xml = converter
        .convert_to_string(Cursor::new(excel), &schema, &scenario_corrections())
        .unwrap();

    // cyclic補正（JOB_A, JOB_B）
    assert!(xml.contains(
        "<JOB JOBNAME=\"JOB_A\" NODEID=\"batch01\" TASKTYPE=\"Job\" CYCLIC=\"1\" CYCLIC_TYPE=\"C\" INTERVAL=\"00003H\" TIMEFROM=\"0800\">"
    ));
    assert!(xml.contains("JOBNAME=\"JOB_B\" NODEID=\"batch01\" TASKTYPE=\"Command\""));

    // sequence補正（JOB_C）: INTERVALは省略、時刻列とタイムゾーンを出力
    assert!(xml.contains(
        "<JOB JOBNAME=\"JOB_C\" NODEID=\"batch01\" TASKTYPE=\"Job\" CYCLIC=\"1\" CYCLIC_TYPE=\"S\" CYCLIC_TIMES_SEQUENCE=\"0800,1600\" TIMEZONE=\"EST\" TIMEFROM=\"0800\">"
    ));
}

#[test]
fn test_children_of_each_job() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let schema = load_schema(dir.path()).unwrap();
    let excel = fixtures::generate_scenario().unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let xml = converter
        .convert_to_string(Cursor::new(excel), &schema, &scenario_corrections())
        .unwrap();

    assert_eq!(xml.matches("<VARIABLE NAME=\"%%INPUT\" VALUE=\"/data/in\"/>").count(), 3);
    assert!(xml.contains(
        "<QUANTITATIVE NAME=\"DB_LOCK\" QUANT=\"1\" ONFAIL=\"R\" ONOK=\"R\" NODE=\"@\"/>"
    ));
    assert_eq!(xml.matches("<QUANTITATIVE ").count(), 1);
    assert_eq!(xml.matches("<ON ").count(), 3);

    // "run"の2ジョブは補正された通知、"stop"はスキーマのデフォルト
    assert_eq!(
        xml.matches(
            "<DOMAIL URGENCY=\"R\" DEST=\"team@example.com\" SUBJECT=\"%%JOBNAME failed\" MESSAGE=\"see output\" ATTACH_SYSOUT=\"Y\"/>"
        )
        .count(),
        2
    );
    assert_eq!(xml.matches("<DOMAIL URGENCY=\"R\" DEST=\"ops@example.com\"/>").count(), 1);
}

#[test]
fn test_indentation_uses_tabs() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let schema = load_schema(dir.path()).unwrap();
    let excel = fixtures::generate_scenario().unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let xml = converter
        .convert_to_string(Cursor::new(excel), &schema, &Corrections::new())
        .unwrap();

    for line in xml.lines() {
        let trimmed = line.trim_start_matches('\t');
        let depth = line.len() - trimmed.len();
        let tag = trimmed
            .trim_start_matches("</")
            .trim_start_matches('<')
            .split([' ', '>', '/'])
            .next()
            .unwrap_or("");
        let expected = match tag {
            "?xml" | "DEFTABLE" => 0,
            "FOLDER" => 1,
            "JOB" => 2,
            "VARIABLE" | "QUANTITATIVE" | "ON" => 3,
            "DOMAIL" => 4,
            other => panic!("unexpected element {:?}", other),
        };
        assert_eq!(depth, expected, "line: {:?}", line);
    }
}

#[test]
fn test_derive_keys_from_spreadsheet() {
    let excel = fixtures::generate_scenario().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let rows = converter.read_rows(Cursor::new(excel)).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("A"), Some("JOB_A"));
    // 数値セルは小数点なしの文字列
    assert_eq!(rows[0].get("Z"), Some("5"));

    let keys = converter.derive_keys(&rows);
    assert_eq!(keys.intervals, vec!["5", "10"]);
    assert_eq!(keys.time_froms, vec!["8AM"]);
    assert!(keys.time_tos.is_empty());
    assert_eq!(keys.notification_keys, vec!["%%JOBNAME:run", "%%JOBNAME:stop"]);

    let json = serde_json::to_value(&keys).unwrap();
    assert_eq!(json["notificationKeys"][1], "%%JOBNAME:stop");
}

#[test]
fn test_corrections_from_json_document() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let excel = fixtures::generate_scenario().unwrap();

    let corrections: Corrections = serde_json::from_value(json!({
        "intervals": [
            { "interval": "5", "TYPE": "cyclic", "VALUES": "15", "MINORHOURS": "minutes" }
        ]
    }))
    .unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let path = converter
        .convert_in_dir(dir.path(), Cursor::new(excel), &corrections)
        .unwrap();
    let xml = fs::read_to_string(path).unwrap();

    assert_eq!(xml.matches("INTERVAL=\"00015M\"").count(), 2);
    // 補正のない間隔コードはデフォルト値
    assert_eq!(xml.matches("INTERVAL=\"00000M\"").count(), 1);
    // ノードIDの上書きがなければスキーマのデフォルト
    assert_eq!(xml.matches("NODEID=\"host01\"").count(), 3);
}

#[test]
fn test_custom_header_rows_and_output_name() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let excel = fixtures::generate_scenario().unwrap();

    // ヘッダー行を4行とすると先頭のジョブ行がスキップされる
    let converter = ConverterBuilder::new()
        .with_header_rows(4)
        .with_output_file_name("jobs.xml")
        .build()
        .unwrap();
    let path = converter
        .convert_in_dir(dir.path(), Cursor::new(excel), &Corrections::new())
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "jobs.xml");
    assert!(!dir.path().join("output.xml").exists());
    let xml = fs::read_to_string(path).unwrap();
    assert_eq!(xml.matches("<JOB ").count(), 2);
    assert!(!xml.contains("JOB_A"));
}

#[test]
fn test_sorted_rows_merge_groups() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let schema = load_schema(dir.path()).unwrap();
    let excel = fixtures::generate_job_sheet(&[
        ["JOB_A", "", "", "", "", "F2"],
        ["JOB_B", "", "", "", "", "F1"],
        ["JOB_C", "", "", "", "", "F2"],
    ])
    .unwrap();

    let unsorted = ConverterBuilder::new().build().unwrap();
    let xml = unsorted
        .convert_to_string(Cursor::new(excel.clone()), &schema, &Corrections::new())
        .unwrap();
    assert_eq!(xml.matches("<FOLDER ").count(), 3);

    let sorted = ConverterBuilder::new().sort_rows(true).build().unwrap();
    let xml = sorted
        .convert_to_string(Cursor::new(excel), &schema, &Corrections::new())
        .unwrap();
    assert_eq!(xml.matches("<FOLDER ").count(), 2);
    let f1 = xml.find("FOLDER_NAME=\"F1\"").unwrap();
    let f2 = xml.find("FOLDER_NAME=\"F2\"").unwrap();
    assert!(f1 < f2);
}

#[test]
fn test_compile_matches_convert() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_schema_dir(dir.path());
    let schema = load_schema(dir.path()).unwrap();
    let excel = fixtures::generate_scenario().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let rows: Vec<Row> = converter.read_rows(Cursor::new(excel.clone())).unwrap();
    let compiled = converter
        .compile(&rows, &schema, &scenario_corrections())
        .unwrap();

    let mut written = Vec::new();
    converter
        .convert(Cursor::new(excel), &schema, &scenario_corrections(), &mut written)
        .unwrap();

    assert_eq!(compiled, String::from_utf8(written).unwrap());
}

/// 開始時刻（AA）と終了時刻（AB）がそれぞれの補正で置き換えられる
#[test]
fn test_time_window_corrections() {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, fixtures::COL_JOBNAME, "header").unwrap();
    worksheet.write_string(3, fixtures::COL_JOBNAME, "JOB_A").unwrap();
    worksheet.write_string(3, fixtures::COL_TIME_FROM, "8AM").unwrap();
    worksheet.write_string(3, 27, "5PM").unwrap(); // AB
    worksheet.write_string(3, fixtures::COL_GROUP, "F1").unwrap();
    worksheet.write_string(4, fixtures::COL_JOBNAME, "JOB_B").unwrap();
    worksheet.write_string(4, fixtures::COL_TIME_FROM, "9AM").unwrap();
    worksheet.write_string(4, 27, "6PM").unwrap(); // AB
    worksheet.write_string(4, fixtures::COL_GROUP, "F1").unwrap();
    let excel = workbook.save_to_buffer().unwrap();

    let schema = MergedSchema::from_value(&json!({
        "DEFTABLE": {
            "FOLDER": {
                "attributes": { "FOLDER_NAME": { "column": "BD" } },
                "JOB": {
                    "attributes": {
                        "JOBNAME": { "column": "A" },
                        "TIMEFROM": { "column": "AA" },
                        "TIMETO": { "column": "AB" }
                    },
                    "ON": { "attributes": { "STMT": { "default": "*" } } }
                }
            }
        }
    }))
    .unwrap();
    let corrections = Corrections::new()
        .with_time("8AM", "0800")
        .with_time("5PM", "1700");

    let converter = ConverterBuilder::new().build().unwrap();
    let xml = converter
        .convert_to_string(Cursor::new(excel), &schema, &corrections)
        .unwrap();

    assert!(xml.contains("<JOB JOBNAME=\"JOB_A\" TIMEFROM=\"0800\" TIMETO=\"1700\">"));
    // 補正のない時刻コードは列の値のまま
    assert!(xml.contains("<JOB JOBNAME=\"JOB_B\" TIMEFROM=\"9AM\" TIMETO=\"6PM\">"));
}
