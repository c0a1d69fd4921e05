//! Schema Loader
//!
//! ベーススキーマ（`config.json`）に名前付きの上書き断片をマージします。
//!
//! 上書き断片は、同じ名前を持つ最初のセクション（深さ優先で探索）に適用されます。
//!
//! - 断片が配列の場合: セクションの値を配列でそのまま置き換える
//! - 断片がオブジェクトの場合: セクションのキーの上に断片のキーを浅くマージする
//!   （同じキーは断片側が優先、値はキー単位で丸ごと置き換え）

use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::XlsxJobsError;
use crate::schema::ATTRIBUTES_KEY;

/// ベーススキーマのファイル名
pub const BASE_SCHEMA_FILE: &str = "config.json";

/// 上書き断片のセクション名（適用順）
///
/// 各断片は作業ディレクトリ内の`<セクション名>.json`から読み込まれます。
pub const OVERRIDE_SECTIONS: [&str; 5] = ["FOLDER", "JOB", "ON", "QUANTITATIVE", "VARIABLE"];

/// 作業ディレクトリからベーススキーマと上書き断片を読み込み、マージ済みのJSONを返す
///
/// # 戻り値
///
/// * `Ok(Value)` - マージ済みスキーマ
/// * `Err(XlsxJobsError::ConfigMissing)` - いずれかのファイルが読めない、または解析できない
/// * `Err(XlsxJobsError::ScheduleTargetMissing)` - 断片の対象セクションが存在しない
pub(crate) fn load_dir(dir: &Path) -> Result<Value, XlsxJobsError> {
    let base = read_json(dir, BASE_SCHEMA_FILE)?;

    let mut overrides = Vec::with_capacity(OVERRIDE_SECTIONS.len());
    for section in OVERRIDE_SECTIONS {
        let fragment = read_json(dir, &format!("{}.json", section))?;
        if !(fragment.is_object() || fragment.is_array()) {
            return Err(XlsxJobsError::ConfigMissing {
                file: format!("{}.json", section),
                reason: "fragment must be a JSON object or array".to_string(),
            });
        }
        overrides.push((section.to_string(), fragment));
    }

    merge_overrides(base, &overrides)
}

/// 上書き断片を順にベーススキーマへ適用する
///
/// 同じ断片リストを2回適用しても結果は変わりません。
pub fn merge_overrides(
    mut base: Value,
    overrides: &[(String, Value)],
) -> Result<Value, XlsxJobsError> {
    for (section, fragment) in overrides {
        if !apply_override(&mut base, section, fragment) {
            return Err(XlsxJobsError::ScheduleTargetMissing(section.clone()));
        }
        debug!("merged override fragment into section '{}'", section);
    }
    Ok(base)
}

fn read_json(dir: &Path, file: &str) -> Result<Value, XlsxJobsError> {
    let path = dir.join(file);
    let content = fs::read_to_string(&path).map_err(|e| XlsxJobsError::ConfigMissing {
        file: file.to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| XlsxJobsError::ConfigMissing {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

/// 深さ優先で`name`という名前の最初のセクションを探し、断片を適用する
///
/// セクションとみなすのは値がオブジェクトまたは配列のキーのみです（`attributes`の中は除く）。
/// 見つかった場合は`true`を返します。
fn apply_override(node: &mut Value, name: &str, fragment: &Value) -> bool {
    match node {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == ATTRIBUTES_KEY || !(child.is_object() || child.is_array()) {
                    continue;
                }
                if key == name {
                    merge_into(child, fragment);
                    return true;
                }
                if apply_override(child, name, fragment) {
                    return true;
                }
            }
            false
        }
        Value::Array(items) => items
            .iter_mut()
            .any(|item| apply_override(item, name, fragment)),
        _ => false,
    }
}

fn merge_into(target: &mut Value, fragment: &Value) {
    match (target, fragment) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        }
        (target, fragment) => *target = fragment.clone(),
    }
}
