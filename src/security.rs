//! Security Module
//!
//! 入力スプレッドシートと出力先に対するセキュリティ制限を実装するモジュール。

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_input_file_size: u64,
    /// データ行の最大数
    /// デフォルト: 1,048,576（Excelの最大行数）
    pub max_rows: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 104_857_600, // 100MB
            max_rows: 1_048_576,
        }
    }
}

/// 出力ファイル名の検証
///
/// 作業ディレクトリの外に書き込めないよう、ファイル名を検証します。
///
/// # 引数
///
/// * `name` - 検証するファイル名
///
/// # 戻り値
///
/// * `Ok(())` - ファイル名が安全な場合
/// * `Err(String)` - ファイル名が危険な場合（`..`、パス区切り、絶対パスを含む）
pub(crate) fn validate_output_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Empty file name is not allowed".to_string());
    }

    // 絶対パスを拒否（Windows形式の`C:`やUnix形式の`/`で始まるパス）
    if name.starts_with('/') || name.get(1..2) == Some(":") {
        return Err(format!("Absolute path is not allowed: {}", name));
    }

    if name.contains("..") {
        return Err(format!("Path traversal detected: {}", name));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(format!("Path separator in file name is not allowed: {}", name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_name_valid() {
        assert!(validate_output_name("output.xml").is_ok());
        assert!(validate_output_name("jobs-2024.xml").is_ok());
    }

    #[test]
    fn test_validate_output_name_empty() {
        assert!(validate_output_name("").is_err());
    }

    #[test]
    fn test_validate_output_name_absolute() {
        assert!(validate_output_name("/etc/passwd").is_err());
        assert!(validate_output_name("C:\\output.xml").is_err());
    }

    #[test]
    fn test_validate_output_name_traversal() {
        assert!(validate_output_name("../output.xml").is_err());
        assert!(validate_output_name("..").is_err());
    }

    #[test]
    fn test_validate_output_name_separator() {
        assert!(validate_output_name("out/output.xml").is_err());
        assert!(validate_output_name("out\\output.xml").is_err());
    }

    #[test]
    fn test_default_limits() {
        let config = SecurityConfig::default();
        assert_eq!(config.max_input_file_size, 104_857_600);
        assert_eq!(config.max_rows, 1_048_576);
    }
}
