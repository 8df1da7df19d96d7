//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported locale: {0} (en/zh-CN/zh-TW)")]
    UnsupportedLocale(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_catalog() {
        let error = Error::Catalog("duplicate id: milk_001".to_string());
        assert_eq!(format!("{}", error), "Catalog error: duplicate id: milk_001");
    }

    #[test]
    fn test_error_display_locale() {
        let error = Error::UnsupportedLocale("ja".to_string());
        let display = format!("{}", error);
        assert!(display.contains("ja"));
        assert!(display.contains("zh-TW"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
