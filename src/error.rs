use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllergyEyeError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("カタログ・解析エラー: {0}")]
    Core(#[from] allergy_eye_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AllergyEyeError>;
