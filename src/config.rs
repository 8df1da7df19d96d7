use crate::error::{AllergyEyeError, Result};
use allergy_eye_common::{Language, DEFAULT_LOW_CONFIDENCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// カタログパスの環境変数
pub const ENV_CATALOG: &str = "ALLERGY_EYE_CATALOG";
/// 既定ロケールの環境変数
pub const ENV_LOCALE: &str = "ALLERGY_EYE_LOCALE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 過敏原カタログJSON（未設定なら組み込みカタログ）
    pub catalog_path: Option<PathBuf>,
    pub default_locale: String,
    pub low_confidence_threshold: f64,
    /// RUST_LOG 未設定時のログフィルタ
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            default_locale: Language::Eng.locale().into(),
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            log_filter: "info".into(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み
    ///
    /// 環境変数は保存対象に混ぜず、`resolved_*` の参照時にだけ反映する。
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（ファイルがなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AllergyEyeError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("allergy-eye").join("config.json"))
    }

    /// 保存する値を検証（環境変数は見ない）
    pub fn validate(&self) -> Result<()> {
        self.threshold()?;
        self.locale()?;
        Ok(())
    }

    /// 保存されている既定ロケール
    pub fn locale(&self) -> Result<Language> {
        parse_locale(&self.default_locale)
    }

    /// 実際に使うロケール（環境変数を優先）
    pub fn resolved_locale(&self) -> Result<Language> {
        match env_value(ENV_LOCALE) {
            Some(locale) => parse_locale(&locale),
            None => self.locale(),
        }
    }

    /// 実際に使うカタログパス（環境変数を優先）
    pub fn resolved_catalog_path(&self) -> Option<PathBuf> {
        env_value(ENV_CATALOG)
            .map(PathBuf::from)
            .or_else(|| self.catalog_path.clone())
    }

    /// 低確信度の閾値（0〜1）
    pub fn threshold(&self) -> Result<f64> {
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(AllergyEyeError::Config(format!(
                "low_confidence_threshold は 0〜1 で指定してください: {}",
                self.low_confidence_threshold
            )));
        }
        Ok(self.low_confidence_threshold)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_locale(locale: &str) -> Result<Language> {
    Language::from_locale(locale)
        .ok_or_else(|| AllergyEyeError::Config(format!("未対応のロケール: {}", locale)))
}
