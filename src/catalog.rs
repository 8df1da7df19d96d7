//! カタログの選択と読み込み
//!
//! 優先順位: コマンドライン引数 → 設定（環境変数含む） → 組み込みカタログ

use crate::config::Config;
use crate::error::{AllergyEyeError, Result};
use allergy_eye_common::AllergenTaxonomy;
use std::path::Path;
use tracing::info;

pub fn load_taxonomy(explicit: Option<&Path>, config: &Config) -> Result<AllergenTaxonomy> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.resolved_catalog_path());

    let taxonomy = match path.as_deref() {
        Some(path) => {
            if !path.exists() {
                return Err(AllergyEyeError::FileNotFound(path.display().to_string()));
            }
            let taxonomy = AllergenTaxonomy::from_file(path)?;
            info!(path = %path.display(), records = taxonomy.len(), "catalog loaded");
            taxonomy
        }
        None => {
            let taxonomy = AllergenTaxonomy::builtin()?;
            info!(records = taxonomy.len(), "using built-in catalog");
            taxonomy
        }
    };

    Ok(taxonomy)
}
