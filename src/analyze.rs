//! 解析パイプライン
//!
//! モデル応答 → パース → 解決 → 並べ替え → スキャン結果

use crate::error::{AllergyEyeError, Result};
use allergy_eye_common::{
    parse_model_response, AllergenTaxonomy, Language, ReportOptions, ScanReport, ScanType,
    UserProfile,
};
use std::path::Path;
use tracing::{debug, warn};

/// 解析リクエスト
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub scan_type: ScanType,
    pub locale: Language,
    pub profile: UserProfile,
    pub low_confidence_threshold: f64,
    /// ミリ秒単位のUNIX時刻
    pub timestamp: i64,
}

/// モデル応答テキストからスキャン結果を作る
pub fn analyze_response(
    taxonomy: &AllergenTaxonomy,
    response: &str,
    request: &AnalyzeRequest,
) -> Result<ScanReport> {
    let analysis = parse_model_response(response, request.scan_type)?;
    debug!(guesses = analysis.guesses.len(), scan_type = %request.scan_type, "model response parsed");

    let options = ReportOptions {
        locale: request.locale,
        low_confidence_threshold: request.low_confidence_threshold,
        timestamp: request.timestamp,
    };
    let report = ScanReport::build(taxonomy, analysis, &request.profile, &options);

    if !report.unresolved.is_empty() {
        warn!(names = ?report.unresolved, "allergens not found in catalog");
    }
    Ok(report)
}

/// プロフィールファイルとコマンドライン指定の既知アレルギーをまとめる
///
/// 前後空白を除き、空のIDは捨て、重複IDは最初の1件だけ残す。
/// カタログにないIDは警告のみ。
pub fn load_profile(
    path: Option<&Path>,
    extra: &[String],
    taxonomy: &AllergenTaxonomy,
) -> Result<UserProfile> {
    let mut profile = match path {
        Some(path) => {
            if !path.exists() {
                return Err(AllergyEyeError::FileNotFound(path.display().to_string()));
            }
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<UserProfile>(&content)?
        }
        None => UserProfile::default(),
    };
    profile.known_allergies.extend(extra.iter().cloned());

    let mut seen = std::collections::HashSet::new();
    profile.known_allergies = profile
        .known_allergies
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect();

    for id in &profile.known_allergies {
        if taxonomy.get_by_id(id).is_none() {
            warn!(id = %id, "known allergy id is not in the catalog");
        }
    }
    Ok(profile)
}
