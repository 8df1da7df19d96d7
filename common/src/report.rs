//! スキャン結果の組み立て
//!
//! パース → 解決 → 並べ替えを通し、履歴保存・画面表示に渡す1件分の結果を作る。

use crate::parser::ModelAnalysis;
use crate::ranker::{is_user_allergy, ProfileRanker};
use crate::resolver::AllergenResolver;
use crate::taxonomy::AllergenTaxonomy;
use crate::types::{AllergenMatch, Language, ScanType, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 低確信度とみなす既定の閾値
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// 表示用の検出結果1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedAllergen {
    pub allergen_id: String,
    pub display_name: String,
    pub confidence: f64,
    /// 確信度のパーセント表示（四捨五入）
    pub confidence_percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    pub is_user_allergy: bool,
    /// 閾値未満かつ既知アレルギーでない
    pub low_confidence: bool,
}

/// スキャン1件分の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_type: ScanType,
    /// 解決・表示名に使った言語（カタログキーで出力）
    pub locale: Language,
    /// 表示順に並んだ検出結果
    pub identified_allergens: Vec<ReportedAllergen>,
    /// 既知アレルギーに該当したID（表示順）
    pub prioritized_allergens: Vec<String>,
    pub user_profile_allergies_at_scan_time: Vec<String>,
    /// ミリ秒単位のUNIX時刻
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    /// カタログに存在しなかった名前（表示はしない）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

/// レポート生成オプション
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub locale: Language,
    pub low_confidence_threshold: f64,
    pub timestamp: i64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            locale: Language::Eng,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            timestamp: 0,
        }
    }
}

/// 確信度をパーセントに変換
pub fn confidence_percentage(confidence: f64) -> u8 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

impl ReportedAllergen {
    fn from_match(
        taxonomy: &AllergenTaxonomy,
        allergen: AllergenMatch,
        known: &HashSet<&str>,
        options: &ReportOptions,
    ) -> Self {
        let is_user_allergy = is_user_allergy(&allergen, known);
        Self {
            display_name: taxonomy.display_name(&allergen.allergen_id, options.locale).to_string(),
            confidence_percentage: confidence_percentage(allergen.confidence),
            low_confidence: !is_user_allergy && allergen.confidence < options.low_confidence_threshold,
            is_user_allergy,
            confidence: allergen.confidence,
            source_text: allergen.source_text,
            allergen_id: allergen.allergen_id,
        }
    }
}

impl ScanReport {
    /// モデル解析結果とプロフィールからレポートを組み立てる
    pub fn build(
        taxonomy: &AllergenTaxonomy,
        analysis: ModelAnalysis,
        profile: &UserProfile,
        options: &ReportOptions,
    ) -> Self {
        let known = profile.known_set();
        let resolution = AllergenResolver::new(taxonomy).resolve_detailed(&analysis.guesses, options.locale);

        let ranker = ProfileRanker::new(taxonomy);
        let ranked = ranker.rank(resolution.matches, &known, options.locale);
        let prioritized_allergens = ranker.prioritized_ids(&ranked, &known);

        let identified_allergens = ranked
            .into_iter()
            .map(|m| ReportedAllergen::from_match(taxonomy, m, &known, options))
            .collect();

        Self {
            scan_type: analysis.scan_type,
            locale: options.locale,
            identified_allergens,
            prioritized_allergens,
            user_profile_allergies_at_scan_time: profile.known_allergies.clone(),
            timestamp: options.timestamp,
            food_description: analysis.food_description,
            extracted_text: analysis.extracted_text,
            unresolved: resolution.unresolved,
        }
    }

    pub fn has_user_allergy(&self) -> bool {
        !self.prioritized_allergens.is_empty()
    }
}
