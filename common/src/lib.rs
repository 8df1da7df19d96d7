//! Allergy Eye Common Library
//!
//! 画像解析モデルが返した過敏原名をカタログの正規IDに解決し、
//! ユーザーの既知アレルギーに基づいて表示順を決める。

pub mod types;
pub mod error;
pub mod taxonomy;
pub mod resolver;
pub mod ranker;
pub mod parser;
pub mod report;

pub use types::{AllergenGuess, AllergenMatch, AllergenNames, AllergenRecord, Language, ScanType, UserProfile};
pub use error::{Error, Result};
pub use taxonomy::AllergenTaxonomy;
pub use resolver::{AllergenResolver, Resolution};
pub use ranker::{is_user_allergy, ProfileRanker};
pub use parser::{extract_json, normalize_confidence, parse_model_response, ModelAnalysis};
pub use report::{ReportOptions, ReportedAllergen, ScanReport, DEFAULT_LOW_CONFIDENCE_THRESHOLD};
