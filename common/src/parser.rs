//! 画像解析モデルのレスポンスパーサー
//!
//! モデルの応答テキストからJSONを抽出し、リゾルバ入力（AllergenGuess）へ変換する。
//! 形の検証はここで行い、リゾルバには欠損値を持ち込まない。

use crate::error::{Error, Result};
use crate::types::{AllergenGuess, ScanType};
use serde::Serialize;
use serde_json::{Map, Value};

/// モデル応答の解析結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAnalysis {
    pub scan_type: ScanType,
    pub guesses: Vec<AllergenGuess>,
    /// 料理の簡単な説明（food モードのみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_description: Option<String>,
    /// 原材料表示から読み取った全文（ingredients モードのみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use allergy_eye_common::extract_json;
///
/// let response = "Result: {\"allergens\": []}";
/// assert_eq!(extract_json(response).unwrap(), "{\"allergens\": []}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("no JSON object found in model response".into()))
}

/// 確信度を [0, 1] に収め、小数第2位に丸める
///
/// 有限でない値は 0.0 とする。
pub fn normalize_confidence(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    (raw.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// モデル応答をパース
///
/// - `allergens` がない・null → 空リスト。配列以外はエラー
/// - `allergen` が文字列でない要素 → エラー
/// - 数値でない `confidence` → 0.0
/// - 空白のみの `sourceFoodItem` → None
pub fn parse_model_response(response: &str, scan_type: ScanType) -> Result<ModelAnalysis> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("model response JSON parse error: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Parse("model response is not a JSON object".into()))?;

    let guesses = match object.get("allergens") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_guess(index, item))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(Error::Parse("'allergens' is not an array".into())),
    };

    let mut analysis = ModelAnalysis {
        scan_type,
        guesses,
        ..Default::default()
    };

    match scan_type {
        ScanType::Food => {
            analysis.food_description = non_blank(object, "foodDescription");
        }
        ScanType::Ingredients => {
            analysis.extracted_text = Some(
                object
                    .get("extractedText")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            );
        }
    }

    Ok(analysis)
}

fn parse_guess(index: usize, item: &Value) -> Result<AllergenGuess> {
    let object = item
        .as_object()
        .ok_or_else(|| Error::Parse(format!("allergens[{}] is not an object", index)))?;

    let name = object
        .get("allergen")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Parse(format!("allergens[{}] has no 'allergen' string", index)))?;

    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .map(normalize_confidence)
        .unwrap_or(0.0);

    Ok(AllergenGuess {
        name: name.to_string(),
        confidence,
        source_text: non_blank(object, "sourceFoodItem"),
    })
}

fn non_blank(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
