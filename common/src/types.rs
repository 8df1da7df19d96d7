//! 過敏原データの型定義
//!
//! - Language: 対応する3言語（簡体字・繁体字・英語）
//! - AllergenRecord: カタログの1件（多言語名つき）
//! - AllergenGuess: 画像解析モデルが返した生の推定（リゾルバの入力）
//! - AllergenMatch: カタログIDに解決済みの検出結果
//! - UserProfile: ユーザーの既知アレルギー

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// 対応言語
///
/// シリアライズ時はカタログのキー（`sc` / `tc` / `eng`）を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 簡体字中国語（zh-CN）
    Sc,
    /// 繁体字中国語（zh-TW）
    Tc,
    /// 英語（en）
    Eng,
}

impl Language {
    /// カタログ検索時の言語順
    pub const ALL: [Language; 3] = [Language::Sc, Language::Tc, Language::Eng];

    /// UIロケール文字列
    pub fn locale(&self) -> &'static str {
        match self {
            Language::Sc => "zh-CN",
            Language::Tc => "zh-TW",
            Language::Eng => "en",
        }
    }

    /// カタログJSONのキー
    pub fn key(&self) -> &'static str {
        match self {
            Language::Sc => "sc",
            Language::Tc => "tc",
            Language::Eng => "eng",
        }
    }

    /// ロケール文字列から変換（`zh_CN` のような区切りも許容）
    pub fn from_locale(locale: &str) -> Option<Self> {
        match locale.trim().to_lowercase().replace('_', "-").as_str() {
            "en" => Some(Language::Eng),
            "zh-cn" => Some(Language::Sc),
            "zh-tw" => Some(Language::Tc),
            _ => None,
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    /// ロケール（`en`/`zh-CN`/`zh-TW`）とカタログキー（`eng`/`sc`/`tc`）の両方を受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(lang) = Self::from_locale(s) {
            return Ok(lang);
        }
        match s.trim().to_lowercase().as_str() {
            "sc" => Ok(Language::Sc),
            "tc" => Ok(Language::Tc),
            "eng" => Ok(Language::Eng),
            _ => Err(Error::UnsupportedLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locale())
    }
}

/// 言語別の名称リスト
///
/// 先頭が表示名、2件目以降は照合専用の別名。
/// キーが存在しない言語もある。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllergenNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eng: Option<Vec<String>>,
}

impl AllergenNames {
    /// 指定言語の名称リスト（キーなし・空リストは None）
    pub fn get(&self, language: Language) -> Option<&[String]> {
        let names = match language {
            Language::Sc => self.sc.as_deref(),
            Language::Tc => self.tc.as_deref(),
            Language::Eng => self.eng.as_deref(),
        };
        names.filter(|n| !n.is_empty())
    }

    fn slot_mut(&mut self, language: Language) -> &mut Option<Vec<String>> {
        match language {
            Language::Sc => &mut self.sc,
            Language::Tc => &mut self.tc,
            Language::Eng => &mut self.eng,
        }
    }

    /// 指定言語の表示名（先頭要素）
    pub fn preferred(&self, language: Language) -> Option<&str> {
        self.get(language).and_then(|n| n.first()).map(String::as_str)
    }

    /// 全言語の名称を sc → tc → eng の順で連結して走査
    pub fn all(&self) -> impl Iterator<Item = &String> {
        Language::ALL
            .into_iter()
            .flat_map(move |lang| self.get(lang).unwrap_or(&[]).iter())
    }

    /// 空リストのキーを「キーなし」に揃える。揃えた言語を返す
    pub(crate) fn drop_empty(&mut self) -> Vec<Language> {
        let mut dropped = Vec::new();
        for lang in Language::ALL {
            let slot = self.slot_mut(lang);
            if slot.as_ref().is_some_and(|n| n.is_empty()) {
                *slot = None;
                dropped.push(lang);
            }
        }
        dropped
    }
}

/// カタログの過敏原1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergenRecord {
    pub id: String,
    pub name: AllergenNames,
}

/// モデル出力の過敏原推定1件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenGuess {
    /// モデルが返した過敏原名（自由記述）
    pub name: String,
    /// 確信度（0.0〜1.0、呼び出し側で丸め済み）
    pub confidence: f64,
    /// 由来となった食品・原材料表示の抜粋
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

impl AllergenGuess {
    pub fn new(name: impl Into<String>, confidence: f64, source_text: Option<&str>) -> Self {
        Self {
            name: name.into(),
            confidence,
            source_text: source_text.map(str::to_string),
        }
    }
}

/// カタログIDに解決済みの検出結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenMatch {
    pub allergen_id: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

/// スキャン種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// 料理・食品の写真
    #[default]
    Food,
    /// 原材料表示の写真
    Ingredients,
}

impl FromStr for ScanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(ScanType::Food),
            "ingredients" => Ok(ScanType::Ingredients),
            other => Err(Error::Parse(format!("unknown scan type: {other} (food/ingredients)"))),
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanType::Food => write!(f, "food"),
            ScanType::Ingredients => write!(f, "ingredients"),
        }
    }
}

/// ユーザープロフィール（永続化層が保存しているJSONと同じ形）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub known_allergies: Vec<String>,
}

impl UserProfile {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_allergies: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// 既知アレルギーIDの集合（前後空白を除去し、空要素は捨てる）
    pub fn known_set(&self) -> HashSet<&str> {
        self.known_allergies
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect()
    }
}
