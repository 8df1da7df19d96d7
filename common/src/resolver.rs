//! 過敏原名の解決
//!
//! 画像解析モデルが返した自由記述の過敏原名を、カタログの正規IDに変換する。
//!
//! ## 処理フロー（推定1件ごと、入力順）
//! 1. リクエストのロケールの名称だけで検索
//! 2. 見つからなければ全言語で検索
//! 3. 見つかったIDごとに AllergenMatch を追加（同じ呼び出し内で既出のIDは捨てる）
//! 4. どちらでも見つからない推定は結果に含めない
//!
//! 既出IDは先勝ち。確信度のマージ・平均・最大値の採用は行わない。

use crate::taxonomy::AllergenTaxonomy;
use crate::types::{AllergenGuess, AllergenMatch, Language};
use std::collections::HashSet;
use tracing::debug;

/// 解決結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// 解決済みの検出結果（最初に一致した順）
    pub matches: Vec<AllergenMatch>,
    /// どのIDにも解決できなかった推定の名前（診断用）
    pub unresolved: Vec<String>,
}

/// 過敏原名リゾルバ
#[derive(Debug, Clone, Copy)]
pub struct AllergenResolver<'a> {
    taxonomy: &'a AllergenTaxonomy,
}

impl<'a> AllergenResolver<'a> {
    pub fn new(taxonomy: &'a AllergenTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// 推定列を正規IDの検出結果に変換
    pub fn resolve(&self, guesses: &[AllergenGuess], locale: Language) -> Vec<AllergenMatch> {
        self.resolve_detailed(guesses, locale).matches
    }

    /// 推定列を解決し、解決できなかった名前も併せて返す
    pub fn resolve_detailed(&self, guesses: &[AllergenGuess], locale: Language) -> Resolution {
        let mut resolution = Resolution::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for guess in guesses {
            let ids = self.lookup(&guess.name, locale);
            if ids.is_empty() {
                debug!(name = %guess.name, %locale, "no catalog entry, dropped");
                resolution.unresolved.push(guess.name.clone());
                continue;
            }

            for id in ids {
                if !seen.insert(id) {
                    debug!(name = %guess.name, id, "already matched earlier, discarded");
                    continue;
                }
                resolution.matches.push(AllergenMatch {
                    allergen_id: id.to_string(),
                    confidence: guess.confidence,
                    source_text: guess.source_text.clone(),
                });
            }
        }

        resolution
    }

    /// ロケール優先、見つからなければ全言語で検索
    fn lookup(&self, name: &str, locale: Language) -> Vec<&'a str> {
        let scoped = self.taxonomy.find_ids_by_keyword(name, Some(locale));
        if !scoped.is_empty() {
            return scoped;
        }

        let global = self.taxonomy.find_ids_by_keyword(name, None);
        if !global.is_empty() {
            debug!(name, %locale, "matched outside request locale");
        }
        global
    }
}
