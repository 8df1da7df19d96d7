//! プロフィールに基づく並べ替え
//!
//! 並び順（安定ソート）:
//! 1. ユーザーの既知アレルギーに含まれるもの
//! 2. 確信度の高い順
//! 3. 表示名のロケール照合順（中国語は拼音順・筆画順）

use crate::taxonomy::AllergenTaxonomy;
use crate::types::{AllergenMatch, Language};
use icu_collator::{Collator, CollatorOptions};
use icu_locid::{locale, Locale};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::warn;

/// 既知アレルギーかどうか（IDの完全一致のみ）
pub fn is_user_allergy<K>(allergen: &AllergenMatch, known: &HashSet<K>) -> bool
where
    K: Borrow<str> + Eq + Hash,
{
    known.contains(allergen.allergen_id.as_str())
}

fn collation_locale(language: Language) -> Locale {
    match language {
        Language::Sc => locale!("zh-CN"),
        Language::Tc => locale!("zh-TW-u-co-stroke"),
        Language::Eng => locale!("en"),
    }
}

/// 表示名の比較器
///
/// 照合データが使えない場合はコードポイント順で比較する。
struct NameOrder {
    collator: Option<Collator>,
}

impl NameOrder {
    fn new(language: Language) -> Self {
        let collator = match Collator::try_new(&collation_locale(language).into(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!(locale = language.locale(), error = %e, "collator unavailable, using code point order");
                None
            }
        };
        Self { collator }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

/// 表示順ランカー
#[derive(Debug, Clone, Copy)]
pub struct ProfileRanker<'a> {
    taxonomy: &'a AllergenTaxonomy,
}

impl<'a> ProfileRanker<'a> {
    pub fn new(taxonomy: &'a AllergenTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// 検出結果を表示順に並べ替える
    ///
    /// 要素の追加・削除・変更はしない。キーがすべて等しい要素は入力順を保つ。
    pub fn rank<K>(
        &self,
        mut matches: Vec<AllergenMatch>,
        known: &HashSet<K>,
        locale: Language,
    ) -> Vec<AllergenMatch>
    where
        K: Borrow<str> + Eq + Hash,
    {
        let names = NameOrder::new(locale);
        matches.sort_by(|a, b| {
            is_user_allergy(b, known)
                .cmp(&is_user_allergy(a, known))
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| {
                    names.compare(
                        self.taxonomy.display_name(&a.allergen_id, locale),
                        self.taxonomy.display_name(&b.allergen_id, locale),
                    )
                })
        });
        matches
    }

    /// 並べ替え済みの結果から既知アレルギーのIDだけを順に取り出す
    pub fn prioritized_ids<K>(&self, ranked: &[AllergenMatch], known: &HashSet<K>) -> Vec<String>
    where
        K: Borrow<str> + Eq + Hash,
    {
        ranked
            .iter()
            .filter(|m| is_user_allergy(m, known))
            .map(|m| m.allergen_id.clone())
            .collect()
    }
}
