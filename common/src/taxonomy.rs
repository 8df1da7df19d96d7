//! 過敏原カタログ
//!
//! 起動時に一度だけ読み込む読み取り専用のカタログ。
//! 読み込み後は変更しないため、複数スレッドから共有参照で使える。

use crate::error::{Error, Result};
use crate::types::{AllergenRecord, Language};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;

/// 組み込みカタログ（主要な食物過敏原）
static BUILTIN_CATALOG: &str = include_str!("../data/allergens.json");

/// 過敏原カタログ
#[derive(Debug, Clone, Default)]
pub struct AllergenTaxonomy {
    /// カタログファイル順のレコード
    records: Vec<AllergenRecord>,
    /// id → records のインデックス
    by_id: HashMap<String, usize>,
}

impl AllergenTaxonomy {
    /// レコード列からカタログを構築
    ///
    /// 空のID・重複ID・名称が1つもないレコードはエラー。
    /// 空リストの言語キーは「キーなし」として扱う。
    pub fn from_records(records: Vec<AllergenRecord>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut validated = Vec::with_capacity(records.len());

        for (index, mut record) in records.into_iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(Error::Catalog(format!("record #{index} has an empty id")));
            }
            if by_id.contains_key(&record.id) {
                return Err(Error::Catalog(format!("duplicate id: {}", record.id)));
            }

            for lang in record.name.drop_empty() {
                warn!(id = %record.id, language = lang.key(), "empty name list treated as missing");
            }
            if record.name.all().next().is_none() {
                return Err(Error::Catalog(format!("{} has no names in any language", record.id)));
            }

            by_id.insert(record.id.clone(), validated.len());
            validated.push(record);
        }

        Ok(Self {
            records: validated,
            by_id,
        })
    }

    /// JSON文字列（`[{id, name: {sc, tc, eng}}]`）から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<AllergenRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 組み込みカタログ
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// 全レコード（カタログ順）
    pub fn get_all(&self) -> &[AllergenRecord] {
        &self.records
    }

    /// IDでレコードを取得（見つからないのは正常系）
    pub fn get_by_id(&self, id: &str) -> Option<&AllergenRecord> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    /// ID列に含まれるレコードをカタログ順で返す（未知のIDは無視）
    pub fn get_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&AllergenRecord> {
        if ids.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        self.records
            .iter()
            .filter(|r| wanted.contains(r.id.as_str()))
            .collect()
    }

    /// キーワードで過敏原IDを検索
    ///
    /// キーワードは前後空白を除き、大文字小文字を区別しない部分一致。
    /// `language` 指定時はその言語の名称（別名含む）のみ、
    /// 未指定時は全言語の名称を対象にする。
    /// 空のキーワードは空の結果。結果はカタログ順で重複なし。
    pub fn find_ids_by_keyword(&self, keyword: &str, language: Option<Language>) -> Vec<&str> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|record| {
                let mut names: Box<dyn Iterator<Item = &String> + '_> = match language {
                    Some(lang) => Box::new(record.name.get(lang).unwrap_or(&[]).iter()),
                    None => Box::new(record.name.all()),
                };
                // 最初に一致した名称で打ち切る
                names.any(|name| name.to_lowercase().contains(&needle))
            })
            .map(|record| record.id.as_str())
            .collect()
    }

    /// 表示名を解決
    ///
    /// 指定言語の先頭名 → 英語の先頭名 → ID そのもの、の順にフォールバックする。
    /// 画面表示に使う名前は必ずここを通すこと。
    pub fn display_name<'a>(&'a self, id: &'a str, language: Language) -> &'a str {
        self.get_by_id(id)
            .and_then(|record| {
                record
                    .name
                    .preferred(language)
                    .or_else(|| record.name.preferred(Language::Eng))
            })
            .unwrap_or(id)
    }

    /// レコード数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// レコードが1件もないか
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AllergenNames;

    fn names(sc: &[&str], tc: &[&str], eng: &[&str]) -> AllergenNames {
        let to_list = |v: &[&str]| {
            if v.is_empty() {
                None
            } else {
                Some(v.iter().map(|s| s.to_string()).collect())
            }
        };
        AllergenNames {
            sc: to_list(sc),
            tc: to_list(tc),
            eng: to_list(eng),
        }
    }

    fn sample() -> AllergenTaxonomy {
        AllergenTaxonomy::from_records(vec![
            AllergenRecord {
                id: "peanut_001".into(),
                name: names(&["花生"], &[], &["Peanuts", "Groundnuts"]),
            },
            AllergenRecord {
                id: "milk_001".into(),
                name: names(&["牛奶", "奶粉"], &["牛奶"], &["Milk", "milk powder"]),
            },
            AllergenRecord {
                id: "lupin_001".into(),
                name: names(&[], &[], &["Lupin"]),
            },
        ])
        .unwrap()
    }

    // =============================================
    // 読み込み・検証
    // =============================================

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": "peanut_001", "name": {"eng": ["Peanuts", "Groundnuts"], "sc": ["花生"]}},
            {"id": "milk_001", "name": {"eng": ["Milk"], "sc": ["牛奶"]}}
        ]"#;
        let taxonomy = AllergenTaxonomy::from_json(json).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.get_all()[0].id, "peanut_001");
        assert_eq!(taxonomy.get_all()[1].id, "milk_001");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[
            {"id": "milk_001", "name": {"eng": ["Milk"]}},
            {"id": "milk_001", "name": {"eng": ["Dairy"]}}
        ]"#;
        let result = AllergenTaxonomy::from_json(json);
        match result {
            Err(Error::Catalog(msg)) => assert!(msg.contains("milk_001")),
            other => panic!("Expected Catalog error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let json = r#"[{"id": "  ", "name": {"eng": ["Milk"]}}]"#;
        assert!(matches!(AllergenTaxonomy::from_json(json), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_record_without_names_rejected() {
        let json = r#"[{"id": "ghost_001", "name": {"eng": []}}]"#;
        assert!(matches!(AllergenTaxonomy::from_json(json), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_missing_name_field_is_json_error() {
        let json = r#"[{"id": "milk_001"}]"#;
        assert!(matches!(AllergenTaxonomy::from_json(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_empty_language_list_normalized() {
        let json = r#"[{"id": "milk_001", "name": {"eng": ["Milk"], "sc": []}}]"#;
        let taxonomy = AllergenTaxonomy::from_json(json).unwrap();
        assert!(taxonomy.get_by_id("milk_001").unwrap().name.sc.is_none());
        assert_eq!(taxonomy.display_name("milk_001", Language::Sc), "Milk");
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let taxonomy = AllergenTaxonomy::builtin().unwrap();
        assert!(!taxonomy.is_empty());
        assert!(taxonomy.get_by_id("peanut_001").is_some());
        assert!(taxonomy.get_by_id("milk_001").is_some());
        for record in taxonomy.get_all() {
            for lang in Language::ALL {
                assert!(
                    record.name.preferred(lang).is_some(),
                    "{} に {} の名称がない",
                    record.id,
                    lang.key()
                );
            }
        }
    }

    // =============================================
    // 参照系
    // =============================================

    #[test]
    fn test_get_all_is_stable() {
        let taxonomy = sample();
        let first: Vec<&str> = taxonomy.get_all().iter().map(|r| r.id.as_str()).collect();
        let second: Vec<&str> = taxonomy.get_all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(first, vec!["peanut_001", "milk_001", "lupin_001"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_by_id_not_found() {
        let taxonomy = sample();
        assert!(taxonomy.get_by_id("unknown_999").is_none());
        assert!(taxonomy.get_by_id("").is_none());
    }

    #[test]
    fn test_get_by_ids() {
        let taxonomy = sample();
        let records = taxonomy.get_by_ids(&["lupin_001", "unknown", "peanut_001"]);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["peanut_001", "lupin_001"]);

        let empty: [&str; 0] = [];
        assert!(taxonomy.get_by_ids(&empty).is_empty());
    }

    // =============================================
    // キーワード検索
    // =============================================

    #[test]
    fn test_keyword_case_insensitive() {
        let taxonomy = sample();
        assert_eq!(
            taxonomy.find_ids_by_keyword("MILK", None),
            taxonomy.find_ids_by_keyword("milk", None)
        );
        assert_eq!(taxonomy.find_ids_by_keyword("MILK", None), vec!["milk_001"]);
    }

    #[test]
    fn test_keyword_substring_match() {
        let taxonomy = sample();
        // "powder" は "milk powder" の部分文字列
        assert_eq!(taxonomy.find_ids_by_keyword("powder", None), vec!["milk_001"]);
        assert_eq!(taxonomy.find_ids_by_keyword("nut", None), vec!["peanut_001"]);
    }

    #[test]
    fn test_keyword_trimmed() {
        let taxonomy = sample();
        assert_eq!(taxonomy.find_ids_by_keyword("  Groundnuts \n", None), vec!["peanut_001"]);
    }

    #[test]
    fn test_empty_keyword_yields_nothing() {
        let taxonomy = sample();
        assert!(taxonomy.find_ids_by_keyword("", None).is_empty());
        assert!(taxonomy.find_ids_by_keyword("   ", None).is_empty());
        for lang in Language::ALL {
            assert!(taxonomy.find_ids_by_keyword("", Some(lang)).is_empty());
        }
    }

    #[test]
    fn test_keyword_language_scoped() {
        let taxonomy = sample();
        assert!(taxonomy.find_ids_by_keyword("花生", Some(Language::Eng)).is_empty());
        assert_eq!(taxonomy.find_ids_by_keyword("花生", Some(Language::Sc)), vec!["peanut_001"]);
        // 繁体字キーがないレコードは tc 検索では見つからない
        assert!(taxonomy.find_ids_by_keyword("花生", Some(Language::Tc)).is_empty());
        // 別名も検索対象
        assert_eq!(taxonomy.find_ids_by_keyword("奶粉", Some(Language::Sc)), vec!["milk_001"]);
    }

    #[test]
    fn test_keyword_multiple_records() {
        let taxonomy = sample();
        // "l" は Milk と Lupin の両方に含まれる
        assert_eq!(taxonomy.find_ids_by_keyword("l", None), vec!["milk_001", "lupin_001"]);
    }

    #[test]
    fn test_keyword_record_listed_once() {
        let taxonomy = sample();
        // 牛奶 は sc と tc の両方に一致するが結果は1件
        assert_eq!(taxonomy.find_ids_by_keyword("牛奶", None), vec!["milk_001"]);
    }

    // =============================================
    // 表示名フォールバック
    // =============================================

    #[test]
    fn test_display_name_preferred_language() {
        let taxonomy = sample();
        assert_eq!(taxonomy.display_name("peanut_001", Language::Sc), "花生");
        assert_eq!(taxonomy.display_name("peanut_001", Language::Eng), "Peanuts");
    }

    #[test]
    fn test_display_name_falls_back_to_english() {
        let taxonomy = sample();
        assert_eq!(taxonomy.display_name("lupin_001", Language::Sc), "Lupin");
        assert_eq!(taxonomy.display_name("peanut_001", Language::Tc), "Peanuts");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let taxonomy = sample();
        assert_eq!(taxonomy.display_name("unknown_999", Language::Eng), "unknown_999");

        let no_english = AllergenTaxonomy::from_records(vec![AllergenRecord {
            id: "celery_001".into(),
            name: names(&["芹菜"], &[], &[]),
        }])
        .unwrap();
        assert_eq!(no_english.display_name("celery_001", Language::Tc), "celery_001");
        assert_eq!(no_english.display_name("celery_001", Language::Sc), "芹菜");
    }

    #[test]
    fn test_shared_read_only_across_threads() {
        let taxonomy = std::sync::Arc::new(sample());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let taxonomy = std::sync::Arc::clone(&taxonomy);
                std::thread::spawn(move || {
                    let ids = taxonomy.find_ids_by_keyword("milk", None);
                    ids.len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
