use kieli_types::{VocabularyEntry, VocabularySource};

use super::entry;
use crate::error::VocabularyError;
use crate::vocabulary::{MemoryVocabulary, VocabularyStore};

#[test]
fn test_default_list() {
    let store = MemoryVocabulary::with_defaults();
    assert_eq!(store.count(), 4);
    assert_eq!(store.active_count(), 3);
    assert!(store.contains("PROJECT"));
    assert!(
        store
            .entries()
            .iter()
            .all(|e| e.source == Some(VocabularySource::Hardcoded))
    );
}

#[test]
fn test_add_replaces_in_place() {
    let mut store = MemoryVocabulary::with_defaults();
    store.add(entry("Hot", "kuumaa")).unwrap();

    let entries = store.entries();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[1].native_word, "Hot");
    assert_eq!(entries[1].learning_word, "kuumaa");
}

#[test]
fn test_toggle_and_remove() {
    let mut store = MemoryVocabulary::with_defaults();

    assert!(store.toggle("the").unwrap());
    assert_eq!(store.active_count(), 4);
    assert!(!store.toggle("THE").unwrap());

    let removed = store.remove("cold").unwrap();
    assert_eq!(removed.learning_word, "kylmä");
    assert!(!store.contains("cold"));

    assert!(matches!(store.remove("cold"), Err(VocabularyError::NotFound(_))));
    assert!(matches!(store.toggle("river"), Err(VocabularyError::NotFound(_))));
}

#[test]
fn test_blank_words_rejected() {
    let mut store = MemoryVocabulary::new();
    assert!(matches!(store.add(entry("  ", "x")), Err(VocabularyError::EmptyWord)));
    assert!(matches!(store.add(entry("word", "")), Err(VocabularyError::EmptyWord)));
    assert_eq!(store.count(), 0);
}

#[test]
fn test_composed_and_decomposed_spellings_match() {
    let mut store = MemoryVocabulary::new();
    store.add(entry("cafe\u{301}", "kahvila")).unwrap();
    assert!(store.contains("caf\u{e9}"));
    assert_eq!(store.entries()[0].native_word, "caf\u{e9}");
}

#[test]
fn test_legacy_records_skipped() {
    let json = r#"[
        {"nativeWord": "river", "learningWord": "joki", "nativeLang": "English", "learningLang": "Finnish"},
        {"nativeWord": "lake", "nativeLang": "English", "learningLang": "Finnish"},
        {"word": "old", "translation": "vanha"},
        {"nativeWord": "sea", "learningWord": "meri", "nativeLang": "English", "learningLang": "Finnish", "enabled": false, "source": "manual"}
    ]"#;

    let store = MemoryVocabulary::from_json(json).unwrap();
    let entries = store.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].enabled);
    assert!(!entries[1].enabled);
    assert_eq!(entries[1].source, Some(VocabularySource::Manual));
}

#[test]
fn test_malformed_file_is_an_error() {
    assert!(matches!(
        MemoryVocabulary::from_json("{not json"),
        Err(VocabularyError::ParseError(_))
    ));
}

#[test]
fn test_save_and_load() {
    let path = std::env::temp_dir().join(format!("kieli-vocab-{}.json", uuid::Uuid::new_v4()));
    let mut store = MemoryVocabulary::with_defaults();
    store.add(entry("river", "joki")).unwrap();
    store.save_to_file(&path).unwrap();

    let loaded = MemoryVocabulary::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.entries(), store.entries());
}

#[test]
fn test_language_pair_filter() {
    let mut store = MemoryVocabulary::with_defaults();
    store
        .add(VocabularyEntry::new("house", "hus", "English", "Swedish"))
        .unwrap();

    assert_eq!(store.by_language_pair("English", "Finnish").len(), 3);
    let swedish = store.by_language_pair("English", "Swedish");
    assert_eq!(swedish.len(), 1);
    assert_eq!(swedish[0].learning_word, "hus");
}
