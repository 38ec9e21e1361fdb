use std::path::Path;

use kieli_types::{VocabularyEntry, VocabularySource};
use unicode_normalization::UnicodeNormalization;

use crate::error::VocabularyError;

/// Vocabulary store contract. The annotation pipeline only reads `active_entries`.
pub trait VocabularyStore: Send + Sync {
    /// Every entry, in insertion order
    fn entries(&self) -> Vec<VocabularyEntry>;

    /// Add an entry, replacing one with the same case-insensitive native word in place
    fn add(&mut self, entry: VocabularyEntry) -> Result<(), VocabularyError>;

    fn remove(&mut self, native_word: &str) -> Result<VocabularyEntry, VocabularyError>;

    /// Flip `enabled`; returns the new state
    fn toggle(&mut self, native_word: &str) -> Result<bool, VocabularyError>;

    fn active_entries(&self) -> Vec<VocabularyEntry> {
        self.entries().into_iter().filter(|e| e.enabled).collect()
    }

    fn contains(&self, native_word: &str) -> bool {
        let key = native_word.to_lowercase();
        self.entries().iter().any(|e| e.key() == key)
    }

    fn count(&self) -> usize {
        self.entries().len()
    }

    fn active_count(&self) -> usize {
        self.active_entries().len()
    }
}

/// In-memory store with JSON import/export
#[derive(Debug, Clone, Default)]
pub struct MemoryVocabulary {
    entries: Vec<VocabularyEntry>,
}

impl MemoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample English -> Finnish list
    pub fn with_defaults() -> Self {
        let seed = [
            ("project", "projekti", true),
            ("hot", "kuuma", true),
            ("cold", "kylmä", true),
            ("the", "se", false),
        ];

        let entries = seed
            .into_iter()
            .map(|(native, learning, enabled)| {
                let mut entry = VocabularyEntry::new(native, learning, "English", "Finnish");
                entry.enabled = enabled;
                entry.source = Some(VocabularySource::Hardcoded);
                entry
            })
            .collect();

        Self { entries }
    }

    /// Parse a JSON array of entries. Records without a native or learning
    /// word are legacy data and are skipped, not treated as errors.
    pub fn from_json(json: &str) -> Result<Self, VocabularyError> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut store = Self::new();

        for value in raw {
            match serde_json::from_value::<VocabularyEntry>(value) {
                Ok(entry) => {
                    if let Err(e) = store.add(entry) {
                        tracing::warn!("Skipping vocabulary record: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Skipping legacy vocabulary record: {}", e),
            }
        }

        Ok(store)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, VocabularyError> {
        tracing::info!("Loading vocabulary from file: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} vocabulary entries ({} active)",
            store.count(),
            store.active_count()
        );
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String, VocabularyError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), VocabularyError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::debug!("Saved {} vocabulary entries to {}", self.count(), path.display());
        Ok(())
    }

    /// Active entries for one language pair
    pub fn by_language_pair(&self, native_lang: &str, learning_lang: &str) -> Vec<VocabularyEntry> {
        self.entries
            .iter()
            .filter(|e| e.enabled && e.native_lang == native_lang && e.learning_lang == learning_lang)
            .cloned()
            .collect()
    }

    fn position(&self, native_word: &str) -> Option<usize> {
        let key = normalize_word(native_word).to_lowercase();
        self.entries.iter().position(|e| e.key() == key)
    }
}

/// NFC so composed and decomposed spellings compare equal
fn normalize_word(word: &str) -> String {
    word.trim().nfc().collect()
}

impl VocabularyStore for MemoryVocabulary {
    fn entries(&self) -> Vec<VocabularyEntry> {
        self.entries.clone()
    }

    fn add(&mut self, mut entry: VocabularyEntry) -> Result<(), VocabularyError> {
        entry.native_word = normalize_word(&entry.native_word);
        entry.learning_word = normalize_word(&entry.learning_word);
        if entry.native_word.is_empty() || entry.learning_word.is_empty() {
            return Err(VocabularyError::EmptyWord);
        }

        match self.position(&entry.native_word) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    fn remove(&mut self, native_word: &str) -> Result<VocabularyEntry, VocabularyError> {
        let index = self
            .position(native_word)
            .ok_or_else(|| VocabularyError::NotFound(native_word.to_string()))?;
        Ok(self.entries.remove(index))
    }

    fn toggle(&mut self, native_word: &str) -> Result<bool, VocabularyError> {
        let index = self
            .position(native_word)
            .ok_or_else(|| VocabularyError::NotFound(native_word.to_string()))?;
        let entry = &mut self.entries[index];
        entry.enabled = !entry.enabled;
        Ok(entry.enabled)
    }

    fn contains(&self, native_word: &str) -> bool {
        self.position(native_word).is_some()
    }
}
