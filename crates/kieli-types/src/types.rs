use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// A native word -> learning word pair kept by the vocabulary store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    /// Word in the reader's native language, the one found in text
    pub native_word: String,
    /// Word in the language being learned, shown instead
    pub learning_word: String,
    pub native_lang: String,
    pub learning_lang: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Unix millis when the word was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<VocabularySource>,
}

impl VocabularyEntry {
    pub fn new(
        native_word: impl Into<String>,
        learning_word: impl Into<String>,
        native_lang: impl Into<String>,
        learning_lang: impl Into<String>,
    ) -> Self {
        Self {
            native_word: native_word.into(),
            learning_word: learning_word.into(),
            native_lang: native_lang.into(),
            learning_lang: learning_lang.into(),
            enabled: true,
            added_at: None,
            source: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Case-insensitive identity of the entry
    pub fn key(&self) -> String {
        self.native_word.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularySource {
    Hardcoded,
    Ai,
    Manual,
}

/// Vocabulary pair proposed by the assistant, not yet in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub native_word: String,
    pub learning_word: String,
    pub native_lang: String,
    pub learning_lang: String,
}

impl Suggestion {
    pub fn key(&self) -> String {
        self.native_word.to_lowercase()
    }
}

impl From<Suggestion> for VocabularyEntry {
    fn from(s: Suggestion) -> Self {
        Self {
            native_word: s.native_word,
            learning_word: s.learning_word,
            native_lang: s.native_lang,
            learning_lang: s.learning_lang,
            enabled: true,
            added_at: None,
            source: Some(VocabularySource::Ai),
        }
    }
}

/// One assistant reply as rendered into a content region
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub content: String,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    /// False for mixed conversational replies, which are left unannotated
    #[serde(default = "default_enabled")]
    pub should_superimpose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Viewport-relative rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
