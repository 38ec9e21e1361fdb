use serde::{Deserialize, Serialize};

fn default_native_lang() -> String {
    "English".to_string()
}

fn default_learning_lang() -> String {
    "Finnish".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VocabularyConfig {
    /// JSON vocabulary file, seeded sample list when unset
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_native_lang")]
    pub native_lang: String,
    #[serde(default = "default_learning_lang")]
    pub learning_lang: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            path: None,
            native_lang: default_native_lang(),
            learning_lang: default_learning_lang(),
        }
    }
}
