use serde::{Deserialize, Serialize};

fn default_debounce_ms() -> u64 {
    100
}

fn default_skip_tags() -> Vec<String> {
    ["script", "style", "noscript"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_editable_tags() -> Vec<String> {
    ["input", "textarea"].into_iter().map(String::from).collect()
}

fn default_normalize_on_restore() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Quiet period before a rescan after the last trigger
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Elements whose text is never rendered
    #[serde(default = "default_skip_tags")]
    pub skip_tags: Vec<String>,
    /// Elements the user types into
    #[serde(default = "default_editable_tags")]
    pub editable_tags: Vec<String>,
    /// Merge restored text back into single text nodes
    #[serde(default = "default_normalize_on_restore")]
    pub normalize_on_restore: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            skip_tags: default_skip_tags(),
            editable_tags: default_editable_tags(),
            normalize_on_restore: default_normalize_on_restore(),
        }
    }
}

impl AnnotatorConfig {
    pub fn is_skip_tag(&self, tag: &str) -> bool {
        self.skip_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_editable_tag(&self, tag: &str) -> bool {
        self.editable_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
