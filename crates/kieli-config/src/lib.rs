use std::env;

use serde::{Deserialize, Serialize};

use self::annotator::AnnotatorConfig;
use self::tooltip::TooltipConfig;
use self::vocabulary::VocabularyConfig;

pub mod annotator;
pub mod tooltip;
pub mod vocabulary;

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub annotator: AnnotatorConfig,
    pub tooltip: TooltipConfig,
    pub vocabulary: VocabularyConfig,
    pub viewport: ViewportConfig,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment wins over whatever a profile file said
    pub fn apply_env(&mut self) {
        if let Some(ms) = env::var("KIELI_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.annotator.debounce_ms = ms;
        }

        if let Ok(path) = env::var("KIELI_VOCAB_PATH") {
            self.vocabulary.path = Some(path);
        }

        if let Some(width) = env::var("KIELI_VIEWPORT_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.viewport.width = width;
        }

        if let Some(height) = env::var("KIELI_VIEWPORT_HEIGHT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.viewport.height = height;
        }
    }
}

fn default_viewport_width() -> f32 {
    800.0
}

fn default_viewport_height() -> f32 {
    600.0
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f32,
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"annotator": {"skip_tags": ["pre"]}, "viewport": {"width": 1024}}"#)
                .unwrap();

        assert!(config.annotator.is_skip_tag("PRE"));
        assert!(!config.annotator.is_skip_tag("script"));
        assert_eq!(config.annotator.debounce_ms, 100);
        assert!(config.annotator.is_editable_tag("textarea"));
        assert_eq!(config.viewport.width, 1024.0);
        assert_eq!(config.viewport.height, 600.0);
        assert_eq!(config.vocabulary.learning_lang, "Finnish");
    }
}
