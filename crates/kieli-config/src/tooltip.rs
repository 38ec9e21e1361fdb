use serde::{Deserialize, Serialize};

fn default_margin() -> f32 {
    8.0
}

fn default_gap() -> f32 {
    8.0
}

fn default_char_width() -> f32 {
    8.0
}

fn default_line_height() -> f32 {
    18.0
}

fn default_padding() -> f32 {
    12.0
}

/// Popup geometry; sizes are estimated, there is no font metrics source
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TooltipConfig {
    /// Minimum distance kept from every viewport edge
    #[serde(default = "default_margin")]
    pub margin: f32,
    /// Space between the marker and the popup
    #[serde(default = "default_gap")]
    pub gap: f32,
    #[serde(default = "default_char_width")]
    pub char_width: f32,
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    #[serde(default = "default_padding")]
    pub padding: f32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            gap: default_gap(),
            char_width: default_char_width(),
            line_height: default_line_height(),
            padding: default_padding(),
        }
    }
}
