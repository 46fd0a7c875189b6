//! Host-supplied configuration.
//!
//! The engine performs no config I/O of its own; the host deserializes a
//! [`SyncConfig`] (typically from its TOML settings) and passes it in.
//! Every field has a default so a missing section means "all defaults".

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Configuration for the palette synchronization engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Force a terminal family instead of sniffing `TERM`.
    #[serde(default)]
    pub term_override: Option<String>,
    /// Force the terminal's color count instead of the family default.
    #[serde(default)]
    pub colors_override: Option<u16>,
    /// Regex of style names to leave untouched.
    #[serde(default)]
    pub blacklist: Option<String>,
    /// Escape sequence for restoring the cursor color, for terminals where
    /// `OSC 112` is not enough.
    #[serde(default)]
    pub cursor_reset: Option<String>,
    /// Fallback foreground when the base style has none.
    #[serde(default = "default_foreground")]
    pub default_foreground: String,
    /// Fallback background when the base style has none.
    #[serde(default = "default_background")]
    pub default_background: String,
}

pub fn default_foreground() -> String {
    "#ffffff".to_string()
}

pub fn default_background() -> String {
    "#000000".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            term_override: None,
            colors_override: None,
            blacklist: None,
            cursor_reset: None,
            default_foreground: default_foreground(),
            default_background: default_background(),
        }
    }
}

impl SyncConfig {
    /// Fallback base colors, parsed; a garbled override falls back to the
    /// built-in white-on-black defaults.
    pub(crate) fn fallback_colors(&self) -> (Rgb, Rgb) {
        let fg = Rgb::parse_hex(&self.default_foreground).unwrap_or(Rgb::new(255, 255, 255));
        let bg = Rgb::parse_hex(&self.default_background).unwrap_or(Rgb::new(0, 0, 0));
        (fg, bg)
    }
}
