//! Color values and classification.
//!
//! Colors move through the engine in three forms: symbolic names from the
//! host's theme language, the pseudo-colors `foreground`/`background`/`none`
//! that only mean something relative to the base style, and resolved RGB
//! triples. The palette allocator only ever sees resolved RGB values.

pub mod defaults;
pub mod names;

use std::fmt;

/// An 8-bit-per-channel RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` or `#rgb` hex string.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            3 => {
                // #abc expands to #aabbcc
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
                let r = digit(0)?;
                let g = digit(1)?;
                let b = digit(2)?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    /// Relative luminance, scaled by 10_000 for integer math.
    ///
    /// Uses the ITU-R BT.709 weights 0.2126 / 0.7152 / 0.0722, so the
    /// result ranges from 0 (black) to 2_550_000 (white).
    pub fn luminance(&self) -> u32 {
        2126 * u32::from(self.r) + 7152 * u32::from(self.g) + 722 * u32::from(self.b)
    }

    /// Classify this color as a light or dark background.
    pub fn classify(&self) -> Background {
        // Half of the scaled maximum (255 * 10_000 / 2).
        if self.luminance() < 1_275_000 {
            Background::Dark
        } else {
            Background::Light
        }
    }

    /// Format as an OSC color spec (`rgb:rr/gg/bb`).
    pub fn to_osc_spec(&self) -> String {
        format!("rgb:{:02x}/{:02x}/{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Whether the terminal background reads as light or dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Light,
    Dark,
}

impl Background {
    pub fn as_str(&self) -> &'static str {
        match self {
            Background::Light => "light",
            Background::Dark => "dark",
        }
    }
}

/// A color as it appears in a style definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorValue {
    /// A resolved RGB triple.
    Rgb(Rgb),
    /// The base style's foreground.
    Foreground,
    /// The base style's background.
    Background,
    /// Explicitly no color.
    None,
    /// A symbolic name still requiring a color-table lookup.
    Named(String),
}

impl ColorValue {
    /// Parse a color token from a style listing: a hex triple, one of the
    /// pseudo-color keywords, or a symbolic name.
    pub fn parse(token: &str) -> Self {
        if token.starts_with('#') {
            return match Rgb::parse_hex(token) {
                Some(rgb) => ColorValue::Rgb(rgb),
                None => ColorValue::None,
            };
        }
        match token.to_ascii_lowercase().as_str() {
            "none" => ColorValue::None,
            "fg" | "foreground" => ColorValue::Foreground,
            "bg" | "background" => ColorValue::Background,
            _ => ColorValue::Named(token.to_string()),
        }
    }

    /// Resolve a symbolic name through the color table. Pseudo-colors and
    /// already-resolved values pass through unchanged; an unknown name
    /// resolves to `None`.
    pub fn lookup_named(self) -> Self {
        match self {
            ColorValue::Named(name) => match names::lookup(&name) {
                Some(rgb) => ColorValue::Rgb(rgb),
                None => {
                    tracing::trace!(name = %name, "unknown color name, dropping");
                    ColorValue::None
                }
            },
            other => other,
        }
    }

    pub fn as_rgb(&self) -> Option<Rgb> {
        match self {
            ColorValue::Rgb(rgb) => Some(*rgb),
            _ => None,
        }
    }
}
