//! Style records and resolution.
//!
//! Styles arrive from the host as named records: either an alias to another
//! style or a concrete set of colors and attribute flags. The resolver
//! follows alias chains (bounded, cycle-safe), substitutes the base style's
//! colors for the `foreground`/`background` pseudo-colors, and reduces each
//! style to what the terminal's indexed-color attribute model can express.

pub mod parser;

use std::collections::HashMap;

use tracing::warn;

use crate::color::{Background, ColorValue, Rgb};

/// The well-known base style every other style is relative to.
pub const BASE_STYLE: &str = "Normal";

/// Alias chains longer than this resolve to the empty record.
pub const MAX_ALIAS_HOPS: usize = 20;

/// Attribute flags as they appear in style definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttrFlags {
    pub bold: bool,
    pub underline: bool,
    pub undercurl: bool,
    pub reverse: bool,
    pub standout: bool,
    pub italic: bool,
}

impl AttrFlags {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A concrete style definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleAttrs {
    pub fg: Option<ColorValue>,
    pub bg: Option<ColorValue>,
    /// Underline/undercurl color.
    pub sp: Option<ColorValue>,
    pub flags: AttrFlags,
}

/// Either an alias or a concrete definition.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleDef {
    Link { target: String },
    Attrs(StyleAttrs),
}

/// One named style from the host's listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    pub name: String,
    pub def: StyleDef,
}

/// A style reduced to the terminal's attribute/color model: the subset of
/// flags the indexed-color side can express, plus fully resolved colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
    pub standout: bool,
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

/// Which color field of a style to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Foreground,
    Background,
    Special,
}

/// Resolves the style snapshot taken at the start of a refresh cycle.
pub struct StyleResolver {
    records: Vec<StyleRecord>,
    index: HashMap<String, usize>,
    /// Pseudo-color substitutions, built once from the base style before
    /// any other style resolves. `None` here means "no color", matching
    /// the `none` pseudo-color.
    base_fg: Option<Rgb>,
    base_bg: Option<Rgb>,
}

impl StyleResolver {
    /// Build a resolver over the cycle's style snapshot. The first record
    /// wins when the listing repeats a name.
    pub fn new(records: Vec<StyleRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            index.entry(record.name.clone()).or_insert(i);
        }
        Self {
            records,
            index,
            base_fg: None,
            base_bg: None,
        }
    }

    /// Style names in listing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&StyleRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Build the per-cycle pseudo-color override table from the base style,
    /// falling back to the supplied colors (and warning) when the base
    /// style lacks a foreground or background. Returns the base colors in
    /// effect for this cycle.
    pub fn build_overrides(
        &mut self,
        fallback_fg: Rgb,
        fallback_bg: Rgb,
    ) -> (Rgb, Rgb) {
        let base = self.resolve(BASE_STYLE);
        let fg = base
            .fg
            .map(ColorValue::lookup_named)
            .and_then(|c| c.as_rgb());
        let bg = base
            .bg
            .map(ColorValue::lookup_named)
            .and_then(|c| c.as_rgb());
        if fg.is_none() || bg.is_none() {
            warn!(
                style = BASE_STYLE,
                "base style is missing foreground or background, using fallback colors"
            );
        }
        let fg = fg.unwrap_or(fallback_fg);
        let bg = bg.unwrap_or(fallback_bg);
        self.base_fg = Some(fg);
        self.base_bg = Some(bg);
        (fg, bg)
    }

    /// Classify the terminal background from the base style's background.
    /// Must be called after [`build_overrides`](Self::build_overrides);
    /// when the base background was a fallback the classification is a
    /// guess, which `build_overrides` already warned about.
    pub fn classify_background(&self) -> Background {
        match self.base_bg {
            Some(bg) => bg.classify(),
            None => Background::Dark,
        }
    }

    /// Follow alias links up to [`MAX_ALIAS_HOPS`]. Unknown names, chains
    /// that are too deep, and cycles all resolve to the empty record.
    pub fn resolve(&self, name: &str) -> StyleAttrs {
        let mut current = name;
        for _ in 0..MAX_ALIAS_HOPS {
            match self.get(current) {
                Some(StyleRecord {
                    def: StyleDef::Link { target },
                    ..
                }) => current = target.as_str(),
                Some(StyleRecord {
                    def: StyleDef::Attrs(attrs),
                    ..
                }) => return attrs.clone(),
                None => return StyleAttrs::default(),
            }
        }
        warn!(style = name, "alias chain too deep or cyclic, treating as empty");
        StyleAttrs::default()
    }

    /// Resolve one color field, substituting the base style's concrete
    /// colors for the foreground/background pseudo-colors.
    pub fn resolve_color(&self, name: &str, field: ColorField) -> Option<Rgb> {
        let attrs = self.resolve(name);
        let value = match field {
            ColorField::Foreground => attrs.fg,
            ColorField::Background => attrs.bg,
            ColorField::Special => attrs.sp,
        }?;
        self.substitute(value)
    }

    /// Reduce a style to the terminal's attribute/color model.
    ///
    /// Undercurl has no indexed-color equivalent: it downgrades to
    /// underline, and when the style carries a special color that color
    /// becomes the foreground so the curl's hue survives. Italic is not
    /// representable and is dropped.
    pub fn terminal_style(&self, name: &str) -> ResolvedStyle {
        let attrs = self.resolve(name);
        let flags = attrs.flags;
        let mut fg_value = attrs.fg;
        if flags.undercurl {
            if let Some(sp) = attrs.sp {
                fg_value = Some(sp);
            }
        }
        ResolvedStyle {
            bold: flags.bold,
            underline: flags.underline || flags.undercurl,
            reverse: flags.reverse,
            standout: flags.standout,
            fg: fg_value.and_then(|c| self.substitute(c)),
            bg: attrs.bg.and_then(|c| self.substitute(c)),
        }
    }

    /// Apply the pseudo-color override table to one color value.
    fn substitute(&self, value: ColorValue) -> Option<Rgb> {
        match value.lookup_named() {
            ColorValue::Rgb(rgb) => Some(rgb),
            ColorValue::Foreground => self.base_fg,
            ColorValue::Background => self.base_bg,
            ColorValue::None => None,
            ColorValue::Named(_) => unreachable!("lookup_named resolves names"),
        }
    }
}
