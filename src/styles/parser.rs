//! Parser for the host's style listing.
//!
//! The host reports its styles as a structured-but-stringly report, one
//! style per line:
//!
//! ```text
//! Normal         xxx guifg=#e4e4e4 guibg=#1c1c1c
//! Comment        xxx gui=italic guifg=SlateBlue
//! NonText        xxx cleared
//! Question       xxx links to MoreMsg
//! Todo           xxx gui=bold guifg=#000000
//!                    links to Special
//! ```
//!
//! A line that starts with whitespace continues the previous style; the
//! only continuation we honor is a trailing `links to`, which turns the
//! style into an alias. Malformed lines are skipped with a warning; a bad
//! line never aborts the listing.

use tracing::{trace, warn};

use super::{AttrFlags, StyleAttrs, StyleDef, StyleRecord};
use crate::color::ColorValue;

/// Separator between the style name and its definition in the listing.
const MARKER: &str = "xxx";

/// Parse a complete style listing into records, in listing order.
pub fn parse_listing(listing: &str) -> Vec<StyleRecord> {
    let mut records: Vec<StyleRecord> = Vec::new();
    for line in listing.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            // Continuation of the previous style.
            match (records.last_mut(), parse_link(line.trim())) {
                (Some(prev), Some(target)) => {
                    prev.def = StyleDef::Link { target };
                }
                (Some(prev), None) => {
                    trace!(style = %prev.name, line, "ignoring unrecognized continuation");
                }
                (None, _) => {
                    warn!(line, "continuation line with no preceding style, skipping");
                }
            }
            continue;
        }
        match parse_line(line) {
            Some(record) => records.push(record),
            None => warn!(line, "unparseable style line, skipping"),
        }
    }
    records
}

fn parse_line(line: &str) -> Option<StyleRecord> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    if tokens.next()? != MARKER {
        return None;
    }
    let rest = tokens.collect::<Vec<_>>();
    let def = if rest.is_empty() || rest == ["cleared"] {
        StyleDef::Attrs(StyleAttrs::default())
    } else if let Some(target) = parse_link(&rest.join(" ")) {
        StyleDef::Link { target }
    } else {
        StyleDef::Attrs(parse_attrs(&rest))
    };
    Some(StyleRecord {
        name: name.to_string(),
        def,
    })
}

/// `links to <Target>` — also the shape of a continuation line.
fn parse_link(text: &str) -> Option<String> {
    let target = text.strip_prefix("links to ")?.trim();
    (!target.is_empty()).then(|| target.to_string())
}

fn parse_attrs(tokens: &[&str]) -> StyleAttrs {
    let mut attrs = StyleAttrs::default();
    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            trace!(token, "style token without key=value shape, ignoring");
            continue;
        };
        match key {
            "gui" => attrs.flags = parse_flags(value),
            "guifg" => attrs.fg = Some(ColorValue::parse(value)),
            "guibg" => attrs.bg = Some(ColorValue::parse(value)),
            "guisp" => attrs.sp = Some(ColorValue::parse(value)),
            // cterm/term keys describe what the terminal currently shows,
            // which is exactly what this engine is about to overwrite.
            _ => trace!(key, "ignoring non-gui style key"),
        }
    }
    attrs
}

fn parse_flags(value: &str) -> AttrFlags {
    let mut flags = AttrFlags::default();
    for flag in value.split(',') {
        match flag.to_ascii_lowercase().as_str() {
            "bold" => flags.bold = true,
            "underline" => flags.underline = true,
            "undercurl" => flags.undercurl = true,
            "reverse" | "inverse" => flags.reverse = true,
            "standout" => flags.standout = true,
            "italic" => flags.italic = true,
            "none" => {}
            other => trace!(flag = other, "unknown attribute flag, ignoring"),
        }
    }
    flags
}
