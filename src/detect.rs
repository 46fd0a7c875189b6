//! Terminal environment detection.
//!
//! Decides, from an environment snapshot plus the host config, whether the
//! terminal is one we know how to reprogram, how many colors it has, how
//! escape sequences must be framed (multiplexer wrapping), and which
//! palette-reset strategy applies. Detection never errors: an environment
//! we don't recognize simply isn't supported and the whole refresh becomes
//! a no-op.

use tracing::debug;

use crate::config::SyncConfig;
use crate::palette::ResetStrategy;

/// xterm gained `OSC 104` (reset palette) in this patch level.
const XTERM_RESET_PATCH: u32 = 244;

/// Snapshot of the environment variables detection cares about.
///
/// Built from the live environment in production; tests construct it
/// directly.
#[derive(Debug, Clone, Default)]
pub struct TermProbe {
    /// `$TERM`
    pub term: Option<String>,
    /// `$TMUX` is set: we are inside a tmux pane.
    pub tmux: bool,
    /// `$STY` is set: we are inside a GNU screen session.
    pub screen_session: bool,
    /// `$XTERM_VERSION`, e.g. `XTerm(322)`.
    pub xterm_version: Option<String>,
}

impl TermProbe {
    pub fn from_env() -> Self {
        Self {
            term: std::env::var("TERM").ok(),
            tmux: std::env::var_os("TMUX").is_some(),
            screen_session: std::env::var_os("STY").is_some(),
            xterm_version: std::env::var("XTERM_VERSION").ok(),
        }
    }
}

/// Recognized terminal families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermFamily {
    /// xterm and the xterm-compatible crowd (256 colors).
    Xterm,
    /// 88-color rxvt.
    Rxvt,
}

impl TermFamily {
    pub fn default_colors(&self) -> u16 {
        match self {
            TermFamily::Xterm => 256,
            TermFamily::Rxvt => 88,
        }
    }
}

/// Multiplexer framing required between us and the real terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplexer {
    None,
    Screen,
    Tmux,
}

/// The outcome of a successful detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSupport {
    pub family: TermFamily,
    pub max_colors: u16,
    pub multiplexer: Multiplexer,
    pub reset: ResetStrategy,
}

/// Fixed allow-list: `TERM` prefixes we know how to reprogram.
///
/// Order matters where one prefix contains another.
const XTERM_LIKE: &[&str] = &[
    "xterm", "gnome", "konsole", "alacritty", "kitty", "foot", "wezterm", "st-256color",
];

/// Detect terminal support. `None` means the environment is not one this
/// engine can drive - callers treat that as a silent no-op, not an error.
pub fn detect(probe: &TermProbe, config: &SyncConfig) -> Option<TermSupport> {
    let term = config
        .term_override
        .as_deref()
        .or(probe.term.as_deref())?;

    let multiplexer = if probe.tmux {
        Multiplexer::Tmux
    } else if probe.screen_session && term.starts_with("screen") {
        Multiplexer::Screen
    } else {
        Multiplexer::None
    };

    let family = detect_family(term, multiplexer)?;
    let max_colors = config.colors_override.unwrap_or(family.default_colors());
    if max_colors <= 16 {
        // No dynamic slots above the system colors: nothing to allocate.
        debug!(max_colors, "color count too low, unsupported");
        return None;
    }

    let reset = match family {
        TermFamily::Xterm if xterm_patch(probe.xterm_version.as_deref())
            .is_some_and(|patch| patch >= XTERM_RESET_PATCH) =>
        {
            ResetStrategy::Capability
        }
        _ => ResetStrategy::DefaultReplay,
    };

    let support = TermSupport {
        family,
        max_colors,
        multiplexer,
        reset,
    };
    debug!(?support, term, "terminal support detected");
    Some(support)
}

fn detect_family(term: &str, multiplexer: Multiplexer) -> Option<TermFamily> {
    // Inside a multiplexer TERM describes the multiplexer, not the real
    // terminal; assume the xterm-compatible case, which is what both
    // multiplexers emulate.
    if multiplexer != Multiplexer::None {
        return Some(TermFamily::Xterm);
    }
    if term.starts_with("rxvt") || term.starts_with("urxvt") {
        return Some(TermFamily::Rxvt);
    }
    if XTERM_LIKE.iter().any(|prefix| term.starts_with(prefix)) {
        return Some(TermFamily::Xterm);
    }
    None
}

/// Parse the patch level out of `XTerm(NNN)`.
fn xterm_patch(version: Option<&str>) -> Option<u32> {
    let inner = version?.strip_prefix("XTerm(")?.strip_suffix(')')?;
    inner.parse().ok()
}
