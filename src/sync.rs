//! The refresh transaction.
//!
//! One refresh cycle takes a fresh snapshot of the host's styles, programs
//! the terminal palette to match, and hands each style its terminal-side
//! attribute/color set. The cycle either commits or rolls the terminal back
//! to a clean reset; it is never abandoned partway. Cycles are synchronous
//! and non-reentrant - the host serializes its triggers (startup,
//! theme-change, shutdown).

use regex::Regex;
use tracing::{debug, warn};

use crate::channel::{DirectChannel, ScreenChannel, TmuxChannel, TtyChannel};
use crate::color::{defaults, Background, ColorValue, Rgb};
use crate::config::SyncConfig;
use crate::detect::{self, Multiplexer, TermFamily, TermProbe, TermSupport};
use crate::error::Result;
use crate::palette::PaletteAllocator;
use crate::styles::{parser, StyleDef, StyleResolver, BASE_STYLE};

/// Styles that only exist on the GUI side; reprogramming them would be
/// meaningless or harmful in a terminal.
const GUI_ONLY_STYLES: &[&str] = &["Cursor", "CursorIM", "lCursor", "Menu", "Scrollbar", "Tooltip"];

const OSC_CURSOR_RESET: &[u8] = b"\x1b]112\x07";

/// The seam to the host's styling system.
///
/// The engine reads the style listing through this trait and writes the
/// reconciled terminal-side styles back through it. Implementations report
/// failure via [`SyncError::host`](crate::SyncError::host).
pub trait HostStyles {
    /// The current style listing (see [`parser`] for the grammar).
    fn style_listing(&mut self) -> Result<String>;

    /// Apply a terminal-compatible attribute/color set to one style.
    fn apply_style(&mut self, name: &str, style: &TermStyle) -> Result<()>;

    /// Record `name` as an alias of `target` in the host's own style
    /// system, instead of copying attributes.
    fn link_style(&mut self, name: &str, target: &str) -> Result<()>;

    /// Fix the global light/dark background setting. Called exactly once
    /// per cycle, immediately after the base style is applied.
    fn set_background(&mut self, background: Background) -> Result<()>;
}

/// A style reduced to what the indexed-color terminal model can express:
/// the four representable attribute flags plus palette slot indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermStyle {
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
    pub standout: bool,
    pub fg: Option<u16>,
    pub bg: Option<u16>,
}

/// Phases of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Collecting,
    Applying,
    Committed,
    RolledBack,
}

/// Orchestrates refresh cycles over a palette allocator and the host's
/// styling callbacks. Owns all palette state for the cycle's duration.
pub struct SyncController<C: TtyChannel> {
    allocator: PaletteAllocator<C>,
    config: SyncConfig,
    blacklist: Option<Regex>,
    phase: Phase,
}

/// Detect the terminal and run one refresh cycle against it.
///
/// An unsupported environment (unrecognized terminal, too few colors, no
/// usable device) is a silent no-op, not an error.
pub fn refresh(config: &SyncConfig, host: &mut impl HostStyles) -> Result<()> {
    match SyncController::from_env(config.clone()) {
        Some(mut controller) => controller.refresh(host),
        None => {
            debug!("terminal not supported, skipping palette sync");
            Ok(())
        }
    }
}

impl SyncController<Box<dyn TtyChannel>> {
    /// Build a controller for the live environment: probe the terminal,
    /// open the device, and stack multiplexer wrappers as needed. `None`
    /// means the environment is unsupported.
    pub fn from_env(config: SyncConfig) -> Option<Self> {
        let probe = TermProbe::from_env();
        let support = detect::detect(&probe, &config)?;
        let direct = match DirectChannel::open() {
            Ok(chan) => chan,
            Err(err) => {
                debug!(error = %err, "terminal device unavailable");
                return None;
            }
        };
        let channel: Box<dyn TtyChannel> = match support.multiplexer {
            Multiplexer::None => Box::new(direct),
            Multiplexer::Screen => Box::new(ScreenChannel::new(Box::new(direct))),
            Multiplexer::Tmux => Box::new(TmuxChannel::new(Box::new(direct))),
        };
        Some(Self::new(channel, support, config))
    }
}

impl<C: TtyChannel> SyncController<C> {
    /// Build a controller over an already-detected terminal and channel.
    pub fn new(channel: C, support: TermSupport, config: SyncConfig) -> Self {
        let defaults = match support.family {
            TermFamily::Xterm => defaults::xterm_256(),
            TermFamily::Rxvt => defaults::rxvt_88(),
        };
        let allocator =
            PaletteAllocator::new(channel, support.max_colors, defaults, support.reset);
        let blacklist = config.blacklist.as_deref().and_then(|pattern| {
            match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(pattern, error = %err, "invalid blacklist pattern, ignoring");
                    None
                }
            }
        });
        Self {
            allocator,
            config,
            blacklist,
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run one full refresh cycle: snapshot styles, program the palette,
    /// apply every style, commit. Any fatal failure rolls the terminal
    /// back to a clean reset and surfaces the *original* error; a failure
    /// inside the rollback itself is logged, never propagated.
    pub fn refresh(&mut self, host: &mut impl HostStyles) -> Result<()> {
        self.phase = Phase::Collecting;
        match self.run_cycle(host) {
            Ok(()) => {
                self.phase = Phase::Committed;
                debug!("palette sync committed");
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::RolledBack;
                if let Err(cleanup) = self.reset() {
                    warn!(error = %cleanup, "rollback cleanup failed");
                }
                Err(err)
            }
        }
    }

    /// Restore default palette and cursor color. Used both as the rollback
    /// path and directly by the host on shutdown or theme unload.
    pub fn reset(&mut self) -> Result<()> {
        let palette = self.allocator.reset_colors();
        let cursor = self.reset_cursor();
        // Attempt both even if the first fails; report the first failure.
        palette.and(cursor)
    }

    fn run_cycle(&mut self, host: &mut impl HostStyles) -> Result<()> {
        let listing = host.style_listing()?;
        let mut resolver = StyleResolver::new(parser::parse_listing(&listing));
        let (fallback_fg, fallback_bg) = self.config.fallback_colors();
        let (base_fg, base_bg) = resolver.build_overrides(fallback_fg, fallback_bg);
        self.allocator.restart_colors();

        // The base style first: every pseudo-color and the background
        // classification are defined relative to it. Unlike other styles it
        // always carries both colors - the fallbacks fill any gap - so its
        // foreground and background take the first two (maximally
        // separated) slots.
        let resolved = resolver.terminal_style(BASE_STYLE);
        let fg = self.allocator.get_color(resolved.fg.unwrap_or(base_fg))?;
        let bg = self.allocator.get_color(resolved.bg.unwrap_or(base_bg))?;
        host.apply_style(
            BASE_STYLE,
            &TermStyle {
                bold: resolved.bold,
                underline: resolved.underline,
                reverse: resolved.reverse,
                standout: resolved.standout,
                fg: Some(fg),
                bg: Some(bg),
            },
        )?;
        host.set_background(resolver.classify_background())?;

        self.phase = Phase::Applying;
        let names: Vec<String> = resolver
            .names()
            .filter(|name| *name != BASE_STYLE)
            .filter(|name| !GUI_ONLY_STYLES.contains(name))
            .map(str::to_string)
            .collect();
        for name in &names {
            if let Some(re) = &self.blacklist {
                if re.is_match(name) {
                    debug!(style = %name, "blacklisted, leaving untouched");
                    continue;
                }
            }
            if let Some(StyleDef::Link { target }) = resolver.get(name).map(|r| &r.def) {
                host.link_style(name, target)?;
            } else {
                self.apply_concrete(host, &resolver, name)?;
            }
        }

        self.allocator.finish_colors()?;
        self.sync_cursor(&resolver)
    }

    /// Resolve one concrete style, allocate its colors, and hand the
    /// terminal-compatible result to the host.
    fn apply_concrete(
        &mut self,
        host: &mut impl HostStyles,
        resolver: &StyleResolver,
        name: &str,
    ) -> Result<()> {
        let resolved = resolver.terminal_style(name);
        let fg = resolved
            .fg
            .map(|rgb| self.allocator.get_color(rgb))
            .transpose()?;
        let bg = resolved
            .bg
            .map(|rgb| self.allocator.get_color(rgb))
            .transpose()?;
        host.apply_style(
            name,
            &TermStyle {
                bold: resolved.bold,
                underline: resolved.underline,
                reverse: resolved.reverse,
                standout: resolved.standout,
                fg,
                bg,
            },
        )
    }

    /// Program the cursor color from the `Cursor` style's background, or
    /// reset it when that color is unset or relative (a pseudo-color only
    /// means something for cell styling, not the cursor).
    fn sync_cursor(&mut self, resolver: &StyleResolver) -> Result<()> {
        let cursor = resolver.resolve("Cursor");
        match cursor.bg.map(ColorValue::lookup_named) {
            Some(ColorValue::Rgb(rgb)) => self.set_cursor_color(rgb),
            _ => self.reset_cursor(),
        }
    }

    fn set_cursor_color(&mut self, rgb: Rgb) -> Result<()> {
        let code = format!("\x1b]12;{}\x07", rgb.to_osc_spec());
        self.allocator.channel_mut().send_code(code.as_bytes())
    }

    fn reset_cursor(&mut self) -> Result<()> {
        let code = match &self.config.cursor_reset {
            Some(custom) => custom.clone().into_bytes(),
            None => OSC_CURSOR_RESET.to_vec(),
        };
        self.allocator.channel_mut().send_code(&code)
    }
}
