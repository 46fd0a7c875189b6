//! Terminal Palette Synchronization Engine
//!
//! Reprograms a terminal's indexed color palette to exactly match the
//! true-color intent of a declarative theme, then reconciles the terminal's
//! 256-slot-or-fewer color model back onto the theme's styles.
//!
//! The engine is invoked in-process by a host (an editor or TUI) that owns
//! the styles. One call to [`sync::refresh`] runs a full cycle: detect the
//! terminal, snapshot the host's styles through the [`sync::HostStyles`]
//! seam, allocate palette slots for every color in use, batch the
//! slot-assignment escape sequences within the active channel's byte budget
//! (re-framed for tmux or screen when a multiplexer sits in between), and
//! hand each style its terminal-side attribute/color set. On any fatal
//! failure the cycle rolls the terminal back to a clean reset and surfaces
//! the original error.

pub mod channel;
pub mod color;
pub mod config;
pub mod detect;
pub mod error;
pub mod palette;
pub mod styles;
pub mod sync;

pub use channel::{DirectChannel, ScreenChannel, TmuxChannel, TtyChannel};
pub use color::{Background, ColorValue, Rgb};
pub use config::SyncConfig;
pub use detect::{Multiplexer, TermFamily, TermProbe, TermSupport};
pub use error::{Result, SyncError, SyncErrorKind};
pub use palette::{PaletteAllocator, ResetStrategy};
pub use styles::{StyleRecord, StyleResolver};
pub use sync::{refresh, HostStyles, SyncController, TermStyle};
