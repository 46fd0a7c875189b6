//! Error types for palette synchronization.
//!
//! Every fatal condition is a [`SyncError`]: the kind of failure plus the
//! `origin` of the *first* failure site. The origin is set once and kept
//! through the rollback path, so a cleanup failure never masks the error
//! that triggered it.

use std::io;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// A fatal failure during a refresh cycle.
#[derive(Debug, Error)]
#[error("{origin}: {kind}")]
pub struct SyncError {
    origin: &'static str,
    #[source]
    kind: SyncErrorKind,
}

impl SyncError {
    /// Wrap an error kind with the component it first surfaced in.
    pub fn new(origin: &'static str, kind: SyncErrorKind) -> Self {
        Self { origin, kind }
    }

    /// A failure reported by the host styling callbacks.
    pub fn host(message: impl Into<String>) -> Self {
        Self::new("host", SyncErrorKind::Host(message.into()))
    }

    /// The component the error first surfaced in.
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn kind(&self) -> &SyncErrorKind {
        &self.kind
    }
}

/// The failure modes of a refresh cycle.
#[derive(Debug, Error)]
pub enum SyncErrorKind {
    /// Writing to the terminal device failed.
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),

    /// The dynamic slot range (16..max_colors) is fully allocated.
    #[error("out of terminal colors (palette limit {max_colors})")]
    OutOfColors { max_colors: u16 },

    /// A single escape sequence exceeds the channel's byte budget and
    /// cannot be carried even as its own frame.
    #[error("escape sequence of {len} bytes exceeds channel budget of {max}")]
    CodeTooLong { len: usize, max: usize },

    /// The host styling collaborator rejected a callback.
    #[error("host styling error: {0}")]
    Host(String),
}

pub(crate) trait ErrorContext<T> {
    /// Attach an origin to an I/O failure.
    fn origin(self, origin: &'static str) -> Result<T>;
}

impl<T> ErrorContext<T> for io::Result<T> {
    fn origin(self, origin: &'static str) -> Result<T> {
        self.map_err(|e| SyncError::new(origin, SyncErrorKind::Io(e)))
    }
}
