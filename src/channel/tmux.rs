//! tmux pass-through wrapper.

use tracing::trace;

use super::TtyChannel;
use crate::error::{Result, SyncError, SyncErrorKind};

/// tmux's input buffer for a single pass-through sequence.
const TMUX_BUFFER_MAX: usize = 250;

/// `ESC P t m u x ;`
const PREFIX: &[u8] = b"\x1bPtmux;";
/// `ESC \`
const SUFFIX: &[u8] = b"\x1b\\";

/// Wraps an inner escape sequence in tmux's pass-through DCS
/// (`ESC P tmux ; <payload> ESC \`), doubling every ESC byte in the
/// payload. tmux collapses doubled ESCs back to one while parsing, so a
/// doubled pair counts once against its buffer; the advertised budget is
/// still computed pessimistically, as if every payload byte were an ESC
/// that doubles on the wire.
pub struct TmuxChannel {
    inner: Box<dyn TtyChannel>,
}

impl TmuxChannel {
    pub fn new(inner: Box<dyn TtyChannel>) -> Self {
        Self { inner }
    }
}

impl TtyChannel for TmuxChannel {
    fn send_code(&mut self, code: &[u8]) -> Result<()> {
        if code.len() > self.code_max() {
            return Err(SyncError::new(
                "channel",
                SyncErrorKind::CodeTooLong {
                    len: code.len(),
                    max: self.code_max(),
                },
            ));
        }
        let mut framed = Vec::with_capacity(PREFIX.len() + code.len() * 2 + SUFFIX.len());
        framed.extend_from_slice(PREFIX);
        for &byte in code {
            framed.push(byte);
            if byte == 0x1b {
                framed.push(0x1b);
            }
        }
        framed.extend_from_slice(SUFFIX);
        trace!(inner = code.len(), framed = framed.len(), "tmux pass-through wrap");
        self.inner.send_code(&framed)
    }

    fn code_max(&self) -> usize {
        let after_framing = self
            .inner
            .code_max()
            .saturating_sub(PREFIX.len() + SUFFIX.len());
        (after_framing / 2).min(TMUX_BUFFER_MAX)
    }
}
