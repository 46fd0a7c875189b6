//! GNU screen DCS wrapper.

use tracing::trace;

use super::TtyChannel;
use crate::error::{Result, SyncError, SyncErrorKind};

/// screen truncates control strings longer than this.
const SCREEN_STRING_MAX: usize = 256;

/// `ESC P` + `ESC \`.
const WRAP_OVERHEAD: usize = 4;

/// Wraps an inner escape sequence in a Device Control String
/// (`ESC P <payload> ESC \`) so screen forwards it to the real terminal.
///
/// The payload is forwarded byte-for-byte with no escaping. That means a
/// literal `ESC \` inside the payload would terminate the DCS early; none
/// of the sequences this crate emits contain one, and callers must not rely
/// on sending one.
pub struct ScreenChannel {
    inner: Box<dyn TtyChannel>,
}

impl ScreenChannel {
    pub fn new(inner: Box<dyn TtyChannel>) -> Self {
        Self { inner }
    }
}

impl TtyChannel for ScreenChannel {
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
        let mut framed = Vec::with_capacity(code.len() + WRAP_OVERHEAD);
        framed.extend_from_slice(b"\x1bP");
        framed.extend_from_slice(code);
        framed.extend_from_slice(b"\x1b\\");
        trace!(inner = code.len(), framed = framed.len(), "screen DCS wrap");
        self.inner.send_code(&framed)
    }

    fn code_max(&self) -> usize {
        // Both screen's own control-string limit and whatever the inner
        // channel can carry apply; the wrapping costs 4 bytes either way.
        SCREEN_STRING_MAX
            .min(self.inner.code_max())
            .saturating_sub(WRAP_OVERHEAD)
    }
}
