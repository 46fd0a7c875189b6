//! Terminal escape-sequence channels.
//!
//! A [`TtyChannel`] carries one complete escape sequence to the terminal.
//! The direct channel writes straight to the terminal device; the
//! multiplexer channels re-frame the sequence inside the multiplexer's own
//! control string and delegate to an inner channel, so nested multiplexing
//! composes by chaining wrappers.
//!
//! Every channel declares `code_max`: the largest payload it accepts in one
//! `send_code` call, after its own framing overhead. Callers size their
//! batches against this budget; a payload over budget is rejected rather
//! than split.

mod direct;
mod screen;
mod tmux;

pub use direct::DirectChannel;
pub use screen::ScreenChannel;
pub use tmux::TmuxChannel;

use crate::error::Result;

/// A sink for raw terminal escape sequences.
pub trait TtyChannel {
    /// Send one complete escape sequence. Fails with `CodeTooLong` if the
    /// sequence exceeds [`code_max`](Self::code_max).
    fn send_code(&mut self, code: &[u8]) -> Result<()>;

    /// The largest payload this channel carries in one call.
    fn code_max(&self) -> usize;
}

impl TtyChannel for Box<dyn TtyChannel> {
    fn send_code(&mut self, code: &[u8]) -> Result<()> {
        (**self).send_code(code)
    }

    fn code_max(&self) -> usize {
        (**self).code_max()
    }
}
