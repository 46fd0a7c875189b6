//! Direct terminal-device channel.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::trace;

use super::TtyChannel;
use crate::error::{ErrorContext, Result, SyncError, SyncErrorKind};

/// Writes escape sequences straight to the controlling terminal device.
///
/// There is no documented hard limit on how much a terminal accepts in one
/// write, so the budget is a generous fixed constant.
pub const DIRECT_CODE_MAX: usize = 32 * 1024;

pub struct DirectChannel {
    dev: File,
}

impl DirectChannel {
    /// Open the controlling terminal. Failure here means the environment
    /// has no usable channel, which callers treat as "unsupported", not as
    /// an error.
    pub fn open() -> io::Result<Self> {
        Self::open_path("/dev/tty")
    }

    /// Open a specific device path. Tests point this at a scratch file.
    pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let dev = OpenOptions::new().write(true).open(path)?;
        Ok(Self { dev })
    }
}

impl TtyChannel for DirectChannel {
    fn send_code(&mut self, code: &[u8]) -> Result<()> {
        if code.len() > DIRECT_CODE_MAX {
            return Err(SyncError::new(
                "channel",
                SyncErrorKind::CodeTooLong {
                    len: code.len(),
                    max: DIRECT_CODE_MAX,
                },
            ));
        }
        trace!(len = code.len(), "writing escape sequence to tty");
        self.dev.write_all(code).origin("channel")?;
        self.dev.flush().origin("channel")
    }

    fn code_max(&self) -> usize {
        DIRECT_CODE_MAX
    }
}
