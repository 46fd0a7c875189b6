//! Palette slot allocation and batched OSC 4 programming.
//!
//! The allocator hands out terminal color slots for resolved RGB values
//! during one refresh cycle. Slots 0..16 are the terminal's system colors
//! and are never reassigned; the dynamic range is 16..max_colors. Slot
//! assignments accumulate into an OSC 4 batch that is flushed whenever the
//! next command would push the serialized sequence over the channel's byte
//! budget, and once more at `finish_colors`.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::channel::TtyChannel;
use crate::color::Rgb;
use crate::error::{Result, SyncError, SyncErrorKind};

/// `ESC ] 4` + `BEL` around the batched slot assignments.
const OSC4_OVERHEAD: usize = 4;

/// Fixed commands the terminal understands natively.
const OSC_RESET_PALETTE: &[u8] = b"\x1b]104\x07";

/// First dynamically assignable slot.
pub const FIRST_SLOT: u16 = 16;

/// How the terminal's palette is put back to stock values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStrategy {
    /// The terminal understands `OSC 104` (xterm patch 244 and later).
    Capability,
    /// No native reset: replay the family's default palette slot by slot.
    DefaultReplay,
}

/// Assigns terminal color slots to RGB values and batches the
/// slot-assignment commands onto a [`TtyChannel`].
pub struct PaletteAllocator<C: TtyChannel> {
    channel: C,
    max_colors: u16,
    slots: HashMap<Rgb, u16>,
    allocated: u16,
    batch: String,
    reset: ResetStrategy,
    defaults: Vec<(u16, Rgb)>,
}

impl<C: TtyChannel> PaletteAllocator<C> {
    pub fn new(
        channel: C,
        max_colors: u16,
        defaults: Vec<(u16, Rgb)>,
        reset: ResetStrategy,
    ) -> Self {
        Self {
            channel,
            max_colors,
            slots: HashMap::new(),
            allocated: 0,
            batch: String::new(),
            reset,
            defaults,
        }
    }

    /// The channel this allocator writes through, for callers that need to
    /// send non-palette sequences (cursor color) over the same path.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Discard any pending batch without touching slot assignments.
    pub fn start_colors(&mut self) {
        self.batch.clear();
    }

    /// Begin a fresh cycle: all slot assignments are discarded and the
    /// pending batch cleared.
    pub fn restart_colors(&mut self) {
        self.slots.clear();
        self.allocated = 0;
        self.start_colors();
    }

    /// Slot for `color`, allocating one if this value is new this cycle.
    ///
    /// The first allocation takes `max_colors - 1`, subsequent ones wrap to
    /// 16, 17, 18, … so the first two colors requested (the base style's
    /// foreground and background) sit as far apart in index space as
    /// possible and stay distinguishable if the terminal falls back to its
    /// default palette mid-session.
    pub fn get_color(&mut self, color: Rgb) -> Result<u16> {
        if let Some(&slot) = self.slots.get(&color) {
            return Ok(slot);
        }
        let capacity = self.max_colors.saturating_sub(FIRST_SLOT);
        if self.allocated >= capacity {
            return Err(SyncError::new(
                "palette",
                SyncErrorKind::OutOfColors {
                    max_colors: self.max_colors,
                },
            ));
        }
        let slot = if self.allocated == 0 {
            self.max_colors - 1
        } else {
            FIRST_SLOT + self.allocated - 1
        };
        self.allocated += 1;
        self.slots.insert(color, slot);
        self.priv_set_color(slot, color)?;
        trace!(slot, color = %color, "allocated palette slot");
        Ok(slot)
    }

    /// Flush the pending batch as one OSC 4 sequence. No-op when empty.
    pub fn finish_colors(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let mut code = Vec::with_capacity(self.batch.len() + OSC4_OVERHEAD);
        code.extend_from_slice(b"\x1b]4");
        code.extend_from_slice(self.batch.as_bytes());
        code.push(0x07);
        debug!(len = code.len(), "flushing palette batch");
        self.batch.clear();
        self.channel.send_code(&code)
    }

    /// Put the palette back to stock values and forget all assignments.
    pub fn reset_colors(&mut self) -> Result<()> {
        match self.reset {
            ResetStrategy::Capability => {
                debug!("resetting palette via OSC 104");
                self.restart_colors();
                self.channel.send_code(OSC_RESET_PALETTE)
            }
            ResetStrategy::DefaultReplay => {
                debug!(entries = self.defaults.len(), "replaying default palette");
                self.start_colors();
                let defaults = std::mem::take(&mut self.defaults);
                let mut result = Ok(());
                for &(slot, rgb) in &defaults {
                    if slot >= self.max_colors {
                        break;
                    }
                    if let Err(e) = self.priv_set_color(slot, rgb) {
                        result = Err(e);
                        break;
                    }
                }
                self.defaults = defaults;
                result?;
                self.finish_colors()?;
                self.restart_colors();
                Ok(())
            }
        }
    }

    /// Append one slot assignment to the batch, flushing first when the
    /// serialized batch would no longer fit the channel budget.
    fn priv_set_color(&mut self, slot: u16, color: Rgb) -> Result<()> {
        let command = format!(";{};{}", slot, color.to_osc_spec());
        if self.batch.len() + command.len() + OSC4_OVERHEAD > self.channel.code_max() {
            self.finish_colors()?;
        }
        self.batch.push_str(&command);
        Ok(())
    }
}
