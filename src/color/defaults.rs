//! Default palettes for the dynamic slot range.
//!
//! Used by the default-replay reset strategy to put the terminal's
//! reprogrammable slots back to their stock values when the terminal has no
//! native palette-reset capability.

use super::Rgb;

/// Default colors for slots 16..=255 of xterm-family terminals:
/// a 6x6x6 color cube followed by a 24-step grayscale ramp.
pub fn xterm_256() -> Vec<(u16, Rgb)> {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let mut out = Vec::with_capacity(240);
    for r in 0..6u16 {
        for g in 0..6u16 {
            for b in 0..6u16 {
                let index = 16 + 36 * r + 6 * g + b;
                out.push((
                    index,
                    Rgb::new(LEVELS[r as usize], LEVELS[g as usize], LEVELS[b as usize]),
                ));
            }
        }
    }
    for step in 0..24u16 {
        let level = (8 + 10 * step) as u8;
        out.push((232 + step, Rgb::new(level, level, level)));
    }
    out
}

/// Default colors for slots 16..=87 of 88-color rxvt-family terminals:
/// a 4x4x4 color cube followed by an 8-step grayscale ramp.
pub fn rxvt_88() -> Vec<(u16, Rgb)> {
    const LEVELS: [u8; 4] = [0, 139, 205, 255];
    let mut out = Vec::with_capacity(72);
    for r in 0..4u16 {
        for g in 0..4u16 {
            for b in 0..4u16 {
                let index = 16 + 16 * r + 4 * g + b;
                out.push((
                    index,
                    Rgb::new(LEVELS[r as usize], LEVELS[g as usize], LEVELS[b as usize]),
                ));
            }
        }
    }
    for step in 0..8u16 {
        let level = (46 + 24 * step) as u8;
        out.push((80 + step, Rgb::new(level, level, level)));
    }
    out
}
