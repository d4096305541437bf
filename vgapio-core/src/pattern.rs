//! Test patterns
//!
//! Whole-frame images built in a caller-owned buffer, ready for
//! `draw_frame`.

use crate::color::Color;
use crate::framebuffer::{FRAMEBUFFER_LEN, WIDTH};

/// Eight vertical bars in [`Color::ALL`] order
pub fn color_bars(frame: &mut [u8; FRAMEBUFFER_LEN]) {
    let bars = Color::ALL.len();
    for (i, px) in frame.iter_mut().enumerate() {
        let x = i % WIDTH;
        *px = Color::ALL[x * bars / WIDTH].pack();
    }
}

/// Square checkerboard with `cell` pixel squares
///
/// A zero cell size is treated as one.
pub fn checkerboard(frame: &mut [u8; FRAMEBUFFER_LEN], cell: usize, a: Color, b: Color) {
    let cell = cell.max(1);
    for (i, px) in frame.iter_mut().enumerate() {
        let (x, y) = (i % WIDTH, i / WIDTH);
        let odd = (x / cell + y / cell) % 2 == 1;
        *px = if odd { b.pack() } else { a.pack() };
    }
}
