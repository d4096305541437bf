//! Framebuffer storage
//!
//! One byte per pixel, row-major, `index = y * WIDTH + x`. The size is fixed
//! at compile time so the buffer can live in a `static` whose address never
//! changes while the scanout DMA is reading it.

use crate::color::Color;

/// Visible pixels per line
pub const WIDTH: usize = 320;

/// Visible lines per frame
pub const HEIGHT: usize = 240;

/// Framebuffer length in bytes (and the scanout DMA transfer count)
pub const FRAMEBUFFER_LEN: usize = WIDTH * HEIGHT;

/// Pixel storage read by the scanout engine
///
/// Word-aligned so the DMA can be pointed at it without caring about
/// alignment if a wider transfer size is ever used.
#[repr(C, align(4))]
pub struct Framebuffer {
    pixels: [u8; FRAMEBUFFER_LEN],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Create a zeroed (all black) framebuffer
    pub const fn new() -> Self {
        Self {
            pixels: [0; FRAMEBUFFER_LEN],
        }
    }

    /// Byte index of a pixel, or `None` if it lies off screen
    pub const fn index(x: usize, y: usize) -> Option<usize> {
        if x < WIDTH && y < HEIGHT {
            Some(y * WIDTH + x)
        } else {
            None
        }
    }

    /// Read a pixel
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        Self::index(x, y).map(|i| Color::unpack(self.pixels[i]))
    }

    /// Write a pixel; off-screen coordinates are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if let Some(i) = Self::index(x, y) {
            self.pixels[i] = color.pack();
        }
    }

    /// Raw pixel bytes
    pub fn as_bytes(&self) -> &[u8; FRAMEBUFFER_LEN] {
        &self.pixels
    }

    /// Mutable raw pixel bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8; FRAMEBUFFER_LEN] {
        &mut self.pixels
    }

    /// Bus address of the first pixel, as programmed into the DMA
    pub fn start_address(&self) -> u32 {
        self.pixels.as_ptr() as usize as u32
    }

    /// Length in bytes
    pub const fn len(&self) -> usize {
        FRAMEBUFFER_LEN
    }

    /// Always false; present for API symmetry with slices
    pub const fn is_empty(&self) -> bool {
        FRAMEBUFFER_LEN == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(FRAMEBUFFER_LEN, 76_800);
        assert_eq!(Framebuffer::new().len(), 76_800);
    }

    #[test]
    fn test_starts_black() {
        let fb = Framebuffer::new();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(fb.pixel(0, 0), Some(Color::Black));
    }

    #[test]
    fn test_index_is_row_major() {
        assert_eq!(Framebuffer::index(0, 0), Some(0));
        assert_eq!(Framebuffer::index(319, 0), Some(319));
        assert_eq!(Framebuffer::index(0, 1), Some(320));
        assert_eq!(Framebuffer::index(319, 239), Some(FRAMEBUFFER_LEN - 1));
    }

    #[test]
    fn test_off_screen() {
        assert_eq!(Framebuffer::index(320, 0), None);
        assert_eq!(Framebuffer::index(0, 240), None);

        let mut fb = Framebuffer::new();
        fb.set_pixel(320, 10, Color::White);
        fb.set_pixel(10, 240, Color::White);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(fb.pixel(400, 400), None);
    }

    #[test]
    fn test_set_pixel() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(5, 7, Color::Cyan);

        assert_eq!(fb.pixel(5, 7), Some(Color::Cyan));
        assert_eq!(fb.as_bytes()[7 * WIDTH + 5], Color::Cyan.pack());
        assert_eq!(fb.pixel(6, 7), Some(Color::Black));
    }

    #[test]
    fn test_start_address_is_word_aligned() {
        let fb = Framebuffer::new();
        assert_eq!(fb.start_address() % 4, 0);
    }
}
