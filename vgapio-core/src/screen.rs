//! Framebuffer drawing entry points
//!
//! [`Screen`] pairs the framebuffer with a [`MemoryTransfer`] so that whole
//! frame updates go through the transfer engine instead of the CPU. Writes
//! land while scanout is reading; there is no tearing protection.

use crate::color::Color;
use crate::framebuffer::{Framebuffer, FRAMEBUFFER_LEN};
use crate::transfer::MemoryTransfer;

/// Writable view of the displayed framebuffer
pub struct Screen<'fb, M: MemoryTransfer> {
    framebuffer: &'fb mut Framebuffer,
    memory: M,
}

impl<'fb, M: MemoryTransfer> Screen<'fb, M> {
    pub fn new(framebuffer: &'fb mut Framebuffer, memory: M) -> Self {
        Self {
            framebuffer,
            memory,
        }
    }

    /// Fill every pixel with one colour
    pub fn fill_screen(&mut self, color: Color) {
        self.memory
            .fill(self.framebuffer.as_bytes_mut(), color.pack());
    }

    /// Replace the whole frame
    pub fn draw_frame(&mut self, frame: &[u8; FRAMEBUFFER_LEN]) {
        self.memory.copy(self.framebuffer.as_bytes_mut(), frame);
    }

    /// Set a single pixel; off-screen coordinates are ignored
    pub fn write_pixel(&mut self, x: usize, y: usize, color: Color) {
        self.framebuffer.set_pixel(x, y, color);
    }

    /// Copy the current frame out into `dest`
    pub fn read_frame(&mut self, dest: &mut [u8; FRAMEBUFFER_LEN]) {
        self.memory.copy(dest, self.framebuffer.as_bytes());
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &*self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut *self.framebuffer
    }

    /// The transfer engine, for fills and copies outside the framebuffer
    pub fn memory(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Framebuffer and transfer engine together
    pub fn parts(&mut self) -> (&mut Framebuffer, &mut M) {
        (&mut *self.framebuffer, &mut self.memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{HEIGHT, WIDTH};
    use crate::transfer::CpuTransfer;

    /// Counts calls so tests can see the transfer engine was used
    #[derive(Default)]
    struct Counting {
        fills: usize,
        copies: usize,
    }

    impl MemoryTransfer for Counting {
        fn fill(&mut self, dest: &mut [u8], value: u8) {
            self.fills += 1;
            CpuTransfer.fill(dest, value);
        }

        fn copy(&mut self, dest: &mut [u8], src: &[u8]) {
            self.copies += 1;
            CpuTransfer.copy(dest, src);
        }
    }

    #[test]
    fn test_fill_screen_red() {
        let mut fb = Framebuffer::new();
        let mut screen = Screen::new(&mut fb, CpuTransfer);

        screen.fill_screen(Color::Red);

        assert!(screen
            .framebuffer()
            .as_bytes()
            .iter()
            .all(|&b| b == Color::Red.pack()));
    }

    #[test]
    #[cfg(not(feature = "rgb-order"))]
    fn test_fill_screen_red_is_bgr_0b100() {
        let mut fb = Framebuffer::new();
        Screen::new(&mut fb, CpuTransfer).fill_screen(Color::Red);

        assert_eq!(fb.as_bytes().len(), 76_800);
        assert!(fb.as_bytes().iter().all(|&b| b == 0b100));
    }

    #[test]
    fn test_fill_screen_uses_one_transfer() {
        let mut fb = Framebuffer::new();
        let mut screen = Screen::new(&mut fb, Counting::default());

        screen.fill_screen(Color::Blue);
        screen.fill_screen(Color::Blue);

        assert_eq!(screen.memory().fills, 2);
        assert_eq!(screen.memory().copies, 0);
    }

    #[test]
    fn test_draw_frame() {
        let mut fb = Framebuffer::new();
        let mut screen = Screen::new(&mut fb, Counting::default());

        let mut frame = [0u8; FRAMEBUFFER_LEN];
        for (i, b) in frame.iter_mut().enumerate() {
            *b = (i % 8) as u8;
        }

        screen.draw_frame(&frame);

        assert_eq!(screen.memory().copies, 1);
        assert_eq!(screen.framebuffer().as_bytes()[..], frame[..]);
    }

    #[test]
    fn test_write_pixel() {
        let mut fb = Framebuffer::new();
        let mut screen = Screen::new(&mut fb, CpuTransfer);

        screen.write_pixel(WIDTH - 1, HEIGHT - 1, Color::White);
        screen.write_pixel(WIDTH, 0, Color::White);

        assert_eq!(
            screen.framebuffer().as_bytes()[FRAMEBUFFER_LEN - 1],
            Color::White.pack()
        );
        assert_eq!(
            screen.framebuffer().as_bytes().iter().filter(|&&b| b != 0).count(),
            1
        );
    }

    #[test]
    fn test_read_frame() {
        let mut fb = Framebuffer::new();
        let mut screen = Screen::new(&mut fb, CpuTransfer);
        screen.fill_screen(Color::Green);

        let mut out = [0u8; FRAMEBUFFER_LEN];
        screen.read_frame(&mut out);

        assert!(out.iter().all(|&b| b == Color::Green.pack()));
    }

    #[test]
    fn test_parts() {
        let mut fb = Framebuffer::new();
        let mut screen = Screen::new(&mut fb, CpuTransfer);

        let (framebuffer, memory) = screen.parts();
        memory.fill(&mut framebuffer.as_bytes_mut()[..WIDTH], Color::Cyan.pack());

        assert_eq!(screen.framebuffer().pixel(WIDTH - 1, 0), Some(Color::Cyan));
        assert_eq!(screen.framebuffer().pixel(0, 1), Some(Color::Black));
    }
}
