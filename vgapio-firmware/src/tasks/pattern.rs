//! Test pattern task
//!
//! Cycles through a fixed sequence so every drawing path gets exercised:
//! colour bars and a checkerboard through `draw_frame`, every colour
//! through `fill_screen`, and a border through `write_pixel`.

use defmt::*;
use embassy_rp::peripherals::PIO1;
use embassy_time::{Duration, Instant, Timer};

use vgapio_core::framebuffer::{HEIGHT, WIDTH};
use vgapio_core::pattern::{checkerboard, color_bars};
use vgapio_core::{Color, FRAMEBUFFER_LEN};
use vgapio_hal_rp2040::Vga;

/// How long each full-frame pattern stays up
const HOLD: Duration = Duration::from_secs(3);

/// How long each solid fill stays up
const FILL_HOLD: Duration = Duration::from_millis(750);

/// Pattern task - owns the display and redraws forever
#[embassy_executor::task]
pub async fn pattern_task(mut vga: Vga<'static, PIO1>, frame: &'static mut [u8; FRAMEBUFFER_LEN]) {
    info!("Pattern task started");

    loop {
        color_bars(frame);
        let start = Instant::now();
        vga.draw_frame(frame);
        debug!("Colour bars drawn in {} us", start.elapsed().as_micros());
        Timer::after(HOLD).await;

        checkerboard(frame, 16, Color::Black, Color::White);
        vga.draw_frame(frame);
        Timer::after(HOLD).await;

        for color in Color::ALL {
            let start = Instant::now();
            vga.fill_screen(color);
            debug!(
                "Filled {} in {} us, scanout {}",
                color,
                start.elapsed().as_micros(),
                vga.scanout_phase()
            );
            Timer::after(FILL_HOLD).await;
        }

        vga.fill_screen(Color::Blue);
        draw_border(&mut vga, Color::Yellow);
        Timer::after(HOLD).await;
    }
}

/// One-pixel frame around the visible area
fn draw_border(vga: &mut Vga<'static, PIO1>, color: Color) {
    for x in 0..WIDTH {
        vga.write_pixel(x, 0, color);
        vga.write_pixel(x, HEIGHT - 1, color);
    }
    for y in 0..HEIGHT {
        vga.write_pixel(0, y, color);
        vga.write_pixel(WIDTH - 1, y, color);
    }
}
