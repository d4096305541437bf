//! vgapio - PIO/DMA raster video test firmware
//!
//! Brings up a 320x240 VGA-style display on PIO1 and DMA channels 0-2 from
//! the build-time configuration in display.toml, then hands it to a task
//! that cycles through test patterns.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::PIO1;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::Timer;
use static_cell::ConstStaticCell;
use {defmt_rtt as _, panic_probe as _};

use vgapio_core::scanout::FrameSource;
use vgapio_core::{Framebuffer, FRAMEBUFFER_LEN};
use vgapio_hal_rp2040::{DmaChannels, TimingGenerators, Vga};

#[macro_use]
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO1_IRQ_0 => InterruptHandler<PIO1>;
});

/// Displayed framebuffer; scanout reads it for as long as the chip runs
static FRAMEBUFFER: ConstStaticCell<Framebuffer> = ConstStaticCell::new(Framebuffer::new());

/// Address the scanout DMA reloads at every frame boundary
static FRAME_SOURCE: FrameSource = FrameSource::new();

/// Off-screen buffer the pattern task composes whole frames in
static PATTERN_FRAME: ConstStaticCell<[u8; FRAMEBUFFER_LEN]> =
    ConstStaticCell::new([0; FRAMEBUFFER_LEN]);

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("vgapio firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let timing = config::DISPLAY_TIMING;
    let refresh = timing.refresh_rate_centihz();
    info!(
        "Mode {}x{}, pixel clock {} Hz, line rate {} Hz, refresh {}.{} Hz",
        timing.width(),
        timing.height(),
        timing.pixel_clock_hz,
        timing.line_rate_hz(),
        refresh / 100,
        refresh % 100
    );

    let Pio {
        common,
        sm0,
        sm1,
        sm2,
        sm3,
        ..
    } = Pio::new(p.PIO1, Irqs);

    let mut generators = TimingGenerators::new(common, sm0, sm1, sm2, sm3);
    let pins = vga_pins!(generators.common_mut(), p);
    let channels = DmaChannels::new(p.DMA_CH0, p.DMA_CH1, p.DMA_CH2);

    let vga = match Vga::new(
        generators,
        pins,
        channels,
        FRAMEBUFFER.take(),
        &FRAME_SOURCE,
        &timing,
    ) {
        Ok(vga) => vga,
        Err(e) => {
            error!("Display init failed: {}", e);
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    info!("Scanout running ({})", vga.scanout_phase());

    spawner
        .spawn(tasks::pattern_task(vga, PATTERN_FRAME.take()))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
