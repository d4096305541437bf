//! Display facade
//!
//! [`Vga::new`] brings the whole display up in one go: it loads the timing
//! generators, plans the scanout chain, primes the generators and starts
//! everything. After that the picture is produced entirely by PIO and DMA
//! and the CPU only draws.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::dma::{AnyChannel, Channel};
use embassy_rp::Peri;

use vgapio_core::scanout::{FrameSource, ScanoutPhase};
use vgapio_core::timing::{GeneratorParams, VideoTiming};
use vgapio_core::{
    bring_up, Color, DisplayHardware, Framebuffer, InitError, Screen, FRAMEBUFFER_LEN,
};

use crate::dma::DmaMemory;
use crate::pio::{TimingGenerators, VgaPins, VgaPio};
use crate::scanout::Scanout;

/// The three DMA channels the display owns
pub struct DmaChannels<'d> {
    /// Streams the framebuffer into the colour FIFO
    pub stream: Peri<'d, AnyChannel>,
    /// Re-arms the stream channel at every frame boundary
    pub rearm: Peri<'d, AnyChannel>,
    /// Fill and copy for drawing
    pub memory: Peri<'d, AnyChannel>,
}

impl<'d> DmaChannels<'d> {
    pub fn new(
        stream: Peri<'d, impl Channel>,
        rearm: Peri<'d, impl Channel>,
        memory: Peri<'d, impl Channel>,
    ) -> Self {
        Self {
            stream: stream.into(),
            rearm: rearm.into(),
            memory: memory.into(),
        }
    }
}

/// Everything start-up drives, borrowed for the duration of [`Vga::new`]
struct StartupHardware<'a, 'd, PIO: VgaPio> {
    generators: &'a mut TimingGenerators<'d, PIO>,
    pins: &'a VgaPins<'d, PIO>,
    scanout: &'a mut Scanout<'d>,
}

impl<PIO: VgaPio> DisplayHardware for StartupHardware<'_, '_, PIO> {
    fn load_generators(&mut self, timing: &VideoTiming) -> Result<(), InitError> {
        self.generators.load(self.pins, timing, clk_sys_freq())
    }

    fn configure_scanout(&mut self) {
        self.scanout.configure();
    }

    fn push_params(&mut self, params: &GeneratorParams) {
        self.generators.push_params(params);
    }

    fn start_generators(&mut self) {
        self.generators.start();
    }

    fn trigger_scanout(&mut self) {
        self.scanout.trigger();
    }
}

/// A running display
pub struct Vga<'d, PIO: VgaPio> {
    // Held so the state machines and pins stay claimed
    _generators: TimingGenerators<'d, PIO>,
    _pins: VgaPins<'d, PIO>,
    scanout: Scanout<'d>,
    screen: Screen<'static, DmaMemory<'d>>,
    timing: VideoTiming,
}

impl<'d, PIO: VgaPio> Vga<'d, PIO> {
    /// Bring the display up and start scanout
    ///
    /// `source` is pointed at `framebuffer`; both must outlive scanout,
    /// which never stops.
    pub fn new(
        mut generators: TimingGenerators<'d, PIO>,
        pins: VgaPins<'d, PIO>,
        channels: DmaChannels<'d>,
        framebuffer: &'static mut Framebuffer,
        source: &'static FrameSource,
        timing: &VideoTiming,
    ) -> Result<Self, InitError> {
        source.point_at(framebuffer);
        let (fifo_addr, fifo_dreq) = generators.color_fifo();
        let mut scanout = Scanout::new(
            channels.stream,
            channels.rearm,
            source,
            fifo_addr,
            fifo_dreq,
        );

        bring_up(
            &mut StartupHardware {
                generators: &mut generators,
                pins: &pins,
                scanout: &mut scanout,
            },
            timing,
        )?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "scanout: ch{} -> ch{}, dreq {}",
            scanout.plan().stream.channel,
            scanout.plan().rearm.channel,
            fifo_dreq
        );

        Ok(Self {
            _generators: generators,
            _pins: pins,
            scanout,
            screen: Screen::new(framebuffer, DmaMemory::new(channels.memory)),
            timing: *timing,
        })
    }

    /// Fill every pixel with one colour
    pub fn fill_screen(&mut self, color: Color) {
        self.screen.fill_screen(color);
    }

    /// Replace the whole frame
    pub fn draw_frame(&mut self, frame: &[u8; FRAMEBUFFER_LEN]) {
        self.screen.draw_frame(frame);
    }

    /// Set a single pixel; off-screen coordinates are ignored
    pub fn write_pixel(&mut self, x: usize, y: usize, color: Color) {
        self.screen.write_pixel(x, y, color);
    }

    /// The drawing surface, for direct framebuffer access
    pub fn screen(&mut self) -> &mut Screen<'static, DmaMemory<'d>> {
        &mut self.screen
    }

    /// The DMA fill/copy engine
    pub fn memory(&mut self) -> &mut DmaMemory<'d> {
        self.screen.memory()
    }

    /// Which half of the scanout chain is running
    pub fn scanout_phase(&self) -> ScanoutPhase {
        self.scanout.phase()
    }

    pub fn timing(&self) -> &VideoTiming {
        &self.timing
    }
}
