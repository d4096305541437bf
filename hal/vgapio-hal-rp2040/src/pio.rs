//! PIO timing generators
//!
//! Uses one RP2040 PIO block for the whole display. Each generator program
//! is loaded once and bound to a fixed state machine:
//!
//! | SM | Generator   | Pins            | Clock              |
//! |----|-------------|-----------------|--------------------|
//! | 0  | hsync       | hsync (set)     | pixel clock        |
//! | 1  | vsync       | vsync (set)     | pixel clock        |
//! | 2  | colour      | 3 colour (out)  | 10 × pixel clock   |
//! | 3  | pixel clock | pclk (set)      | 2 × pixel clock    |
//!
//! hsync and vsync talk over PIO IRQ flags, so all four have to live in the
//! same block and be enabled in the same cycle.

use embassy_rp::gpio::Level;
use embassy_rp::pac;
use embassy_rp::peripherals::{PIO0, PIO1};
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, LoadError, LoadedProgram, Pin,
    PioPin, ShiftConfig, ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use pio::Program;

use vgapio_core::color;
use vgapio_core::generator::{Generator, InstructionBudget, INSTRUCTION_MEMORY_SIZE};
use vgapio_core::timing::{ClockDivider, GeneratorParams, VideoTiming};
use vgapio_core::InitError;

const _: () = assert!(
    Generator::HorizontalSync.slot() == 0
        && Generator::VerticalSync.slot() == 1
        && Generator::Color.slot() == 2
        && Generator::PixelClock.slot() == 3
);

/// A PIO block the display can run on
///
/// embassy's `Instance` keeps the register block private; this exposes the
/// two things the scanout DMA needs from it.
pub trait VgaPio: Instance {
    /// Block index (PIO0 = 0, PIO1 = 1)
    const NUMBER: u8;

    fn regs() -> pac::pio::Pio;

    /// Bus address of a state machine's TX FIFO
    fn tx_fifo_address(sm: usize) -> u32 {
        Self::regs().txf(sm).as_ptr() as usize as u32
    }

    /// DREQ number of a state machine's TX FIFO
    fn tx_dreq(sm: usize) -> u8 {
        Self::NUMBER * 8 + sm as u8
    }
}

impl VgaPio for PIO0 {
    const NUMBER: u8 = 0;

    fn regs() -> pac::pio::Pio {
        pac::PIO0
    }
}

impl VgaPio for PIO1 {
    const NUMBER: u8 = 1;

    fn regs() -> pac::pio::Pio {
        pac::PIO1
    }
}

/// Display pins, handed over to the PIO block
pub struct VgaPins<'d, PIO: Instance> {
    vsync: Pin<'d, PIO>,
    hsync: Pin<'d, PIO>,
    /// Colour pins in packed-bit order (bit 0 first)
    color: [Pin<'d, PIO>; 3],
    pclk: Pin<'d, PIO>,
}

impl<'d, PIO: Instance> VgaPins<'d, PIO> {
    /// Claim the display pins
    ///
    /// The three colour pins must be consecutive GPIOs in packed-bit order:
    /// blue, green, red by default, or red, green, blue with `rgb-order`.
    pub fn new(
        common: &mut Common<'d, PIO>,
        vsync: Peri<'d, impl PioPin>,
        hsync: Peri<'d, impl PioPin>,
        red: Peri<'d, impl PioPin>,
        green: Peri<'d, impl PioPin>,
        blue: Peri<'d, impl PioPin>,
        pclk: Peri<'d, impl PioPin>,
    ) -> Self {
        let vsync = common.make_pio_pin(vsync);
        let hsync = common.make_pio_pin(hsync);
        let red = common.make_pio_pin(red);
        let green = common.make_pio_pin(green);
        let blue = common.make_pio_pin(blue);
        let pclk = common.make_pio_pin(pclk);

        let color = if color::RED == 0b001 {
            [red, green, blue]
        } else {
            [blue, green, red]
        };

        Self {
            vsync,
            hsync,
            color,
            pclk,
        }
    }

    fn color_refs(&self) -> [&Pin<'d, PIO>; 3] {
        [&self.color[0], &self.color[1], &self.color[2]]
    }
}

/// The four state machines of one PIO block, running the display
pub struct TimingGenerators<'d, PIO: VgaPio> {
    common: Common<'d, PIO>,
    hsync: StateMachine<'d, PIO, 0>,
    vsync: StateMachine<'d, PIO, 1>,
    color: StateMachine<'d, PIO, 2>,
    pixel_clock: StateMachine<'d, PIO, 3>,
}

impl<'d, PIO: VgaPio> TimingGenerators<'d, PIO> {
    /// Take over a whole PIO block
    pub fn new(
        common: Common<'d, PIO>,
        hsync: StateMachine<'d, PIO, 0>,
        vsync: StateMachine<'d, PIO, 1>,
        color: StateMachine<'d, PIO, 2>,
        pixel_clock: StateMachine<'d, PIO, 3>,
    ) -> Self {
        Self {
            common,
            hsync,
            vsync,
            color,
            pixel_clock,
        }
    }

    /// PIO common resources, for claiming pins
    pub fn common_mut(&mut self) -> &mut Common<'d, PIO> {
        &mut self.common
    }

    /// Load every generator program and configure its state machine
    ///
    /// The combined footprint is checked first so nothing is loaded when
    /// the programs cannot all fit. State machines stay disabled.
    pub fn load(
        &mut self,
        pins: &VgaPins<'d, PIO>,
        timing: &VideoTiming,
        sys_clk_hz: u32,
    ) -> Result<(), InitError> {
        InstructionBudget::check(&InstructionBudget::builtin_footprint())?;
        let mut budget = InstructionBudget::new();

        let dividers = timing.dividers(sys_clk_hz);

        // hsync
        let program = self.load_program(&mut budget, Generator::HorizontalSync)?;
        let mut cfg = Config::default();
        cfg.use_program(&program, &[]);
        cfg.set_set_pins(&[&pins.hsync]);
        cfg.clock_divider = divider(dividers.sync);
        self.hsync.set_config(&cfg);
        self.hsync.set_pins(Level::High, &[&pins.hsync]);
        self.hsync.set_pin_dirs(PioDirection::Out, &[&pins.hsync]);

        // vsync
        let program = self.load_program(&mut budget, Generator::VerticalSync)?;
        let mut cfg = Config::default();
        cfg.use_program(&program, &[]);
        cfg.set_set_pins(&[&pins.vsync]);
        cfg.clock_divider = divider(dividers.sync);
        self.vsync.set_config(&cfg);
        self.vsync.set_pins(Level::High, &[&pins.vsync]);
        self.vsync.set_pin_dirs(PioDirection::Out, &[&pins.vsync]);

        // Colour: blanking uses `set`, pixels use `out`, same three pins
        let program = self.load_program(&mut budget, Generator::Color)?;
        let color_pins = pins.color_refs();
        let mut cfg = Config::default();
        cfg.use_program(&program, &[]);
        cfg.set_set_pins(&color_pins);
        cfg.set_out_pins(&color_pins);
        cfg.shift_out = ShiftConfig {
            auto_fill: false,
            threshold: 32,
            direction: ShiftDirection::Right,
        };
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.clock_divider = divider(dividers.color);
        self.color.set_config(&cfg);
        self.color.set_pins(Level::Low, &color_pins);
        self.color.set_pin_dirs(PioDirection::Out, &color_pins);

        // Pixel clock
        let program = self.load_program(&mut budget, Generator::PixelClock)?;
        let mut cfg = Config::default();
        cfg.use_program(&program, &[]);
        cfg.set_set_pins(&[&pins.pclk]);
        cfg.clock_divider = divider(dividers.pixel_clock);
        self.pixel_clock.set_config(&cfg);
        self.pixel_clock.set_pins(Level::Low, &[&pins.pclk]);
        self.pixel_clock.set_pin_dirs(PioDirection::Out, &[&pins.pclk]);

        Ok(())
    }

    fn load_program(
        &mut self,
        budget: &mut InstructionBudget,
        generator: Generator,
    ) -> Result<LoadedProgram<'d, PIO>, InitError> {
        let program: Program<INSTRUCTION_MEMORY_SIZE> = generator.program();
        let available = budget.available();
        budget.reserve(generator, program.code.len())?;

        let loaded = self
            .common
            .try_load_program(&program)
            .map_err(|e| match e {
                LoadError::InsufficientSpace => InitError::InstructionMemoryExhausted {
                    generator,
                    needed: program.code.len() as u8,
                    available: available as u8,
                },
                LoadError::AddressInUse(offset) => InitError::AddressInUse {
                    generator,
                    offset: offset as u8,
                },
            })?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{} program: {} instructions at {}",
            generator.name(),
            program.code.len(),
            loaded.origin
        );

        Ok(loaded)
    }

    /// Push each generator's start-up parameter into its TX FIFO
    pub fn push_params(&mut self, params: &GeneratorParams) {
        self.hsync.tx().push(params.hsync);
        self.vsync.tx().push(params.vsync);
        self.color.tx().push(params.color);
    }

    /// Restart all four clock dividers and enable the state machines in the
    /// same cycle, so their relative phase is fixed from the first edge
    pub fn start(&mut self) {
        let Self {
            common,
            hsync,
            vsync,
            color,
            pixel_clock,
        } = self;

        common.apply_sm_batch(|batch| {
            batch.restart(hsync);
            batch.restart(vsync);
            batch.restart(color);
            batch.restart(pixel_clock);
            batch.set_enable(hsync, true);
            batch.set_enable(vsync, true);
            batch.set_enable(color, true);
            batch.set_enable(pixel_clock, true);
        });
    }

    /// Bus address and DREQ of the colour generator's TX FIFO
    pub fn color_fifo(&self) -> (u32, u8) {
        let slot = Generator::Color.slot();
        (PIO::tx_fifo_address(slot), PIO::tx_dreq(slot))
    }
}

fn divider(div: ClockDivider) -> U24F8 {
    U24F8::from_bits(div.to_bits())
}
