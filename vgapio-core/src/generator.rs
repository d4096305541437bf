//! Timing generator programs and instruction memory accounting
//!
//! The three generators (plus the pixel clock strobe) are fixed PIO
//! programs. Each one pulls a single parameter from its TX FIFO before the
//! wrap target and never pulls again, except the colour generator which
//! pulls one pixel per byte from the scanout DMA.
//!
//! # Cycle accounting
//!
//! The sync generators run at one state machine cycle per pixel clock.
//!
//! ```text
//! hsync:  mov x, osr            1 cycle
//!         jmp x-- active        x + 1 cycles   -> active + front porch
//!         set pins, 0 [9]       10 cycles      -> sync pulse
//!         set pins, 1 [27]      28 cycles
//!         irq 0 [1]             2 cycles       -> back porch, flag 0 raised
//! ```
//!
//! `jmp x--` branches while x is non-zero *before* the decrement, so a loop
//! seeded with `x` runs `x + 1` times, and the reload `mov` costs one more
//! cycle. The parameter is therefore `active + front_porch - 2`.
//!
//! vsync counts lines by waiting on flag 0, so its parameter is a plain line
//! count minus one; its porches are fixed in the program. Each
//! `wait 1 irq 0` opens a line, and a `set pins` lands in the line opened
//! by the wait just before it. The front porch loop runs five waits for four
//! lines (`set y, 4`), the pulse loop two for two, and the back porch loop
//! fifteen for sixteen (`set y, 14`) since it also owns the line opened by
//! the pulse loop's last wait.
//!
//! The colour generator runs `COLOR_CYCLES_PER_PIXEL` cycles per pixel and
//! its parameter is `width - 1`.

use heapless::Vec;
use pio::Program;

use crate::error::InitError;

/// Instruction memory shared by all state machines of one PIO block
pub const INSTRUCTION_MEMORY_SIZE: usize = 32;

/// hsync: cycles spent reloading the counter at the start of each line
pub const HSYNC_RELOAD_CYCLES: u32 = 1;

/// hsync: sync pulse length baked into the program
pub const HSYNC_PULSE_CYCLES: u32 = 10;

/// hsync: back porch length baked into the program
pub const HSYNC_BACK_PORCH_CYCLES: u32 = 30;

/// vsync: front porch lines baked into the program
pub const VSYNC_FRONT_PORCH_LINES: u32 = 4;

/// vsync: sync pulse lines baked into the program
pub const VSYNC_PULSE_LINES: u32 = 2;

/// vsync: back porch lines baked into the program
pub const VSYNC_BACK_PORCH_LINES: u32 = 16;

/// Colour generator cycles per pixel (`pull` + `out [4]` + `jmp [3]`)
pub const COLOR_CYCLES_PER_PIXEL: u32 = 10;

/// Pixel clock strobe instructions per pixel clock period
pub const PIXEL_CLOCK_CYCLES_PER_PERIOD: u32 = 2;

/// One of the state machines driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Generator {
    HorizontalSync,
    VerticalSync,
    Color,
    PixelClock,
}

impl Generator {
    /// Load order; also the order parameters are pushed
    pub const ALL: [Generator; 4] = [
        Generator::HorizontalSync,
        Generator::VerticalSync,
        Generator::Color,
        Generator::PixelClock,
    ];

    /// Fixed state machine slot within the PIO block
    pub const fn slot(self) -> usize {
        match self {
            Generator::HorizontalSync => 0,
            Generator::VerticalSync => 1,
            Generator::Color => 2,
            Generator::PixelClock => 3,
        }
    }

    /// Bit for this generator's state machine in an enable mask
    pub const fn mask(self) -> u8 {
        1 << self.slot()
    }

    /// Short name for logs
    pub const fn name(self) -> &'static str {
        match self {
            Generator::HorizontalSync => "hsync",
            Generator::VerticalSync => "vsync",
            Generator::Color => "color",
            Generator::PixelClock => "pclk",
        }
    }

    /// Assemble this generator's program
    pub fn program(self) -> Program<INSTRUCTION_MEMORY_SIZE> {
        match self {
            Generator::HorizontalSync => hsync_program(),
            Generator::VerticalSync => vsync_program(),
            Generator::Color => color_program(),
            Generator::PixelClock => pixel_clock_program(),
        }
    }
}

/// Horizontal sync: active + front porch, 10 cycle pulse, 30 cycle back porch
pub fn hsync_program() -> Program<INSTRUCTION_MEMORY_SIZE> {
    pio::pio_asm!(
        "pull block",
        ".wrap_target",
        "mov x, osr",
        "active:",
        "jmp x-- active",
        "set pins, 0 [9]",
        "set pins, 1 [27]",
        "irq 0 [1]",
        ".wrap"
    )
    .program
}

/// Vertical sync: counts lines from hsync's flag, triggers the colour generator
///
/// Edges land at the end of a line's back porch rather than on the hsync
/// leading edge, which monitors and panels accept.
pub fn vsync_program() -> Program<INSTRUCTION_MEMORY_SIZE> {
    pio::pio_asm!(
        "pull block",
        ".wrap_target",
        "mov x, osr",
        "active:",
        "wait 1 irq 0",
        "irq 1",
        "jmp x-- active",
        "set y, 4",
        "frontporch:",
        "wait 1 irq 0",
        "jmp y-- frontporch",
        "set pins, 0",
        "set y, 1",
        "syncpulse:",
        "wait 1 irq 0",
        "jmp y-- syncpulse",
        "set pins, 1",
        "set y, 14",
        "backporch:",
        "wait 1 irq 0",
        "jmp y-- backporch",
        ".wrap"
    )
    .program
}

/// Colour output: one byte per pixel from the TX FIFO onto three pins
pub fn color_program() -> Program<INSTRUCTION_MEMORY_SIZE> {
    pio::pio_asm!(
        "pull block",
        "mov y, osr",
        ".wrap_target",
        "set pins, 0",
        "mov x, y",
        "wait 1 irq 1",
        "pixel:",
        "pull block",
        "out pins, 3 [4]",
        "jmp x-- pixel [3]",
        ".wrap"
    )
    .program
}

/// Free-running square wave for panels that need a pixel clock
pub fn pixel_clock_program() -> Program<INSTRUCTION_MEMORY_SIZE> {
    pio::pio_asm!(
        ".wrap_target",
        "set pins, 1",
        "set pins, 0",
        ".wrap"
    )
    .program
}

/// hsync cycles per line for a given start-up parameter
pub const fn hsync_line_cycles(parameter: u32) -> u32 {
    HSYNC_RELOAD_CYCLES + (parameter + 1) + HSYNC_PULSE_CYCLES + HSYNC_BACK_PORCH_CYCLES
}

/// vsync lines per frame for a given start-up parameter
pub const fn vsync_frame_lines(parameter: u32) -> u32 {
    (parameter + 1) + VSYNC_FRONT_PORCH_LINES + VSYNC_PULSE_LINES + VSYNC_BACK_PORCH_LINES
}

/// Pixels the colour generator emits per active line for a given parameter
pub const fn color_line_pixels(parameter: u32) -> u32 {
    parameter + 1
}

/// Instruction memory accounting for one PIO block
///
/// Programs are reserved in order; the first one that does not fit fails
/// the whole start-up. Nothing is ever truncated.
#[derive(Debug, Clone, Default)]
pub struct InstructionBudget {
    reserved: Vec<(Generator, u8), 4>,
    used: usize,
}

impl InstructionBudget {
    /// Empty budget with all 32 instructions free
    pub const fn new() -> Self {
        Self {
            reserved: Vec::new(),
            used: 0,
        }
    }

    /// Instructions still free
    pub fn available(&self) -> usize {
        INSTRUCTION_MEMORY_SIZE - self.used
    }

    /// Instructions reserved so far
    pub fn used(&self) -> usize {
        self.used
    }

    /// Reservations in load order, with their lengths
    pub fn reserved(&self) -> &[(Generator, u8)] {
        &self.reserved
    }

    /// Reserve space for one generator's program
    pub fn reserve(&mut self, generator: Generator, len: usize) -> Result<(), InitError> {
        let available = self.available();
        if len > available || self.reserved.is_full() {
            return Err(InitError::InstructionMemoryExhausted {
                generator,
                needed: len.min(u8::MAX as usize) as u8,
                available: available as u8,
            });
        }
        // Capacity checked above
        let _ = self.reserved.push((generator, len as u8));
        self.used += len;
        Ok(())
    }

    /// Reserve every program in order, stopping at the first failure
    pub fn reserve_all(&mut self, programs: &[(Generator, usize)]) -> Result<(), InitError> {
        for &(generator, len) in programs {
            self.reserve(generator, len)?;
        }
        Ok(())
    }

    /// Check a whole set of programs without keeping the reservation
    pub fn check(programs: &[(Generator, usize)]) -> Result<usize, InitError> {
        let mut budget = Self::new();
        budget.reserve_all(programs)?;
        Ok(budget.used())
    }

    /// Footprint of the built-in generator programs
    pub fn builtin_footprint() -> [(Generator, usize); 4] {
        Generator::ALL.map(|g| (g, g.program().code.len()))
    }
}
