//! Video timing configuration
//!
//! A mode is described per axis as active, front porch, sync pulse and back
//! porch, plus the pixel clock. It is reduced once, at start-up, into the
//! three generator parameters and the PIO clock dividers.

use crate::framebuffer::{HEIGHT, WIDTH};
use crate::generator::{
    self, COLOR_CYCLES_PER_PIXEL, HSYNC_BACK_PORCH_CYCLES, HSYNC_PULSE_CYCLES,
    HSYNC_RELOAD_CYCLES, PIXEL_CLOCK_CYCLES_PER_PERIOD, VSYNC_BACK_PORCH_LINES,
    VSYNC_FRONT_PORCH_LINES, VSYNC_PULSE_LINES,
};

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Timing of one axis
///
/// Horizontal values are in pixel clocks, vertical values in lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisTiming {
    /// Visible pixels or lines
    pub active: u32,
    /// Blank between the end of active video and the sync pulse
    pub front_porch: u32,
    /// Sync pulse width
    pub sync_pulse: u32,
    /// Blank between the sync pulse and the start of active video
    pub back_porch: u32,
}

impl AxisTiming {
    pub const fn new(active: u32, front_porch: u32, sync_pulse: u32, back_porch: u32) -> Self {
        Self {
            active,
            front_porch,
            sync_pulse,
            back_porch,
        }
    }

    /// Total pixels per line or lines per frame, including blanking
    pub const fn total(&self) -> u32 {
        self.active + self.front_porch + self.sync_pulse + self.back_porch
    }
}

/// Complete video mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoTiming {
    pub horizontal: AxisTiming,
    pub vertical: AxisTiming,
    /// Pixel clock in Hz
    pub pixel_clock_hz: u32,
}

/// 320x240 at ~63 Hz with a 6.25 MHz pixel clock (sys clock / 20)
pub const QVGA_320X240: VideoTiming = VideoTiming {
    horizontal: AxisTiming::new(320, 20, 10, 30),
    vertical: AxisTiming::new(240, 4, 2, 16),
    pixel_clock_hz: 6_250_000,
};

/// Parameters pushed into each generator's TX FIFO at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorParams {
    /// Loop count covering active + front porch, in pixel clocks
    pub hsync: u32,
    /// Active line count
    pub vsync: u32,
    /// Pixels per active line
    pub color: u32,
}

/// Which part of a mode the fixed generator programs cannot produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingMismatch {
    HorizontalSyncPulse { expected: u32, actual: u32 },
    HorizontalBackPorch { expected: u32, actual: u32 },
    VerticalFrontPorch { expected: u32, actual: u32 },
    VerticalSyncPulse { expected: u32, actual: u32 },
    VerticalBackPorch { expected: u32, actual: u32 },
    /// Active + front porch too short for the hsync counter
    HorizontalTooShort,
    /// No active lines or pixels
    EmptyActiveArea,
}

/// 16.8 fixed-point PIO clock divider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDivider {
    pub int: u16,
    pub frac: u8,
}

impl ClockDivider {
    /// Divider that makes a state machine run at `target_hz`
    ///
    /// Clamped to the hardware range; a zero target gives the slowest clock.
    pub fn for_frequency(sys_clk_hz: u32, target_hz: u32) -> Self {
        if target_hz == 0 {
            return Self {
                int: 0xFFFF,
                frac: 0xFF,
            };
        }

        // To get 8-bit fractional precision, multiply by 256 first
        let divider_x256 = (sys_clk_hz as u64 * 256) / (target_hz as u64);

        let int_part = (divider_x256 / 256).clamp(1, 0xFFFF) as u16;
        let frac_part = if int_part == 0xFFFF || divider_x256 < 256 {
            0
        } else {
            (divider_x256 % 256) as u8
        };

        Self {
            int: int_part,
            frac: frac_part,
        }
    }

    /// Raw bits in the layout of the PIO CLKDIV register's int/frac fields
    pub const fn to_bits(self) -> u32 {
        ((self.int as u32) << 8) | (self.frac as u32)
    }
}

/// Clock dividers for every state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorDividers {
    /// hsync and vsync: one cycle per pixel clock
    pub sync: ClockDivider,
    /// Colour generator: `COLOR_CYCLES_PER_PIXEL` cycles per pixel clock
    pub color: ClockDivider,
    /// Pixel clock strobe: two instructions per period
    pub pixel_clock: ClockDivider,
}

impl VideoTiming {
    pub const fn new(horizontal: AxisTiming, vertical: AxisTiming, pixel_clock_hz: u32) -> Self {
        Self {
            horizontal,
            vertical,
            pixel_clock_hz,
        }
    }

    /// Visible width in pixels
    pub const fn width(&self) -> u32 {
        self.horizontal.active
    }

    /// Visible height in lines
    pub const fn height(&self) -> u32 {
        self.vertical.active
    }

    /// Whether the active area matches the compile-time framebuffer
    pub const fn matches_framebuffer(&self) -> bool {
        self.width() as usize == WIDTH && self.height() as usize == HEIGHT
    }

    /// Reduce to the three generator start-up parameters
    ///
    /// hsync's counter loop runs `n + 1` times and is preceded by a one-cycle
    /// reload, so two cycles come off active + front porch. vsync and colour
    /// count with the same `n + 1` loop and no reload inside the count.
    pub const fn generator_params(&self) -> GeneratorParams {
        let h = &self.horizontal;
        GeneratorParams {
            hsync: (h.active + h.front_porch).saturating_sub(1 + HSYNC_RELOAD_CYCLES),
            vsync: self.vertical.active.saturating_sub(1),
            color: h.active.saturating_sub(1),
        }
    }

    /// PIO clock dividers for a given system clock
    pub fn dividers(&self, sys_clk_hz: u32) -> GeneratorDividers {
        let pclk = self.pixel_clock_hz;
        GeneratorDividers {
            sync: ClockDivider::for_frequency(sys_clk_hz, pclk),
            color: ClockDivider::for_frequency(
                sys_clk_hz,
                pclk.saturating_mul(COLOR_CYCLES_PER_PIXEL),
            ),
            pixel_clock: ClockDivider::for_frequency(
                sys_clk_hz,
                pclk.saturating_mul(PIXEL_CLOCK_CYCLES_PER_PERIOD),
            ),
        }
    }

    /// Check the mode against the porches baked into the generator programs
    pub const fn check_generators(&self) -> Result<(), TimingMismatch> {
        let h = &self.horizontal;
        let v = &self.vertical;

        if h.active == 0 || v.active == 0 {
            return Err(TimingMismatch::EmptyActiveArea);
        }
        if h.active + h.front_porch < 1 + HSYNC_RELOAD_CYCLES {
            return Err(TimingMismatch::HorizontalTooShort);
        }
        if h.sync_pulse != HSYNC_PULSE_CYCLES {
            return Err(TimingMismatch::HorizontalSyncPulse {
                expected: HSYNC_PULSE_CYCLES,
                actual: h.sync_pulse,
            });
        }
        if h.back_porch != HSYNC_BACK_PORCH_CYCLES {
            return Err(TimingMismatch::HorizontalBackPorch {
                expected: HSYNC_BACK_PORCH_CYCLES,
                actual: h.back_porch,
            });
        }
        if v.front_porch != VSYNC_FRONT_PORCH_LINES {
            return Err(TimingMismatch::VerticalFrontPorch {
                expected: VSYNC_FRONT_PORCH_LINES,
                actual: v.front_porch,
            });
        }
        if v.sync_pulse != VSYNC_PULSE_LINES {
            return Err(TimingMismatch::VerticalSyncPulse {
                expected: VSYNC_PULSE_LINES,
                actual: v.sync_pulse,
            });
        }
        if v.back_porch != VSYNC_BACK_PORCH_LINES {
            return Err(TimingMismatch::VerticalBackPorch {
                expected: VSYNC_BACK_PORCH_LINES,
                actual: v.back_porch,
            });
        }
        Ok(())
    }

    /// Line rate in Hz
    pub const fn line_rate_hz(&self) -> u32 {
        let total = self.horizontal.total();
        if total == 0 {
            return 0;
        }
        self.pixel_clock_hz / total
    }

    /// Frame rate in hundredths of a Hz
    pub const fn refresh_rate_centihz(&self) -> u32 {
        let frame = self.horizontal.total() as u64 * self.vertical.total() as u64;
        if frame == 0 {
            return 0;
        }
        ((self.pixel_clock_hz as u64 * 100) / frame) as u32
    }

    /// hsync cycles per line the generator will actually produce
    pub const fn generated_line_cycles(&self) -> u32 {
        generator::hsync_line_cycles(self.generator_params().hsync)
    }

    /// Lines per frame the vsync generator will actually produce
    pub const fn generated_frame_lines(&self) -> u32 {
        generator::vsync_frame_lines(self.generator_params().vsync)
    }
}
