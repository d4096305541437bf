//! Display bring-up order
//!
//! The hardware steps live behind [`DisplayHardware`]; [`bring_up`] owns the
//! order they run in. Scanout descriptors are written before any generator
//! runs, the generators start together with their clock dividers reset, and
//! the stream transfer is triggered last.

use crate::error::InitError;
use crate::timing::{GeneratorParams, VideoTiming};

/// Hardware side of display start-up
pub trait DisplayHardware {
    /// Load and configure every generator; state machines stay disabled
    fn load_generators(&mut self, timing: &VideoTiming) -> Result<(), InitError>;

    /// Write both scanout transfer descriptors without starting either
    fn configure_scanout(&mut self);

    /// Queue each generator's start-up parameter
    fn push_params(&mut self, params: &GeneratorParams);

    /// Restart every generator's clock divider and enable them in one write
    fn start_generators(&mut self);

    /// Start the stream transfer
    fn trigger_scanout(&mut self);
}

/// Bring the display up, or touch nothing if the mode is wrong
pub fn bring_up<H: DisplayHardware>(hw: &mut H, timing: &VideoTiming) -> Result<(), InitError> {
    if !timing.matches_framebuffer() {
        return Err(InitError::ResolutionMismatch {
            width: timing.width() as u16,
            height: timing.height() as u16,
        });
    }

    hw.load_generators(timing)?;
    hw.configure_scanout();
    hw.push_params(&timing.generator_params());
    hw.start_generators();
    hw.trigger_scanout();
    Ok(())
}
