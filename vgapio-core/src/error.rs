//! Start-up errors
//!
//! Everything here is fatal: the display either comes up completely or not
//! at all. Nothing is retried.

use core::fmt;

use crate::generator::Generator;

/// Errors from bringing the display up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// A generator program does not fit in the remaining instruction memory
    InstructionMemoryExhausted {
        generator: Generator,
        needed: u8,
        available: u8,
    },
    /// A program with a fixed origin collides with one already loaded
    AddressInUse { generator: Generator, offset: u8 },
    /// The timing's active area does not match the framebuffer
    ResolutionMismatch { width: u16, height: u16 },
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::InstructionMemoryExhausted {
                generator,
                needed,
                available,
            } => write!(
                f,
                "{} program needs {} instructions, only {} free",
                generator.name(),
                needed,
                available
            ),
            InitError::AddressInUse { generator, offset } => {
                write!(f, "{} program origin {} already in use", generator.name(), offset)
            }
            InitError::ResolutionMismatch { width, height } => {
                write!(f, "timing is {}x{}, framebuffer is not", width, height)
            }
        }
    }
}
