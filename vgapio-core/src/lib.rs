//! Board-agnostic core of the vgapio raster video driver
//!
//! This crate contains everything about driving a VGA-style display that
//! does not touch registers:
//!
//! - Framebuffer layout and packed colours
//! - Video timing and the generator parameters derived from it
//! - The PIO timing generator programs and instruction memory accounting
//! - The scanout transfer chain plan and its phase model
//! - The blocking memory transfer interface used to draw
//! - The order the display is brought up in
//! - Test patterns

#![no_std]
#![deny(unsafe_code)]

pub mod color;
pub mod error;
pub mod framebuffer;
pub mod generator;
pub mod pattern;
pub mod scanout;
pub mod screen;
pub mod startup;
pub mod timing;
pub mod transfer;

pub use color::Color;
pub use error::InitError;
pub use framebuffer::{Framebuffer, FRAMEBUFFER_LEN, HEIGHT, WIDTH};
pub use generator::{Generator, InstructionBudget};
pub use scanout::{FrameSource, ScanoutPhase, ScanoutPlan, ScanoutWiring};
pub use screen::Screen;
pub use startup::{bring_up, DisplayHardware};
pub use timing::{VideoTiming, QVGA_320X240};
pub use transfer::{CpuTransfer, MemoryTransfer};
