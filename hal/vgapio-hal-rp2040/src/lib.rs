//! RP2040 backend for the vgapio raster video driver
//!
//! This crate drives a VGA-style display from one PIO block and three DMA
//! channels:
//!
//! - PIO timing generators (hsync, vsync, colour, pixel clock)
//! - Self re-arming scanout DMA pair
//! - DMA-backed fill and copy (implements `vgapio_core::MemoryTransfer`)
//! - The [`Vga`] facade tying them together

#![no_std]

pub mod dma;
pub mod pio;
pub mod scanout;
pub mod vga;

pub use dma::DmaMemory;
pub use pio::{TimingGenerators, VgaPins, VgaPio};
pub use vga::{DmaChannels, Vga};
