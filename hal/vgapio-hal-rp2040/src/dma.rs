//! DMA memory transfers
//!
//! One channel, reused for every fill and copy. Each call starts the
//! transfer and spins until the channel reports completion.

use embassy_futures::block_on;
use embassy_rp::dma::{self, AnyChannel, Channel};
use embassy_rp::pac::dma::vals::TreqSel;
use embassy_rp::Peri;

use vgapio_core::MemoryTransfer;

/// [`MemoryTransfer`] backed by a DMA channel
pub struct DmaMemory<'d> {
    channel: Peri<'d, AnyChannel>,
}

impl<'d> DmaMemory<'d> {
    pub fn new(channel: Peri<'d, impl Channel>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    /// Channel number, for logs
    pub fn channel(&self) -> u8 {
        self.channel.number()
    }
}

impl MemoryTransfer for DmaMemory<'_> {
    fn fill(&mut self, dest: &mut [u8], value: u8) {
        if dest.is_empty() {
            return;
        }

        // SAFETY: `value` and `dest` outlive the transfer, which is driven to
        // completion before returning.
        let transfer = unsafe {
            dma::read(
                self.channel.reborrow(),
                &value as *const u8,
                dest as *mut [u8],
                TreqSel::PERMANENT,
            )
        };
        block_on(transfer);
    }

    fn copy(&mut self, dest: &mut [u8], src: &[u8]) {
        assert_eq!(dest.len(), src.len(), "copy regions differ in length");
        if dest.is_empty() {
            return;
        }

        // SAFETY: as for `fill`
        let transfer = unsafe { dma::copy(self.channel.reborrow(), src, dest) };
        block_on(transfer);
    }
}
