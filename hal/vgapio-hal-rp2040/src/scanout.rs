//! Self re-arming scanout DMA pair
//!
//! Programs the two channels described by a [`ScanoutPlan`] and later
//! triggers the stream channel once. From then on the pair keeps itself going; the
//! CPU never touches it again.

use core::sync::atomic::{compiler_fence, Ordering};

use embassy_rp::dma::{AnyChannel, Channel};
use embassy_rp::pac;
use embassy_rp::pac::dma::regs::CtrlTrig;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use embassy_rp::Peri;

use vgapio_core::scanout::{FrameSource, ScanoutPhase, ScanoutPlan, ScanoutWiring};
use vgapio_core::transfer::{Pacing, TransferDescriptor, TransferSize};
use vgapio_core::FRAMEBUFFER_LEN;

/// Scanout engine owning the stream (A) and rearm (B) channels
pub struct Scanout<'d> {
    stream: Peri<'d, AnyChannel>,
    rearm: Peri<'d, AnyChannel>,
    plan: ScanoutPlan,
}

impl<'d> Scanout<'d> {
    /// Plan the chain from the framebuffer published in `source` into the
    /// FIFO at `fifo_addr`, paced by `fifo_dreq`
    ///
    /// Nothing is written to the channels until [`Scanout::configure`].
    pub fn new(
        stream: Peri<'d, impl Channel>,
        rearm: Peri<'d, impl Channel>,
        source: &'static FrameSource,
        fifo_addr: u32,
        fifo_dreq: u8,
    ) -> Self {
        let stream: Peri<'d, AnyChannel> = stream.into();
        let rearm: Peri<'d, AnyChannel> = rearm.into();

        let wiring = ScanoutWiring {
            stream_channel: stream.number(),
            rearm_channel: rearm.number(),
            stream_read_addr_reg: regs(&stream).read_addr().as_ptr() as usize as u32,
            fifo_addr,
            fifo_dreq,
        };
        let plan = ScanoutPlan::new(&wiring, source, FRAMEBUFFER_LEN as u32);

        Self {
            stream,
            rearm,
            plan,
        }
    }

    pub fn plan(&self) -> &ScanoutPlan {
        &self.plan
    }

    /// Program both channels without starting either
    ///
    /// The rearm channel is written through its non-triggering control
    /// alias so it only ever runs when the stream channel chains to it. The
    /// stream channel's control word waits for [`Scanout::trigger`].
    pub fn configure(&mut self) {
        let rearm = regs(&self.rearm);
        write_addresses(rearm, &self.plan.rearm);
        rearm.al1_ctrl().write_value(ctrl(&self.plan.rearm).0);

        write_addresses(regs(&self.stream), &self.plan.stream);
    }

    /// Start the stream channel; the chain runs on its own from here
    pub fn trigger(&mut self) {
        compiler_fence(Ordering::SeqCst);
        regs(&self.stream)
            .ctrl_trig()
            .write_value(ctrl(&self.plan.stream));
    }

    /// Which half of the chain the hardware is in right now
    pub fn phase(&self) -> ScanoutPhase {
        ScanoutPhase::from_busy(
            regs(&self.stream).ctrl_trig().read().busy(),
            regs(&self.rearm).ctrl_trig().read().busy(),
        )
    }
}

fn regs(ch: &Peri<'_, AnyChannel>) -> pac::dma::Channel {
    pac::DMA.ch(ch.number() as usize)
}

fn write_addresses(ch: pac::dma::Channel, desc: &TransferDescriptor) {
    ch.read_addr().write_value(desc.read_addr);
    ch.write_addr().write_value(desc.write_addr);
    ch.trans_count().write_value(desc.count);
}

fn ctrl(desc: &TransferDescriptor) -> CtrlTrig {
    let mut w = CtrlTrig::default();
    w.set_treq_sel(match desc.pacing {
        Pacing::Unpaced => TreqSel::PERMANENT,
        Pacing::Dreq(dreq) => TreqSel::from_bits(dreq),
    });
    w.set_data_size(match desc.size {
        TransferSize::Byte => DataSize::SIZE_BYTE,
        TransferSize::HalfWord => DataSize::SIZE_HALFWORD,
        TransferSize::Word => DataSize::SIZE_WORD,
    });
    w.set_incr_read(desc.incr_read);
    w.set_incr_write(desc.incr_write);
    w.set_chain_to(desc.chain_to);
    // Completion is observed through the chain, never through DMA_IRQ_0
    w.set_irq_quiet(true);
    w.set_en(true);
    w
}
