//! Scanout transfer chain
//!
//! Two DMA descriptors keep the framebuffer flowing into the colour
//! generator forever:
//!
//! ```text
//!            chain                          chain
//!   ┌──────────────────────┐      ┌──────────────────────────┐
//!   │ A: stream            │ ───▶ │ B: rearm                 │ ───▶ A
//!   │ framebuffer → FIFO   │      │ FrameSource → A.READ_ADDR│
//!   │ N bytes, DREQ paced  │      │ 1 word, unpaced          │
//!   └──────────────────────┘      └──────────────────────────┘
//! ```
//!
//! B never moves pixels. It reloads A's read pointer from the
//! [`FrameSource`] handle and hands control back, so exactly one of the two
//! is running at any instant.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::framebuffer::Framebuffer;
use crate::transfer::{Pacing, TransferDescriptor, TransferSize};

/// Address descriptor B reloads into descriptor A at every frame boundary
///
/// The DMA reads this cell directly, so it has to live at a fixed address
/// (in practice a `static`) for as long as scanout runs.
#[derive(Debug, Default)]
pub struct FrameSource {
    address: AtomicU32,
}

impl FrameSource {
    pub const fn new() -> Self {
        Self {
            address: AtomicU32::new(0),
        }
    }

    /// Point scanout at a framebuffer; takes effect at the next frame boundary
    pub fn point_at(&self, framebuffer: &Framebuffer) {
        self.address
            .store(framebuffer.start_address(), Ordering::Release);
    }

    /// Framebuffer address currently published to the DMA
    pub fn address(&self) -> u32 {
        self.address.load(Ordering::Acquire)
    }

    /// Bus address of the cell itself (descriptor B's read address)
    pub fn cell_address(&self) -> u32 {
        self.address.as_ptr() as usize as u32
    }
}

/// Which half of the chain is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanoutPhase {
    /// Not started yet
    Idle,
    /// Descriptor A is moving pixels (or stalled on the FIFO)
    Streaming,
    /// Descriptor B is rewriting A's read address
    Reconfiguring,
}

/// Hardware events that move the chain along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanoutEvent {
    /// Descriptor A triggered for the first time
    Start,
    /// Descriptor A finished its frame and chained to B
    StreamComplete,
    /// Descriptor B finished and chained back to A
    RearmComplete,
}

impl ScanoutPhase {
    /// Next phase after a hardware event
    ///
    /// Events that do not apply to the current phase leave it unchanged;
    /// there is no transition back to `Idle`.
    pub fn transition(self, event: ScanoutEvent) -> Self {
        use ScanoutEvent::*;
        use ScanoutPhase::*;

        match (self, event) {
            (Idle, Start) => Streaming,
            (Streaming, StreamComplete) => Reconfiguring,
            (Reconfiguring, RearmComplete) => Streaming,
            (phase, _) => phase,
        }
    }

    /// Decode the two channels' busy flags
    pub fn from_busy(stream_busy: bool, rearm_busy: bool) -> Self {
        match (stream_busy, rearm_busy) {
            (true, _) => ScanoutPhase::Streaming,
            (false, true) => ScanoutPhase::Reconfiguring,
            (false, false) => ScanoutPhase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self, ScanoutPhase::Idle)
    }
}

/// Hardware addresses the chain is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanoutWiring {
    /// DMA channel streaming pixels (descriptor A)
    pub stream_channel: u8,
    /// DMA channel rewriting the stream channel (descriptor B)
    pub rearm_channel: u8,
    /// Address of descriptor A's READ_ADDR register
    pub stream_read_addr_reg: u32,
    /// Address of the colour generator's TX FIFO
    pub fifo_addr: u32,
    /// Data request line of that FIFO
    pub fifo_dreq: u8,
}

/// The two descriptors of the scanout chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanoutPlan {
    pub stream: TransferDescriptor,
    pub rearm: TransferDescriptor,
}

impl ScanoutPlan {
    /// Build the chain for a `frame_len` byte framebuffer published in `source`
    pub fn new(wiring: &ScanoutWiring, source: &FrameSource, frame_len: u32) -> Self {
        let stream = TransferDescriptor {
            channel: wiring.stream_channel,
            read_addr: source.address(),
            write_addr: wiring.fifo_addr,
            count: frame_len,
            size: TransferSize::Byte,
            incr_read: true,
            incr_write: false,
            pacing: Pacing::Dreq(wiring.fifo_dreq),
            chain_to: wiring.rearm_channel,
        };

        let rearm = TransferDescriptor {
            channel: wiring.rearm_channel,
            read_addr: source.cell_address(),
            write_addr: wiring.stream_read_addr_reg,
            count: 1,
            size: TransferSize::Word,
            incr_read: false,
            incr_write: false,
            pacing: Pacing::Unpaced,
            chain_to: wiring.stream_channel,
        };

        Self { stream, rearm }
    }

    /// Whether the two descriptors form a closed loop
    pub fn is_perpetual(&self) -> bool {
        self.stream.chain_to == self.rearm.channel
            && self.rearm.chain_to == self.stream.channel
            && self.stream.channel != self.rearm.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FRAMEBUFFER_LEN;

    const WIRING: ScanoutWiring = ScanoutWiring {
        stream_channel: 0,
        rearm_channel: 1,
        stream_read_addr_reg: 0x5000_0000,
        fifo_addr: 0x5020_0018,
        fifo_dreq: 2,
    };

    #[test]
    fn test_stream_descriptor() {
        let fb = Framebuffer::new();
        let source = FrameSource::new();
        source.point_at(&fb);

        let plan = ScanoutPlan::new(&WIRING, &source, FRAMEBUFFER_LEN as u32);

        assert_eq!(plan.stream.read_addr, fb.start_address());
        assert_eq!(plan.stream.write_addr, WIRING.fifo_addr);
        assert_eq!(plan.stream.count, 76_800);
        assert_eq!(plan.stream.size, TransferSize::Byte);
        assert!(plan.stream.incr_read);
        assert!(!plan.stream.incr_write);
        assert_eq!(plan.stream.pacing, Pacing::Dreq(2));
        assert_eq!(plan.stream.chain_to, 1);
    }

    #[test]
    fn test_rearm_descriptor() {
        let source = FrameSource::new();
        let plan = ScanoutPlan::new(&WIRING, &source, 16);

        assert_eq!(plan.rearm.read_addr, source.cell_address());
        assert_eq!(plan.rearm.write_addr, WIRING.stream_read_addr_reg);
        assert_eq!(plan.rearm.count, 1);
        assert_eq!(plan.rearm.size, TransferSize::Word);
        assert!(!plan.rearm.incr_read);
        assert!(!plan.rearm.incr_write);
        assert_eq!(plan.rearm.pacing, Pacing::Unpaced);
        assert_eq!(plan.rearm.chain_to, 0);
    }

    #[test]
    fn test_plan_is_perpetual() {
        let plan = ScanoutPlan::new(&WIRING, &FrameSource::new(), 16);
        assert!(plan.is_perpetual());

        let same_channel = ScanoutWiring {
            rearm_channel: 0,
            ..WIRING
        };
        assert!(!ScanoutPlan::new(&same_channel, &FrameSource::new(), 16).is_perpetual());
    }

    #[test]
    fn test_chain_restreams_the_same_frame() {
        // Walk the chain by hand over a tiny "framebuffer" at a fake address
        const BASE: u32 = 0x2000_0000;
        let pixels: [u8; 6] = [1, 2, 3, 4, 5, 6];

        let source = FrameSource::new();
        source.address.store(BASE, Ordering::Relaxed);
        let plan = ScanoutPlan::new(&WIRING, &source, pixels.len() as u32);

        let mut read_addr = plan.stream.read_addr;
        let mut phase = ScanoutPhase::Idle.transition(ScanoutEvent::Start);
        let mut fifo = [0u8; 18];
        let mut pushed = 0;

        for _frame in 0..3 {
            assert_eq!(phase, ScanoutPhase::Streaming);
            for _ in 0..plan.stream.count {
                fifo[pushed] = pixels[(read_addr - BASE) as usize];
                pushed += 1;
                if plan.stream.incr_read {
                    read_addr += plan.stream.size.bytes();
                }
            }
            phase = phase.transition(ScanoutEvent::StreamComplete);
            assert_eq!(phase, ScanoutPhase::Reconfiguring);

            // B copies the published address into A's read pointer
            assert_eq!(plan.rearm.read_addr, source.cell_address());
            assert_eq!(plan.rearm.write_addr, WIRING.stream_read_addr_reg);
            read_addr = source.address();

            phase = phase.transition(ScanoutEvent::RearmComplete);
        }

        assert_eq!(fifo, [1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_phase_transitions() {
        use ScanoutEvent::*;
        use ScanoutPhase::*;

        assert_eq!(Idle.transition(Start), Streaming);
        assert_eq!(Streaming.transition(StreamComplete), Reconfiguring);
        assert_eq!(Reconfiguring.transition(RearmComplete), Streaming);

        // Out-of-order events are ignored
        assert_eq!(Idle.transition(StreamComplete), Idle);
        assert_eq!(Streaming.transition(RearmComplete), Streaming);
        assert_eq!(Reconfiguring.transition(StreamComplete), Reconfiguring);
        assert_eq!(Streaming.transition(Start), Streaming);
    }

    #[test]
    fn test_never_returns_to_idle() {
        let events = [
            ScanoutEvent::Start,
            ScanoutEvent::StreamComplete,
            ScanoutEvent::RearmComplete,
        ];
        let mut phase = ScanoutPhase::Streaming;
        for _ in 0..100 {
            for event in events {
                phase = phase.transition(event);
                assert!(phase.is_running());
            }
        }
    }

    #[test]
    fn test_from_busy() {
        assert_eq!(ScanoutPhase::from_busy(true, false), ScanoutPhase::Streaming);
        assert_eq!(ScanoutPhase::from_busy(false, true), ScanoutPhase::Reconfiguring);
        assert_eq!(ScanoutPhase::from_busy(false, false), ScanoutPhase::Idle);
    }

    #[test]
    fn test_point_at_publishes_address() {
        let fb = Framebuffer::new();
        let source = FrameSource::new();
        assert_eq!(source.address(), 0);

        source.point_at(&fb);
        assert_eq!(source.address(), fb.start_address());
    }
}
