//! Memory transfers
//!
//! [`MemoryTransfer`] is the blocking fill/copy interface used to rewrite the
//! framebuffer. On the RP2040 it is backed by a dedicated DMA channel; on the
//! host (and anywhere DMA is not wanted) [`CpuTransfer`] does the same work
//! with the CPU.
//!
//! [`TransferDescriptor`] describes one DMA channel programming in
//! hardware-neutral terms so the scanout chain can be planned and checked
//! without touching registers.

/// Blocking bulk memory operations
///
/// Both calls return only once every byte has been written. Only one
/// transfer can be outstanding because both take `&mut self`.
pub trait MemoryTransfer {
    /// Write `value` to every byte of `dest`
    ///
    /// The source is held fixed and only the destination advances.
    fn fill(&mut self, dest: &mut [u8], value: u8);

    /// Copy `src` into `dest`; both advance
    ///
    /// # Panics
    ///
    /// Panics if the two regions have different lengths.
    fn copy(&mut self, dest: &mut [u8], src: &[u8]);
}

impl<T: MemoryTransfer + ?Sized> MemoryTransfer for &mut T {
    fn fill(&mut self, dest: &mut [u8], value: u8) {
        (**self).fill(dest, value)
    }

    fn copy(&mut self, dest: &mut [u8], src: &[u8]) {
        (**self).copy(dest, src)
    }
}

/// CPU implementation of [`MemoryTransfer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuTransfer;

impl MemoryTransfer for CpuTransfer {
    fn fill(&mut self, dest: &mut [u8], value: u8) {
        dest.fill(value);
    }

    fn copy(&mut self, dest: &mut [u8], src: &[u8]) {
        dest.copy_from_slice(src);
    }
}

/// Width of each element moved by a DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferSize {
    Byte,
    HalfWord,
    Word,
}

impl TransferSize {
    pub const fn bytes(self) -> u32 {
        match self {
            TransferSize::Byte => 1,
            TransferSize::HalfWord => 2,
            TransferSize::Word => 4,
        }
    }
}

/// What paces a DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    /// Run as fast as the bus allows
    Unpaced,
    /// Wait on a peripheral data request line
    Dreq(u8),
}

/// One DMA channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferDescriptor {
    /// Channel this descriptor is programmed into
    pub channel: u8,
    pub read_addr: u32,
    pub write_addr: u32,
    /// Number of elements, not bytes
    pub count: u32,
    pub size: TransferSize,
    pub incr_read: bool,
    pub incr_write: bool,
    pub pacing: Pacing,
    /// Channel triggered on completion; equal to `channel` for no chaining
    pub chain_to: u8,
}

impl TransferDescriptor {
    /// Whether completion triggers another channel
    pub const fn chains(&self) -> bool {
        self.chain_to != self.channel
    }

    /// Bytes moved by one run of this descriptor
    pub const fn byte_len(&self) -> u32 {
        self.count * self.size.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_fill() {
        let mut buf = [0u8; 16];
        CpuTransfer.fill(&mut buf, 0xA5);
        assert!(buf.iter().all(|&b| b == 0xA5));
    }

    #[test]
    fn test_cpu_copy() {
        let src: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut dest = [0u8; 8];
        CpuTransfer.copy(&mut dest, &src);
        assert_eq!(dest, src);
    }

    #[test]
    fn test_empty_regions_are_noops() {
        let mut empty: [u8; 0] = [];
        CpuTransfer.fill(&mut empty, 7);
        CpuTransfer.copy(&mut empty, &[]);
    }

    #[test]
    fn test_partial_region() {
        let mut buf = [0u8; 8];
        CpuTransfer.fill(&mut buf[2..5], 9);
        assert_eq!(buf, [0, 0, 9, 9, 9, 0, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_copy_length_mismatch_panics() {
        let mut dest = [0u8; 4];
        CpuTransfer.copy(&mut dest, &[1, 2, 3]);
    }

    #[test]
    fn test_through_mut_reference() {
        fn clear<M: MemoryTransfer>(mut mem: M, buf: &mut [u8]) {
            mem.fill(buf, 3);
        }

        let mut cpu = CpuTransfer;
        let mut buf = [0u8; 4];
        clear(&mut cpu, &mut buf);
        assert_eq!(buf, [3; 4]);
    }

    #[test]
    fn test_descriptor_byte_len() {
        let d = TransferDescriptor {
            channel: 1,
            read_addr: 0,
            write_addr: 0,
            count: 3,
            size: TransferSize::Word,
            incr_read: false,
            incr_write: false,
            pacing: Pacing::Unpaced,
            chain_to: 1,
        };
        assert_eq!(d.byte_len(), 12);
        assert!(!d.chains());
    }
}
