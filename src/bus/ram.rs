/*!
RAM module: the 2 KiB CPU RAM with mirrored access.

CPU address map for internal RAM:
- $0000-$07FF: 2 KiB internal RAM
- $0800-$1FFF: Mirrors of $0000-$07FF (mask with & 0x07FF)

Owned by the Bus and reached through its address dispatcher. The stack lives in
page 1 ($0100-$01FF) of this block.
*/

use crate::error::MemoryError;
use crate::memory::{Memory, MemoryBlock};

/// Size of CPU internal RAM (in bytes).
pub const CPU_RAM_SIZE: usize = 0x0800;

/// CPU internal RAM backed by a `MemoryBlock`.
///
/// Addresses in the range $0000-$1FFF are mirrored every 2 KiB; callers pass
/// CPU addresses and this type masks them down to the physical range.
#[derive(Clone, Debug)]
pub struct Ram {
    block: MemoryBlock,
}

impl Default for Ram {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    /// Create a new RAM instance initialized to 0.
    #[inline]
    pub fn new() -> Self {
        Self {
            block: MemoryBlock::new(CPU_RAM_SIZE),
        }
    }

    /// Clear RAM contents to 0.
    #[inline]
    pub fn reset(&mut self) {
        self.block.fill_zero();
    }

    /// Physical RAM index for a CPU address (2 KiB mirroring).
    #[inline]
    pub fn mirror_index(addr: u16) -> usize {
        (addr as usize) % CPU_RAM_SIZE
    }
}

impl Memory for Ram {
    #[inline]
    fn fetch_u8(&self, addr: u16) -> Result<u8, MemoryError> {
        self.block.fetch_u8(Self::mirror_index(addr))
    }

    #[inline]
    fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        self.block.store_u8(Self::mirror_index(addr), value)
    }

    fn data(&self) -> &[u8] {
        self.block.data()
    }
}
