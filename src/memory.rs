/*!
Memory primitives shared by every device on the CPU bus.

- `MemoryBlock`: an owned, fixed-length, bounds-checked byte buffer. Internal
  RAM, PRG-ROM, PRG-RAM and CHR data are all stored in blocks.
- `Memory`: the capability set every CPU-visible device offers (8/16-bit fetch
  and store plus a read-only view of its backing bytes). Implemented by `Ram`,
  `PpuRegisters`, `Cartridge` and `Bus`; the bus picks the implementor with a
  `match` on the address class, so there is no dynamic dispatch.
  `MemoryBlock` implements it too, with the address taken as a block offset.

Block offsets are `usize` because cartridge segments can exceed 64 KiB; the
`Memory` trait speaks CPU addresses (`u16`).
*/

use crate::error::MemoryError;

/// Fixed-size byte array with checked 8-bit and little-endian 16-bit access.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for MemoryBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl MemoryBlock {
    /// Zero-filled block of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; len],
        }
    }

    /// Wrap existing bytes (e.g. a slice cut out of a ROM image).
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    fn check(&self, offset: usize) -> Result<(), MemoryError> {
        if offset < self.bytes.len() {
            Ok(())
        } else {
            Err(MemoryError::AddressOutOfRange {
                addr: offset,
                len: self.bytes.len(),
            })
        }
    }

    pub fn fetch_u8(&self, offset: usize) -> Result<u8, MemoryError> {
        self.check(offset)?;
        Ok(self.bytes[offset])
    }

    /// Little-endian word at `offset`; both `offset` and `offset + 1` must be in range.
    pub fn fetch_u16(&self, offset: usize) -> Result<u16, MemoryError> {
        self.check(offset)?;
        self.check(offset + 1)?;
        Ok(u16::from_le_bytes([
            self.bytes[offset],
            self.bytes[offset + 1],
        ]))
    }

    pub fn store_u8(&mut self, offset: usize, value: u8) -> Result<(), MemoryError> {
        self.check(offset)?;
        self.bytes[offset] = value;
        Ok(())
    }

    /// Store a little-endian word. Nothing is written if the high byte would fall outside.
    pub fn store_u16(&mut self, offset: usize, value: u16) -> Result<(), MemoryError> {
        self.check(offset)?;
        self.check(offset + 1)?;
        let [lo, hi] = value.to_le_bytes();
        self.bytes[offset] = lo;
        self.bytes[offset + 1] = hi;
        Ok(())
    }

    /// Clear every byte to 0.
    pub fn fill_zero(&mut self) {
        self.bytes.fill(0);
    }

    /// Read-only view of the backing bytes (hex views, hashing).
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.bytes
    }
}

/// CPU-visible device capability set.
///
/// The 16-bit helpers default to two byte accesses at `addr` and `addr + 1`
/// (wrapping at $FFFF), which is how the 6502 itself assembles words.
pub trait Memory {
    fn fetch_u8(&self, addr: u16) -> Result<u8, MemoryError>;

    fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError>;

    /// Backing bytes of this device, for inspection only.
    fn data(&self) -> &[u8];

    fn fetch_u16(&self, addr: u16) -> Result<u16, MemoryError> {
        let lo = self.fetch_u8(addr)?;
        let hi = self.fetch_u8(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn store_u16(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        let [lo, hi] = value.to_le_bytes();
        self.store_u8(addr, lo)?;
        self.store_u8(addr.wrapping_add(1), hi)
    }
}

// Blocks keep their strict word bounds: no wrap past the end.
impl Memory for MemoryBlock {
    fn fetch_u8(&self, addr: u16) -> Result<u8, MemoryError> {
        MemoryBlock::fetch_u8(self, addr as usize)
    }

    fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        MemoryBlock::store_u8(self, addr as usize, value)
    }

    fn data(&self) -> &[u8] {
        &self.bytes
    }

    fn fetch_u16(&self, addr: u16) -> Result<u16, MemoryError> {
        MemoryBlock::fetch_u16(self, addr as usize)
    }

    fn store_u16(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        MemoryBlock::store_u16(self, addr as usize, value)
    }
}
