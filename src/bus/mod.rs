#![doc = r#"
Bus module: CPU address-space router.

Address map (CPU):
- $0000-$07FF: 2 KiB internal RAM
- $0800-$1FFF: Mirrors of $0000-$07FF
- $2000-$3FFF: PPU registers (not implemented; reads 0, writes dropped)
- $4000-$FFFF: Cartridge window (NROM: PRG-RAM at $6000, PRG-ROM at $8000)

`addr_to_mem_type` is the single place that knows these boundaries. Every
fetch/store classifies the address once and delegates to the owning device.

Ownership
- The Bus owns the internal RAM and exactly one `Cartridge`.
- Collaborators that only need to look (hex views, a graphics path) borrow the
  cartridge through `Bus::cartridge`; all writes go through `Memory::store_u8`.

Modules
- ram: the mirrored 2 KiB internal RAM.
- ppu_registers: the PPU register window stub.
"#]

pub mod ppu_registers;
pub mod ram;


use log::trace;

use crate::cartridge::Cartridge;
use crate::error::MemoryError;
use crate::memory::Memory;

pub use ppu_registers::PpuRegisters;
pub use ram::{CPU_RAM_SIZE, Ram};

/// Device class an address belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemType {
    Internal,
    Ppu,
    Cartridge,
}

/// Classify a CPU address. The three ranges cover all of $0000-$FFFF.
#[inline]
pub const fn addr_to_mem_type(addr: u16) -> MemType {
    match addr {
        0x0000..=0x1FFF => MemType::Internal,
        0x2000..=0x3FFF => MemType::Ppu,
        0x4000..=0xFFFF => MemType::Cartridge,
    }
}

pub struct Bus {
    ram: Ram,
    ppu: PpuRegisters,
    cartridge: Cartridge,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("cartridge", &self.cartridge)
            .finish_non_exhaustive()
    }
}

impl Bus {
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            ram: Ram::new(),
            ppu: PpuRegisters::new(),
            cartridge,
        }
    }

    /// Clear internal RAM. Cartridge contents (PRG-RAM included) survive a reset.
    pub fn reset(&mut self) {
        self.ram.reset();
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }
}

impl Memory for Bus {
    fn fetch_u8(&self, addr: u16) -> Result<u8, MemoryError> {
        let v = match addr_to_mem_type(addr) {
            MemType::Internal => self.ram.fetch_u8(addr)?,
            MemType::Ppu => self.ppu.fetch_u8(addr)?,
            MemType::Cartridge => self.cartridge.fetch_u8(addr)?,
        };
        trace!("bus: fetch {addr:#06X} -> {v:#04X}");
        Ok(v)
    }

    fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        trace!("bus: store {value:#04X} at {addr:#06X}");
        match addr_to_mem_type(addr) {
            MemType::Internal => self.ram.store_u8(addr, value),
            MemType::Ppu => self.ppu.store_u8(addr, value),
            MemType::Cartridge => self.cartridge.store_u8(addr, value),
        }
    }

    /// Internal RAM bytes.
    fn data(&self) -> &[u8] {
        self.ram.data()
    }
}
