#![doc = r#"
PPU register window stub

Purpose
- Answer CPU accesses to 0x2000-0x3FFF while no PPU is attached.
- Reads return 0 and writes are dropped; every access is logged so a trace
  shows what the program expected from the graphics chip.

Notes
- Mirroring: addresses 0x2008..=0x3FFF mirror the eight registers 0x2000..=0x2007.
- The stub never fails, so programs that poll PPUSTATUS keep running.
"#]

use log::debug;

use crate::error::MemoryError;
use crate::memory::Memory;

const REGISTER_NAMES: [&str; 8] = [
    "PPUCTRL", "PPUMASK", "PPUSTATUS", "OAMADDR", "OAMDATA", "PPUSCROLL", "PPUADDR", "PPUDATA",
];

/// Placeholder for the CPU-visible PPU registers.
#[derive(Clone, Copy, Debug, Default)]
pub struct PpuRegisters;

impl PpuRegisters {
    pub fn new() -> Self {
        Self
    }

    /// Register name for a CPU address in the PPU window.
    pub fn register_name(addr: u16) -> &'static str {
        REGISTER_NAMES[(mirror_ppu_reg(addr) & 0x0007) as usize]
    }
}

impl Memory for PpuRegisters {
    fn fetch_u8(&self, addr: u16) -> Result<u8, MemoryError> {
        debug!(
            "ppu not implemented: read {} ({addr:#06X}) -> 0",
            Self::register_name(addr)
        );
        Ok(0)
    }

    fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        debug!(
            "ppu not implemented: write {value:#04X} to {} ({addr:#06X}) dropped",
            Self::register_name(addr)
        );
        Ok(())
    }

    fn data(&self) -> &[u8] {
        &[]
    }
}

#[inline]
pub fn mirror_ppu_reg(addr: u16) -> u16 {
    0x2000 | (addr & 0x0007)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_mirroring() {
        assert_eq!(mirror_ppu_reg(0x2002), 0x2002);
        assert_eq!(mirror_ppu_reg(0x3FFA), 0x2002);
        assert_eq!(PpuRegisters::register_name(0x200A), "PPUSTATUS");
        assert_eq!(PpuRegisters::register_name(0x3FFF), "PPUDATA");
    }

    #[test]
    fn accesses_are_harmless() {
        let mut ppu = PpuRegisters::new();
        ppu.store_u8(0x2000, 0x80).unwrap();
        assert_eq!(ppu.fetch_u8(0x2000), Ok(0));
        assert_eq!(ppu.fetch_u16(0x2006), Ok(0));
        assert!(ppu.data().is_empty());
    }
}
