/*!
NROM (mapper 0) board: maps cartridge memory blocks into the CPU window.

CPU-side layout:
- $4000-$5FFF: not decoded by the board (reads 0, writes ignored)
- $6000-$7FFF: PRG-RAM if the board carries it, mirrored across the window
- $8000-$FFFF: PRG-ROM. 16 KiB (NROM-128) is mirrored at $C000; 32 KiB (NROM-256) is direct

PPU-side layout:
- $0000-$1FFF: CHR-ROM, or CHR-RAM when the image ships no CHR data

The board has no registers, so there is nothing to bank-switch or reset.
*/

use log::trace;

use crate::error::MemoryError;
use crate::memory::MemoryBlock;

/// Start of the PRG-RAM window.
pub const PRG_RAM_BASE: u16 = 0x6000;
/// Start of the PRG-ROM window.
pub const PRG_ROM_BASE: u16 = 0x8000;

#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: MemoryBlock,
    prg_ram: Option<MemoryBlock>,
    chr: MemoryBlock,
    chr_is_ram: bool,
}

impl Nrom {
    /// - `prg_rom`: PRG-ROM bytes (16 KiB or 32 KiB typical, never empty)
    /// - `prg_ram`: PRG-RAM block, if the board has one
    /// - `chr`: CHR-ROM bytes, or a zeroed CHR-RAM buffer when `chr_is_ram`
    pub fn new(
        prg_rom: MemoryBlock,
        prg_ram: Option<MemoryBlock>,
        chr: MemoryBlock,
        chr_is_ram: bool,
    ) -> Self {
        Self {
            prg_rom,
            prg_ram,
            chr,
            chr_is_ram,
        }
    }

    #[inline]
    fn prg_rom_offset(&self, addr: u16) -> usize {
        let rel = (addr - PRG_ROM_BASE) as usize;
        let len = self.prg_rom.len();
        if len.is_power_of_two() {
            rel & (len - 1)
        } else {
            rel % len.max(1)
        }
    }

    /// CPU read in the cartridge window ($4000-$FFFF).
    pub fn cpu_read(&self, addr: u16) -> Result<u8, MemoryError> {
        match addr {
            0x6000..=0x7FFF => match &self.prg_ram {
                Some(ram) => ram.fetch_u8((addr - PRG_RAM_BASE) as usize % ram.len()),
                None => {
                    trace!("nrom: read {addr:#06X} without PRG-RAM");
                    Ok(0)
                }
            },
            0x8000..=0xFFFF => self.prg_rom.fetch_u8(self.prg_rom_offset(addr)),
            _ => {
                trace!("nrom: read {addr:#06X} outside decoded window");
                Ok(0)
            }
        }
    }

    /// CPU write in the cartridge window. Only PRG-RAM is writable.
    pub fn cpu_write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        match addr {
            0x6000..=0x7FFF => match &mut self.prg_ram {
                Some(ram) => {
                    let offset = (addr - PRG_RAM_BASE) as usize % ram.len();
                    ram.store_u8(offset, value)
                }
                None => {
                    trace!("nrom: {value:#04X} to {addr:#06X} ignored (no PRG-RAM)");
                    Ok(())
                }
            },
            _ => {
                trace!("nrom: write {value:#04X} to {addr:#06X} ignored");
                Ok(())
            }
        }
    }

    /// PPU pattern-table read ($0000-$1FFF).
    pub fn ppu_read(&self, addr: u16) -> Result<u8, MemoryError> {
        if self.chr.is_empty() {
            return Ok(0);
        }
        self.chr.fetch_u8((addr as usize & 0x1FFF) % self.chr.len())
    }

    /// PPU pattern-table write; only lands when the board has CHR-RAM.
    pub fn ppu_write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        if !self.chr_is_ram || self.chr.is_empty() {
            return Ok(());
        }
        let offset = (addr as usize & 0x1FFF) % self.chr.len();
        self.chr.store_u8(offset, value)
    }

    pub fn is_nrom_128(&self) -> bool {
        self.prg_rom.len() == 16 * 1024
    }

    pub fn has_prg_ram(&self) -> bool {
        self.prg_ram.is_some()
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    pub fn prg_rom(&self) -> &MemoryBlock {
        &self.prg_rom
    }

    pub fn prg_ram(&self) -> Option<&MemoryBlock> {
        self.prg_ram.as_ref()
    }

    pub fn chr(&self) -> &MemoryBlock {
        &self.chr
    }
}
