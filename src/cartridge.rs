/*!
Cartridge with iNES loader and NROM (mapper 0) board.

Features:
- Parse an iNES header from bytes or a file path
- Skip the optional 512-byte trainer (kept for inspection) before slicing PRG data
- Slice PRG-ROM (`prg_units * 16 KiB`) and CHR (`chr_units * 8 KiB`) into memory blocks;
  zero CHR units means the board carries 8 KiB of CHR-RAM instead
- Determine mirroring, four-screen override, battery-backed RAM and mapper id
- Expose the PRG window to the CPU bus through the `Memory` trait

Notes:
- Any mapper other than 0 is rejected; nothing is constructed in that case.
- NES 2.0 headers take mapper bits 8-11 and the submapper from byte 8 and the
  PRG-RAM/NVRAM sizes (`64 << shift`) from byte 10; iNES 1 reads byte 8 as
  8 KiB PRG-RAM units.
- PRG-RAM is allocated only when the header declares it or the battery bit is set
  (8 KiB when the battery bit alone asks for it). Without it $6000-$7FFF reads 0.
*/

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{CartridgeError, MemoryError};
use crate::mapper::Nrom;
use crate::memory::{Memory, MemoryBlock};

pub const INES_MAGIC: &[u8; 4] = b"NES\x1A";
pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_UNIT: usize = 16 * 1024;
pub const CHR_UNIT: usize = 8 * 1024;
pub const PRG_RAM_UNIT: usize = 8 * 1024;

const FLAG_VERTICAL: u8 = 0b0000_0001;
const FLAG_BATTERY: u8 = 0b0000_0010;
const FLAG_TRAINER: u8 = 0b0000_0100;
const FLAG_FOUR_SCREEN: u8 = 0b0000_1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InesVersion {
    Ines1,
    Ines2,
}

/// Decoded 16-byte iNES header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InesHeader {
    pub prg_units: u8,
    pub chr_units: u8,
    pub flags6: u8,
    pub flags7: u8,
    /// iNES 1: PRG-RAM units. NES 2.0: submapper (high nibble), mapper bits 8-11 (low).
    pub byte8: u8,
    /// NES 2.0 only: PRG-NVRAM shift (high nibble), PRG-RAM shift (low).
    pub byte10: u8,
    pub version: InesVersion,
}

impl InesHeader {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::MalformedHeader(
                "image shorter than 16-byte header",
            ));
        }
        if &data[0..4] != INES_MAGIC {
            return Err(CartridgeError::MalformedHeader(
                "bad magic (expected NES<1A>)",
            ));
        }
        let flags7 = data[7];
        let version = if (flags7 & 0x0C) == 0x08 {
            InesVersion::Ines2
        } else {
            InesVersion::Ines1
        };
        Ok(Self {
            prg_units: data[4],
            chr_units: data[5],
            flags6: data[6],
            flags7,
            byte8: data[8],
            byte10: data[10],
            version,
        })
    }

    /// Mapper id: bits 0-3 from flags 6, bits 4-7 from flags 7, and on NES 2.0
    /// bits 8-11 from byte 8.
    pub fn mapper_id(&self) -> u16 {
        let id = u16::from((self.flags7 & 0xF0) | (self.flags6 >> 4));
        match self.version {
            InesVersion::Ines1 => id,
            InesVersion::Ines2 => id | (u16::from(self.byte8 & 0x0F) << 8),
        }
    }

    pub fn submapper(&self) -> u8 {
        match self.version {
            InesVersion::Ines1 => 0,
            InesVersion::Ines2 => self.byte8 >> 4,
        }
    }

    /// PRG-RAM bytes the header declares (volatile plus battery-backed on NES 2.0).
    pub fn prg_ram_len(&self) -> usize {
        match self.version {
            InesVersion::Ines1 => self.byte8 as usize * PRG_RAM_UNIT,
            InesVersion::Ines2 => shift_len(self.byte10 & 0x0F) + shift_len(self.byte10 >> 4),
        }
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.flags6 & FLAG_FOUR_SCREEN != 0 {
            Mirroring::FourScreen
        } else if self.flags6 & FLAG_VERTICAL != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    pub fn battery(&self) -> bool {
        self.flags6 & FLAG_BATTERY != 0
    }

    pub fn has_trainer(&self) -> bool {
        self.flags6 & FLAG_TRAINER != 0
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_units as usize * PRG_UNIT
    }

    /// CHR bytes stored in the file (0 when the board uses CHR-RAM).
    pub fn chr_rom_len(&self) -> usize {
        self.chr_units as usize * CHR_UNIT
    }

    /// Total image size the header promises.
    pub fn image_len(&self) -> usize {
        let trainer = if self.has_trainer() { TRAINER_LEN } else { 0 };
        HEADER_LEN + trainer + self.prg_rom_len() + self.chr_rom_len()
    }
}

/// NES 2.0 size field: 0 means none, otherwise `64 << shift` bytes.
fn shift_len(shift: u8) -> usize {
    if shift == 0 { 0 } else { 64 << shift }
}

pub struct Cartridge {
    board: Nrom,
    header: InesHeader,
    trainer: Option<Vec<u8>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("path", &self.path)
            .field("mapper_id", &self.mapper_id())
            .field("mirroring", &self.mirroring())
            .field("battery", &self.battery_backed())
            .field("trainer", &self.has_trainer())
            .field("version", &self.header.version)
            .field("prg_rom_len", &self.prg_rom_len())
            .field("chr_len", &self.chr_len())
            .field("prg_ram_len", &self.prg_ram_len())
            .finish()
    }
}

impl Cartridge {
    // -------------- Construction --------------

    /// Build a cartridge from raw iNES bytes.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = InesHeader::parse(data)?;

        let mapper_id = header.mapper_id();
        if mapper_id != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper_id));
        }
        if header.prg_units == 0 {
            return Err(CartridgeError::MalformedHeader("zero PRG-ROM units"));
        }

        let expected = header.image_len();
        if data.len() < expected {
            return Err(CartridgeError::TruncatedImage {
                expected,
                actual: data.len(),
            });
        }

        let mut offset = HEADER_LEN;
        let trainer = if header.has_trainer() {
            let t = data[offset..offset + TRAINER_LEN].to_vec();
            offset += TRAINER_LEN;
            Some(t)
        } else {
            None
        };

        let prg_len = header.prg_rom_len();
        let prg_rom = MemoryBlock::from_vec(data[offset..offset + prg_len].to_vec());
        offset += prg_len;

        let chr_is_ram = header.chr_units == 0;
        let chr = if chr_is_ram {
            MemoryBlock::new(CHR_UNIT)
        } else {
            MemoryBlock::from_vec(data[offset..offset + header.chr_rom_len()].to_vec())
        };

        let prg_ram = match header.prg_ram_len() {
            0 if header.battery() => Some(MemoryBlock::new(PRG_RAM_UNIT)),
            0 => None,
            len => Some(MemoryBlock::new(len)),
        };

        debug!(
            "ines: prg={}x16K chr={}x8K flags6={:#04X} flags7={:#04X} trainer={}",
            header.prg_units,
            header.chr_units,
            header.flags6,
            header.flags7,
            trainer.is_some()
        );

        Ok(Self {
            board: Nrom::new(prg_rom, prg_ram, chr, chr_is_ram),
            header,
            trainer,
            path: None,
        })
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut cart = Self::from_ines_bytes(&bytes)?;
        cart.path = Some(path.to_path_buf());
        info!(
            "loaded {} ({} bytes): {:?}",
            path.display(),
            bytes.len(),
            cart
        );
        Ok(cart)
    }

    // -------------- PPU-side access --------------

    /// Pattern-table read for a graphics collaborator.
    pub fn ppu_read(&self, addr: u16) -> Result<u8, MemoryError> {
        self.board.ppu_read(addr)
    }

    /// Pattern-table write; only effective on CHR-RAM boards.
    pub fn ppu_write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        self.board.ppu_write(addr, value)
    }

    // -------------- Accessors --------------

    pub fn header(&self) -> &InesHeader {
        &self.header
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mapper_id(&self) -> u16 {
        self.header.mapper_id()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.header.mirroring()
    }

    /// Four-screen bit: the board ignores the header mirroring bit.
    pub fn ignore_mirroring(&self) -> bool {
        self.header.mirroring() == Mirroring::FourScreen
    }

    pub fn battery_backed(&self) -> bool {
        self.header.battery()
    }

    pub fn has_trainer(&self) -> bool {
        self.trainer.is_some()
    }

    pub fn trainer(&self) -> Option<&[u8]> {
        self.trainer.as_deref()
    }

    pub fn has_prg_ram(&self) -> bool {
        self.board.has_prg_ram()
    }

    pub fn prg_rom_len(&self) -> usize {
        self.board.prg_rom().len()
    }

    pub fn prg_ram_len(&self) -> usize {
        self.board.prg_ram().map_or(0, MemoryBlock::len)
    }

    pub fn chr_len(&self) -> usize {
        self.board.chr().len()
    }

    pub fn chr_is_ram(&self) -> bool {
        self.board.chr_is_ram()
    }

    /// Raw CHR bytes (ROM or RAM).
    pub fn chr_data(&self) -> &[u8] {
        self.board.chr().data()
    }
}

impl Memory for Cartridge {
    fn fetch_u8(&self, addr: u16) -> Result<u8, MemoryError> {
        self.board.cpu_read(addr)
    }

    fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        self.board.cpu_write(addr, value)
    }

    /// PRG-ROM bytes.
    fn data(&self) -> &[u8] {
        self.board.prg_rom().data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_ines;

    #[test]
    fn parse_simple_nrom_32k_chr8k() {
        let data = build_ines(2, 1, 0b0000_0001, 0, 1, None);
        let cart = Cartridge::from_ines_bytes(&data).expect("parse");

        assert_eq!(cart.mapper_id(), 0);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert!(cart.has_prg_ram());
        assert_eq!(cart.prg_rom_len(), 32 * 1024);
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(!cart.chr_is_ram());

        assert_eq!(cart.fetch_u8(0x8000), Ok(0xAA));
        assert_eq!(cart.fetch_u8(0xFFFF), Ok(0xAA));
        assert_eq!(cart.ppu_read(0x0000), Ok(0xCC));
    }

    #[test]
    fn parse_nrom_16k_chr_ram() {
        let data = build_ines(1, 0, 0, 0, 0, None);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");

        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
        assert!(!cart.has_prg_ram());
        assert_eq!(cart.prg_rom_len(), 16 * 1024);
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(cart.chr_is_ram());

        assert_eq!(cart.fetch_u8(0x8000), cart.fetch_u8(0xC000));

        cart.ppu_write(0x0010, 0x99).unwrap();
        assert_eq!(cart.chr_data()[0x10], 0x99);
    }

    #[test]
    fn chr_is_sized_from_chr_units() {
        // 2 PRG units but a single CHR unit: CHR must be 8 KiB, not 16 KiB.
        let data = build_ines(2, 1, 0, 0, 0, None);
        let cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(cart.chr_data().iter().all(|&b| b == 0xCC));
    }

    #[test]
    fn trainer_is_skipped_before_prg() {
        let mut trainer = [0u8; 512];
        for (i, b) in trainer.iter_mut().enumerate() {
            *b = (i & 0xFF) as u8;
        }
        let data = build_ines(1, 1, FLAG_TRAINER, 0, 0, Some(&trainer));
        let cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert!(cart.has_trainer());
        assert_eq!(cart.trainer().map(<[u8]>::len), Some(512));
        assert_eq!(cart.trainer().unwrap()[5], 5);
        // PRG starts after the trainer, so it still reads the PRG fill pattern.
        assert_eq!(cart.fetch_u8(0x8000), Ok(0xAA));
        assert!(cart.data().iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn battery_flag_allocates_prg_ram() {
        let data = build_ines(1, 1, FLAG_BATTERY, 0, 0, None);
        let mut cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert!(cart.battery_backed());
        assert_eq!(cart.prg_ram_len(), 8 * 1024);
        cart.store_u8(0x6000, 0x42).unwrap();
        assert_eq!(cart.fetch_u8(0x6000), Ok(0x42));
        // wraps within the 8 KiB window
        assert_eq!(cart.fetch_u8(0x6000 + 0x2000 - 1), Ok(0));
    }

    #[test]
    fn rom_writes_are_ignored() {
        let data = build_ines(1, 1, 0, 0, 0, None);
        let mut cart = Cartridge::from_ines_bytes(&data).unwrap();
        cart.store_u8(0x8000, 0x00).unwrap();
        assert_eq!(cart.fetch_u8(0x8000), Ok(0xAA));
    }

    #[test]
    fn four_screen_overrides_mirroring() {
        let data = build_ines(1, 1, FLAG_FOUR_SCREEN | FLAG_VERTICAL, 0, 0, None);
        let cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert_eq!(cart.mirroring(), Mirroring::FourScreen);
        assert!(cart.ignore_mirroring());
    }

    #[test]
    fn unsupported_mapper_rejected() {
        let data = build_ines(1, 1, 0x10, 0, 0, None);
        let err = Cartridge::from_ines_bytes(&data).unwrap_err();
        assert!(matches!(err, CartridgeError::UnsupportedMapper(1)));
    }

    #[test]
    fn mapper_high_nibble_from_flags7() {
        let data = build_ines(1, 1, 0, 0x40, 0, None);
        let err = Cartridge::from_ines_bytes(&data).unwrap_err();
        assert!(matches!(err, CartridgeError::UnsupportedMapper(0x40)));
    }

    #[test]
    fn bad_magic_and_short_header() {
        let mut data = build_ines(1, 1, 0, 0, 0, None);
        data[3] = 0x00;
        assert!(matches!(
            Cartridge::from_ines_bytes(&data),
            Err(CartridgeError::MalformedHeader(_))
        ));
        assert!(matches!(
            Cartridge::from_ines_bytes(b"NES\x1A"),
            Err(CartridgeError::MalformedHeader(_))
        ));
    }

    #[test]
    fn truncated_image_rejected() {
        let mut data = build_ines(1, 1, 0, 0, 0, None);
        data.truncate(data.len() - 1);
        match Cartridge::from_ines_bytes(&data) {
            Err(CartridgeError::TruncatedImage { expected, actual }) => {
                assert_eq!(expected, 16 + 16 * 1024 + 8 * 1024);
                assert_eq!(actual, expected - 1);
            }
            other => panic!("expected TruncatedImage, got {other:?}"),
        }
    }

    #[test]
    fn zero_prg_units_rejected() {
        let data = build_ines(0, 1, 0, 0, 0, None);
        assert!(matches!(
            Cartridge::from_ines_bytes(&data),
            Err(CartridgeError::MalformedHeader(_))
        ));
    }

    #[test]
    fn ines2_header_accepted() {
        let data = build_ines(1, 1, 0, 0b0000_1000, 0, None);
        let cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert_eq!(cart.header().version, InesVersion::Ines2);
    }

    #[test]
    fn ines2_byte8_extends_mapper_id() {
        // Mapper 256: low nibbles all zero, byte 8 bit 0 set.
        let mut data = build_ines(1, 1, 0, 0b0000_1000, 0, None);
        data[8] = 0x01;
        let err = Cartridge::from_ines_bytes(&data).unwrap_err();
        assert!(matches!(err, CartridgeError::UnsupportedMapper(0x100)));
    }

    #[test]
    fn ines2_submapper_is_not_prg_ram() {
        let mut data = build_ines(1, 1, 0, 0b0000_1000, 0, None);
        data[8] = 0xF0;
        let cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert_eq!(cart.header().submapper(), 0x0F);
        assert_eq!(cart.mapper_id(), 0);
        assert!(!cart.has_prg_ram());
    }

    #[test]
    fn ines2_prg_ram_from_shift_counts() {
        // 64 << 7 = 8 KiB volatile, 64 << 5 = 2 KiB battery-backed.
        let mut data = build_ines(1, 1, 0, 0b0000_1000, 0, None);
        data[10] = 0x57;
        let cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert_eq!(cart.prg_ram_len(), 8 * 1024 + 2 * 1024);
    }

    #[test]
    fn ines1_ignores_byte10() {
        let mut data = build_ines(1, 1, 0, 0, 0, None);
        data[10] = 0x07;
        let cart = Cartridge::from_ines_bytes(&data).unwrap();
        assert!(!cart.has_prg_ram());
        assert_eq!(cart.header().submapper(), 0);
    }
}
