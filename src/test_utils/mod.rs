//! iNES image builders shared by the unit tests.
//!
//! Header bytes written here:
//! - 0..4  `NES\x1A`
//! - 4     PRG-ROM size in 16 KiB units
//! - 5     CHR-ROM size in 8 KiB units (0 => the board gets CHR-RAM)
//! - 6     flags 6 (mirroring, battery, trainer, mapper low nibble)
//! - 7     flags 7 (mapper high nibble, NES 2.0 marker)
//! - 8     PRG-RAM size in 8 KiB units
//! - 9..16 zero
//!
//! PRG is filled with 0xAA and CHR with 0xCC so slicing mistakes show up as
//! wrong bytes rather than zeros.

#![allow(dead_code)]

use crate::cartridge::{CHR_UNIT, HEADER_LEN, PRG_UNIT, TRAINER_LEN};

pub const PRG_FILL: u8 = 0xAA;
pub const CHR_FILL: u8 = 0xCC;

/// Build an iNES image with pattern-filled PRG/CHR and an optional trainer.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; TRAINER_LEN]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        HEADER_LEN + trainer.map_or(0, |t| t.len()) + prg_16k * PRG_UNIT + chr_8k * CHR_UNIT,
    );
    bytes.extend_from_slice(b"NES\x1A");
    bytes.extend_from_slice(&[prg_16k as u8, chr_8k as u8, flags6, flags7, prg_ram_8k]);
    bytes.resize(HEADER_LEN, 0);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.resize(bytes.len() + prg_16k * PRG_UNIT, PRG_FILL);
    bytes.resize(bytes.len() + chr_8k * CHR_UNIT, CHR_FILL);
    bytes
}

/// One 16 KiB PRG bank holding `prg` at $8000, with vectors written at the
/// top of the bank. `vectors` is `(reset, nmi, irq)`; all default to $8000.
pub fn build_nrom_with_prg(
    prg: &[u8],
    chr_8k: usize,
    prg_ram_8k: u8,
    vectors: Option<(u16, u16, u16)>,
) -> Vec<u8> {
    assert!(
        prg.len() <= PRG_UNIT - 6,
        "program overlaps the vector table"
    );
    let mut rom = build_ines(1, chr_8k, 0, 0, prg_ram_8k, None);
    let bank = &mut rom[HEADER_LEN..HEADER_LEN + PRG_UNIT];
    bank[..prg.len()].copy_from_slice(prg);
    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(bank, reset, nmi, irq);
    rom
}

/// Write NMI/RESET/IRQ vectors into the last six bytes of a 16 or 32 KiB PRG image.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    assert!(
        prg.len() == PRG_UNIT || prg.len() == 2 * PRG_UNIT,
        "PRG image must be 16 or 32 KiB, got {} bytes",
        prg.len()
    );
    let top = prg.len() - 6;
    for (i, v) in [nmi, reset, irq].into_iter().enumerate() {
        prg[top + 2 * i..top + 2 * i + 2].copy_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_sizes() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(&rom[4..9], &[2, 1, 0x01, 0x00, 1]);
        assert!(rom[9..16].iter().all(|&b| b == 0));
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
        assert_eq!(rom[16], PRG_FILL);
        assert_eq!(rom[rom.len() - 1], CHR_FILL);
    }

    #[test]
    fn trainer_precedes_prg() {
        let trainer = [0x5A; 512];
        let rom = build_ines(1, 0, 0x04, 0, 0, Some(&trainer));
        assert_eq!(rom.len(), 16 + 512 + 16 * 1024);
        assert_eq!(rom[16], 0x5A);
        assert_eq!(rom[16 + 512], PRG_FILL);
    }

    #[test]
    fn vectors_at_top_of_bank() {
        let mut prg = vec![0u8; 32 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x7FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn program_and_default_vectors() {
        let rom = build_nrom_with_prg(&[0xA9, 0x01], 1, 0, None);
        assert_eq!(&rom[16..18], &[0xA9, 0x01]);
        assert_eq!(&rom[16 + 0x3FFC..16 + 0x3FFE], &[0x00, 0x80]);
    }
}
