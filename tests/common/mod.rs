//! iNES builders for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use nes6502::cartridge::{CHR_UNIT, HEADER_LEN, PRG_UNIT};

/// NROM-128 image: `prg` at $8000, reset vector $8000, one CHR bank.
/// `flags6` lands in header byte 6 untouched.
pub fn nrom(prg: &[u8], flags6: u8) -> Vec<u8> {
    let mut rom = Vec::with_capacity(HEADER_LEN + PRG_UNIT + CHR_UNIT);
    rom.extend_from_slice(b"NES\x1A");
    rom.extend_from_slice(&[1, 1, flags6, 0, 0]);
    rom.resize(HEADER_LEN, 0);

    let mut bank = vec![0xEA; PRG_UNIT];
    bank[..prg.len()].copy_from_slice(prg);
    // NMI, RESET, IRQ
    bank[PRG_UNIT - 6..].copy_from_slice(&[0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);
    rom.extend_from_slice(&bank);
    rom.resize(rom.len() + CHR_UNIT, 0);
    rom
}

/// Place `code` at `addr` inside the $8000 bank of an NROM-128 image.
pub fn nrom_with_code_at(addr: u16, code: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; (addr - 0x8000) as usize + code.len()];
    prg[(addr - 0x8000) as usize..].copy_from_slice(code);
    nrom(&prg, 0)
}

/// Write `bytes` to a fresh file in the system temp directory.
pub fn write_temp_rom(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("nes6502-{}-{name}.nes", std::process::id()));
    std::fs::write(&path, bytes).expect("write temp rom");
    path
}
