//! All 256 opcode bytes against the published 6502 reference table.

mod common;

use std::collections::HashMap;

use nes6502::cpu::{decode, lookup};
use nes6502::{Bus, Cartridge, Memory, Registers};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Reference {
    opcode: u8,
    mnemonic: String,
    mode: String,
    bytes: u8,
    cycles: u8,
    page_penalty: bool,
}

fn reference() -> HashMap<u8, Reference> {
    let raw = include_str!("data/opcodes.json");
    let rows: Vec<Reference> = serde_json::from_str(raw).expect("parse opcodes.json");
    rows.into_iter().map(|r| (r.opcode, r)).collect()
}

fn bus() -> Bus {
    let rom = common::nrom(&[], 0);
    Bus::new(Cartridge::from_ines_bytes(&rom).expect("cartridge"))
}

#[test]
fn reference_table_is_complete() {
    let table = reference();
    assert_eq!(table.len(), 151);
}

#[test]
fn lookup_matches_reference() {
    let table = reference();
    for opcode in 0..=255u8 {
        match (table.get(&opcode), lookup(opcode)) {
            (Some(r), Some(info)) => {
                assert_eq!(
                    info.mnemonic.name(),
                    r.mnemonic,
                    "mnemonic of {opcode:#04X}"
                );
                assert_eq!(info.mode.short_name(), r.mode, "mode of {opcode:#04X}");
                assert_eq!(info.bytes, r.bytes, "length of {opcode:#04X}");
                assert_eq!(info.cycles, r.cycles, "cycles of {opcode:#04X}");
                assert_eq!(
                    info.page_penalty, r.page_penalty,
                    "penalty of {opcode:#04X}"
                );
            }
            (None, None) => {}
            (Some(r), None) => panic!("{opcode:#04X} should decode as {}", r.mnemonic),
            (None, Some(info)) => panic!("{opcode:#04X} is undocumented, got {}", info.mnemonic),
        }
    }
}

#[test]
fn decode_through_the_bus_matches_lookup() {
    let table = reference();
    let mut bus = bus();
    let regs = Registers::default();
    let mut illegal = 0;

    for opcode in 0..=255u8 {
        // Operands point at $0210 (or zero page $10), both plain RAM.
        bus.store_u8(0x0300, opcode).unwrap();
        bus.store_u8(0x0301, 0x10).unwrap();
        bus.store_u8(0x0302, 0x02).unwrap();

        match decode(&bus, &regs, 0x0300) {
            Ok(op) => {
                let r = &table[&opcode];
                assert_eq!(op.opcode, opcode);
                assert_eq!(op.at, 0x0300);
                assert_eq!(op.mnemonic.name(), r.mnemonic);
                assert_eq!(op.bytes, r.bytes);
                assert_eq!(op.cycles, r.cycles);
                assert_eq!(op.next_pc(), 0x0300 + u16::from(r.bytes));
                assert_eq!(op.branch, r.mode == "rel");
            }
            Err(nes6502::CpuError::IllegalOpcode { opcode: o, addr }) => {
                assert_eq!((o, addr), (opcode, 0x0300));
                assert!(!table.contains_key(&opcode), "{opcode:#04X} rejected");
                illegal += 1;
            }
            Err(e) => panic!("{opcode:#04X}: unexpected {e}"),
        }
    }
    assert_eq!(illegal, 105);
}

#[test]
fn decoding_twice_is_stable() {
    let mut bus = bus();
    let regs = Registers {
        x: 3,
        y: 7,
        ac: 0x42,
        ..Registers::default()
    };
    for opcode in 0..=255u8 {
        bus.store_u8(0x0400, opcode).unwrap();
        bus.store_u8(0x0401, 0xFF).unwrap();
        bus.store_u8(0x0402, 0x01).unwrap();
        let first = decode(&bus, &regs, 0x0400);
        let second = decode(&bus, &regs, 0x0400);
        assert_eq!(first, second, "{opcode:#04X}");
    }
}
