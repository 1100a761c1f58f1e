/*!
decode.rs - Bit-field instruction decoder.

Overview
========
Most 6502 opcodes follow an `aaabbbcc` pattern. Here the fields are named
after the way they are extracted:

```text
a = op & 0x03          instruction group (0, 1, 2; 3 is all undocumented)
b = (op & 0xE0) >> 5   operation within the group
c = (op & 0x1C) >> 2   addressing mode within the group
```

An explicit table catches the 36 single-purpose opcodes that break the
pattern (branches, stack, flag and transfer instructions, BRK/JSR/JMP/RTI/RTS,
NOP and register INC/DEC). Everything else goes through one resolver per
group. A byte that neither path accepts is `CpuError::IllegalOpcode`.

`lookup` is the static half (what an opcode *is*); `decode` adds the dynamic
half by resolving operands against the register file and memory. Decoding
never mutates anything, so `decode_many` doubles as a disassembler.
*/

use std::fmt;

use crate::cpu::addressing;
use crate::cpu::opcode::{AddressingMode, Mnemonic};
use crate::cpu::regs::CpuRegs;
use crate::error::CpuError;
use crate::memory::Memory;

/// Static properties of a legal opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Base cycle count, before page-cross and branch adjustments.
    pub cycles: u8,
    pub bytes: u8,
    /// +1 cycle when the indexed address leaves the base page.
    pub page_penalty: bool,
}

impl OpcodeInfo {
    const fn new(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8) -> Self {
        Self {
            mnemonic,
            mode,
            cycles,
            bytes: mode.len(),
            page_penalty: false,
        }
    }

    const fn with_penalty(mut self) -> Self {
        self.page_penalty = true;
        self
    }
}

/// Look up the static description of `opcode`; `None` for undocumented bytes.
pub fn lookup(opcode: u8) -> Option<OpcodeInfo> {
    if let Some(info) = irregular(opcode) {
        return Some(info);
    }
    let a = opcode & 0x03;
    let b = (opcode & 0xE0) >> 5;
    let c = (opcode & 0x1C) >> 2;
    match a {
        0 => group0(b, c),
        1 => group1(b, c),
        2 => group2(b, c),
        _ => None,
    }
}

fn irregular(opcode: u8) -> Option<OpcodeInfo> {
    use AddressingMode::{Absolute, Implied, Indirect, Relative};
    use Mnemonic::*;
    let info = match opcode {
        0x00 => OpcodeInfo::new(Brk, Implied, 7),
        0x08 => OpcodeInfo::new(Php, Implied, 3),
        0x10 => OpcodeInfo::new(Bpl, Relative, 2),
        0x18 => OpcodeInfo::new(Clc, Implied, 2),
        0x20 => OpcodeInfo::new(Jsr, Absolute, 6),
        0x28 => OpcodeInfo::new(Plp, Implied, 4),
        0x30 => OpcodeInfo::new(Bmi, Relative, 2),
        0x38 => OpcodeInfo::new(Sec, Implied, 2),
        0x40 => OpcodeInfo::new(Rti, Implied, 6),
        0x48 => OpcodeInfo::new(Pha, Implied, 3),
        0x4C => OpcodeInfo::new(Jmp, Absolute, 3),
        0x50 => OpcodeInfo::new(Bvc, Relative, 2),
        0x58 => OpcodeInfo::new(Cli, Implied, 2),
        0x60 => OpcodeInfo::new(Rts, Implied, 6),
        0x68 => OpcodeInfo::new(Pla, Implied, 4),
        0x6C => OpcodeInfo::new(Jmp, Indirect, 5),
        0x70 => OpcodeInfo::new(Bvs, Relative, 2),
        0x78 => OpcodeInfo::new(Sei, Implied, 2),
        0x88 => OpcodeInfo::new(Dey, Implied, 2),
        0x8A => OpcodeInfo::new(Txa, Implied, 2),
        0x90 => OpcodeInfo::new(Bcc, Relative, 2),
        0x98 => OpcodeInfo::new(Tya, Implied, 2),
        0x9A => OpcodeInfo::new(Txs, Implied, 2),
        0xA8 => OpcodeInfo::new(Tay, Implied, 2),
        0xAA => OpcodeInfo::new(Tax, Implied, 2),
        0xB0 => OpcodeInfo::new(Bcs, Relative, 2),
        0xB8 => OpcodeInfo::new(Clv, Implied, 2),
        0xBA => OpcodeInfo::new(Tsx, Implied, 2),
        0xC8 => OpcodeInfo::new(Iny, Implied, 2),
        0xCA => OpcodeInfo::new(Dex, Implied, 2),
        0xD0 => OpcodeInfo::new(Bne, Relative, 2),
        0xD8 => OpcodeInfo::new(Cld, Implied, 2),
        0xE8 => OpcodeInfo::new(Inx, Implied, 2),
        0xEA => OpcodeInfo::new(Nop, Implied, 2),
        0xF0 => OpcodeInfo::new(Beq, Relative, 2),
        0xF8 => OpcodeInfo::new(Sed, Implied, 2),
        _ => return None,
    };
    Some(info)
}

/// a = 0: BIT, STY, LDY, CPY, CPX.
fn group0(b: u8, c: u8) -> Option<OpcodeInfo> {
    use AddressingMode::*;
    let mnemonic = match b {
        1 => Mnemonic::Bit,
        4 => Mnemonic::Sty,
        5 => Mnemonic::Ldy,
        6 => Mnemonic::Cpy,
        7 => Mnemonic::Cpx,
        _ => return None,
    };
    let info = match (mnemonic, c) {
        (Mnemonic::Ldy | Mnemonic::Cpy | Mnemonic::Cpx, 0) => {
            OpcodeInfo::new(mnemonic, Immediate, 2)
        }
        (_, 1) => OpcodeInfo::new(mnemonic, ZeroPage, 3),
        (_, 3) => OpcodeInfo::new(mnemonic, Absolute, 4),
        (Mnemonic::Sty | Mnemonic::Ldy, 5) => OpcodeInfo::new(mnemonic, ZeroPageX, 4),
        (Mnemonic::Ldy, 7) => OpcodeInfo::new(mnemonic, AbsoluteX, 4).with_penalty(),
        _ => return None,
    };
    Some(info)
}

/// a = 1: the eight accumulator ALU/load/store operations, full mode set.
fn group1(b: u8, c: u8) -> Option<OpcodeInfo> {
    use AddressingMode::*;
    const MNEMONICS: [Mnemonic; 8] = [
        Mnemonic::Ora,
        Mnemonic::And,
        Mnemonic::Eor,
        Mnemonic::Adc,
        Mnemonic::Sta,
        Mnemonic::Lda,
        Mnemonic::Cmp,
        Mnemonic::Sbc,
    ];
    let mnemonic = MNEMONICS[b as usize];
    let store = mnemonic == Mnemonic::Sta;
    let info = match c {
        0 => OpcodeInfo::new(mnemonic, IndexedIndirect, 6),
        1 => OpcodeInfo::new(mnemonic, ZeroPage, 3),
        // STA #imm does not exist
        2 if store => return None,
        2 => OpcodeInfo::new(mnemonic, Immediate, 2),
        3 => OpcodeInfo::new(mnemonic, Absolute, 4),
        4 if store => OpcodeInfo::new(mnemonic, IndirectIndexed, 6),
        4 => OpcodeInfo::new(mnemonic, IndirectIndexed, 5).with_penalty(),
        5 => OpcodeInfo::new(mnemonic, ZeroPageX, 4),
        6 if store => OpcodeInfo::new(mnemonic, AbsoluteY, 5),
        6 => OpcodeInfo::new(mnemonic, AbsoluteY, 4).with_penalty(),
        7 if store => OpcodeInfo::new(mnemonic, AbsoluteX, 5),
        7 => OpcodeInfo::new(mnemonic, AbsoluteX, 4).with_penalty(),
        _ => return None,
    };
    Some(info)
}

/// a = 2: shifts/rotates, STX/LDX, DEC/INC.
fn group2(b: u8, c: u8) -> Option<OpcodeInfo> {
    use AddressingMode::*;
    const MNEMONICS: [Mnemonic; 8] = [
        Mnemonic::Asl,
        Mnemonic::Rol,
        Mnemonic::Lsr,
        Mnemonic::Ror,
        Mnemonic::Stx,
        Mnemonic::Ldx,
        Mnemonic::Dec,
        Mnemonic::Inc,
    ];
    let mnemonic = MNEMONICS[b as usize];
    let info = match (b, c) {
        // STX / LDX index with Y where the others use X
        (4, 1) => OpcodeInfo::new(mnemonic, ZeroPage, 3),
        (4, 3) => OpcodeInfo::new(mnemonic, Absolute, 4),
        (4, 5) => OpcodeInfo::new(mnemonic, ZeroPageY, 4),
        (5, 0) => OpcodeInfo::new(mnemonic, Immediate, 2),
        (5, 1) => OpcodeInfo::new(mnemonic, ZeroPage, 3),
        (5, 3) => OpcodeInfo::new(mnemonic, Absolute, 4),
        (5, 5) => OpcodeInfo::new(mnemonic, ZeroPageY, 4),
        (5, 7) => OpcodeInfo::new(mnemonic, AbsoluteY, 4).with_penalty(),
        (4 | 5, _) => return None,
        // read-modify-write family
        (0..=3, 2) => OpcodeInfo::new(mnemonic, Accumulator, 2),
        (_, 1) => OpcodeInfo::new(mnemonic, ZeroPage, 5),
        (_, 3) => OpcodeInfo::new(mnemonic, Absolute, 6),
        (_, 5) => OpcodeInfo::new(mnemonic, ZeroPageX, 6),
        (_, 7) => OpcodeInfo::new(mnemonic, AbsoluteX, 7),
        _ => return None,
    };
    Some(info)
}

/// One fully resolved instruction.
///
/// `addr` and `val` depend on the registers at decode time; `base` is the
/// address before indexing (or the fall-through address for branches) and is
/// what page-cross timing compares against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodedOp {
    pub opcode: u8,
    /// Address of the opcode byte.
    pub at: u16,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub cycles: u8,
    pub bytes: u8,
    pub page_penalty: bool,
    /// Conditional branch; the target in `addr` is already relative-fixed.
    pub branch: bool,
    operand: [u8; 2],
    pub base: u16,
    pub addr: u16,
    pub val: u8,
}

impl DecodedOp {
    /// Raw operand bytes following the opcode (0 to 2 of them).
    pub fn operand_bytes(&self) -> &[u8] {
        let n = (self.bytes as usize).saturating_sub(1).min(2);
        &self.operand[..n]
    }

    /// Address of the instruction that follows this one in memory.
    #[inline]
    pub fn next_pc(&self) -> u16 {
        self.at.wrapping_add(self.bytes as u16)
    }

    fn operand_word(&self) -> u16 {
        u16::from_le_bytes(self.operand)
    }
}

impl fmt::Display for DecodedOp {
    /// Assembler syntax, e.g. `LDA $20FF,X` or `BNE $800E`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic;
        let b = self.operand[0];
        let w = self.operand_word();
        match self.mode {
            AddressingMode::Implied => write!(f, "{m}"),
            AddressingMode::Accumulator => write!(f, "{m} A"),
            AddressingMode::Immediate => write!(f, "{m} #${b:02X}"),
            AddressingMode::ZeroPage => write!(f, "{m} ${b:02X}"),
            AddressingMode::ZeroPageX => write!(f, "{m} ${b:02X},X"),
            AddressingMode::ZeroPageY => write!(f, "{m} ${b:02X},Y"),
            AddressingMode::Absolute => write!(f, "{m} ${w:04X}"),
            AddressingMode::AbsoluteX => write!(f, "{m} ${w:04X},X"),
            AddressingMode::AbsoluteY => write!(f, "{m} ${w:04X},Y"),
            AddressingMode::Indirect => write!(f, "{m} (${w:04X})"),
            AddressingMode::IndexedIndirect => write!(f, "{m} (${b:02X},X)"),
            AddressingMode::IndirectIndexed => write!(f, "{m} (${b:02X}),Y"),
            AddressingMode::Relative => write!(f, "{m} ${:04X}", self.addr),
        }
    }
}

/// Decode the instruction at `at` using `cpu` for index and accumulator values.
pub fn decode<C: CpuRegs, M: Memory>(bus: &M, cpu: &C, at: u16) -> Result<DecodedOp, CpuError> {
    let opcode = bus.fetch_u8(at)?;
    let info = lookup(opcode).ok_or(CpuError::IllegalOpcode { opcode, addr: at })?;

    let mut operand = [0u8; 2];
    for (i, slot) in operand
        .iter_mut()
        .enumerate()
        .take(info.bytes as usize - 1)
    {
        *slot = bus.fetch_u8(at.wrapping_add(i as u16 + 1))?;
    }

    let resolved = addressing::resolve(info.mode, cpu, bus, at)?;
    let val = match info.mode {
        AddressingMode::Implied => 0,
        AddressingMode::Accumulator => cpu.ac(),
        _ => bus.fetch_u8(resolved.addr)?,
    };

    Ok(DecodedOp {
        opcode,
        at,
        mnemonic: info.mnemonic,
        mode: info.mode,
        cycles: info.cycles,
        bytes: info.bytes,
        page_penalty: info.page_penalty,
        branch: info.mnemonic.is_branch(),
        operand,
        base: resolved.base,
        addr: resolved.addr,
        val,
    })
}

/// Most entries `decode_many` returns: one per address in the CPU space.
pub const MAX_DECODE_COUNT: usize = 0x1_0000;

/// Decode `count` consecutive instructions starting at `at`.
///
/// Read-only. An undecodable byte yields its error in place and the walk
/// resumes at the following byte. `count` is clamped to `MAX_DECODE_COUNT`.
pub fn decode_many<C: CpuRegs, M: Memory>(
    bus: &M,
    cpu: &C,
    at: u16,
    count: usize,
) -> Vec<Result<DecodedOp, CpuError>> {
    let count = count.min(MAX_DECODE_COUNT);
    let mut out = Vec::with_capacity(count);
    let mut addr = at;
    for _ in 0..count {
        let result = decode(bus, cpu, addr);
        addr = match &result {
            Ok(op) => op.next_pc(),
            Err(_) => addr.wrapping_add(1),
        };
        out.push(result);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::cartridge::Cartridge;
    use crate::cpu::state::Registers;
    use crate::test_utils::build_nrom_with_prg;

    fn bus_with(prg: &[u8]) -> Bus {
        let rom = build_nrom_with_prg(prg, 1, 0, None);
        Bus::new(Cartridge::from_ines_bytes(&rom).expect("parse"))
    }

    #[test]
    fn legal_opcode_count() {
        let legal = (0..=255u8).filter(|&op| lookup(op).is_some()).count();
        assert_eq!(legal, 151);
    }

    #[test]
    fn group_three_is_undocumented() {
        for op in (0..=255u8).filter(|op| op & 0x03 == 3) {
            assert!(lookup(op).is_none(), "{op:#04X}");
        }
    }

    #[test]
    fn irregular_entries() {
        let jmp = lookup(0x4C).unwrap();
        assert_eq!(
            (jmp.mnemonic, jmp.mode, jmp.bytes, jmp.cycles),
            (Mnemonic::Jmp, AddressingMode::Absolute, 3, 3)
        );
        let bvs = lookup(0x70).unwrap();
        assert_eq!((bvs.mode, bvs.bytes), (AddressingMode::Relative, 2));
        let beq = lookup(0xF0).unwrap();
        assert_eq!(
            (beq.mnemonic, beq.mode),
            (Mnemonic::Beq, AddressingMode::Relative)
        );
        let brk = lookup(0x00).unwrap();
        assert_eq!((brk.bytes, brk.cycles), (1, 7));
    }

    #[test]
    fn group0_compare_forms() {
        let cpx = lookup(0xEC).unwrap();
        assert_eq!(
            (cpx.mnemonic, cpx.mode, cpx.bytes, cpx.cycles),
            (Mnemonic::Cpx, AddressingMode::Absolute, 3, 4)
        );
        let cpy = lookup(0xCC).unwrap();
        assert_eq!(
            (cpy.mnemonic, cpy.mode),
            (Mnemonic::Cpy, AddressingMode::Absolute)
        );
        let ldy = lookup(0xB4).unwrap();
        assert_eq!(
            (ldy.mode, ldy.bytes, ldy.cycles),
            (AddressingMode::ZeroPageX, 2, 4)
        );
        assert!(lookup(0xBC).unwrap().page_penalty);
        assert!(lookup(0x89).is_none());
        assert!(lookup(0x3C).is_none());
    }

    #[test]
    fn store_forms_have_fixed_timing() {
        let sta_y = lookup(0x91).unwrap();
        assert_eq!((sta_y.cycles, sta_y.page_penalty), (6, false));
        let sta_absx = lookup(0x9D).unwrap();
        assert_eq!((sta_absx.cycles, sta_absx.page_penalty), (5, false));
        let lda_absx = lookup(0xBD).unwrap();
        assert_eq!((lda_absx.cycles, lda_absx.page_penalty), (4, true));
    }

    #[test]
    fn group2_ldx_lengths_come_from_mode() {
        for (op, bytes, cycles) in [
            (0xA2u8, 2u8, 2u8),
            (0xA6, 2, 3),
            (0xAE, 3, 4),
            (0xB6, 2, 4),
            (0xBE, 3, 4),
        ] {
            let info = lookup(op).unwrap();
            assert_eq!(info.mnemonic, Mnemonic::Ldx);
            assert_eq!((info.bytes, info.cycles), (bytes, cycles), "{op:#04X}");
        }
        assert_eq!(lookup(0x96).unwrap().mode, AddressingMode::ZeroPageY);
        assert!(lookup(0x9E).is_none());
        assert!(lookup(0x02).is_none());
        assert_eq!(lookup(0x0A).unwrap().mode, AddressingMode::Accumulator);
        assert_eq!(lookup(0xFE).unwrap().cycles, 7);
    }

    #[test]
    fn decode_immediate_and_display() {
        let bus = bus_with(&[0xA2, 0x05]);
        let op = decode(&bus, &Registers::new(), 0x8000).unwrap();
        assert_eq!(op.mnemonic, Mnemonic::Ldx);
        assert_eq!(op.addr, 0x8001);
        assert_eq!(op.val, 0x05);
        assert_eq!(op.operand_bytes(), &[0x05]);
        assert_eq!(op.next_pc(), 0x8002);
        assert_eq!(op.to_string(), "LDX #$05");
    }

    #[test]
    fn decode_reports_illegal_opcode_with_address() {
        let bus = bus_with(&[0xEA, 0x02]);
        let err = decode(&bus, &Registers::new(), 0x8001).unwrap_err();
        assert_eq!(
            err,
            CpuError::IllegalOpcode {
                opcode: 0x02,
                addr: 0x8001
            }
        );
    }

    #[test]
    fn decode_branch_resolves_target() {
        let bus = bus_with(&[0xD0, 0x10]);
        let op = decode(&bus, &Registers::new(), 0x8000).unwrap();
        assert!(op.branch);
        assert_eq!(op.base, 0x8002);
        assert_eq!(op.addr, 0x8012);
        assert_eq!(op.to_string(), "BNE $8012");
    }

    #[test]
    fn decode_is_idempotent() {
        let bus = bus_with(&[0xBD, 0xFF, 0x20, 0x6C, 0x00, 0x02]);
        let regs = Registers {
            x: 1,
            ..Registers::new()
        };
        assert_eq!(decode(&bus, &regs, 0x8000), decode(&bus, &regs, 0x8000));
        assert_eq!(decode(&bus, &regs, 0x8003), decode(&bus, &regs, 0x8003));
    }

    #[test]
    fn decode_many_walks_lengths_and_skips_illegal() {
        // LDX #$05 ; NOP ; <02> ; JMP $8000
        let bus = bus_with(&[0xA2, 0x05, 0xEA, 0x02, 0x4C, 0x00, 0x80]);
        let ops = decode_many(&bus, &Registers::new(), 0x8000, 4);
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].as_ref().unwrap().at, 0x8000);
        assert_eq!(ops[1].as_ref().unwrap().at, 0x8002);
        assert!(ops[2].is_err());
        let jmp = ops[3].as_ref().unwrap();
        assert_eq!(jmp.at, 0x8004);
        assert_eq!(jmp.to_string(), "JMP $8000");
    }

    #[test]
    fn decode_many_clamps_oversized_count() {
        let bus = bus_with(&[0xEA]);
        let ops = decode_many(&bus, &Registers::new(), 0x8000, usize::MAX);
        assert_eq!(ops.len(), MAX_DECODE_COUNT);
        assert_eq!(decode_many(&bus, &Registers::new(), 0x8000, 0).len(), 0);
    }
}
