/*!
addressing.rs - 6502 effective-address resolution.

Overview
========
Pure functions: given the address of an instruction, the register file (for
index values) and read access to memory, compute where the operand lives.
Nothing here moves `pc` or writes memory, so the decoder can also run ahead of
execution for disassembly.

Every resolver returns an `Operand` carrying both the effective address and
the *base* address the index was added to; the timing layer compares their
high bytes to decide on the page-cross penalty.

Quirks reproduced
=================
- Zero-page indexed modes wrap inside page 0 ($FF + 1 = $00).
- Zero-page pointers read their high byte from `(zp + 1) & $FF`.
- JMP (indirect) with a pointer at `$xxFF` takes its high byte from `$xx00`.
*/

use crate::cpu::opcode::AddressingMode;
use crate::cpu::regs::CpuRegs;
use crate::error::MemoryError;
use crate::memory::Memory;

/// Resolved operand location.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Operand {
    /// Pre-index address (pointer target for indirect modes, fall-through for branches).
    pub base: u16,
    /// Effective address.
    pub addr: u16,
}

impl Operand {
    #[inline]
    fn direct(addr: u16) -> Self {
        Self { base: addr, addr }
    }
}

/// Resolve the operand of the instruction at `at` for `mode`.
///
/// Implied and accumulator modes have no memory operand and resolve to zero.
pub fn resolve<C: CpuRegs, M: Memory>(
    mode: AddressingMode,
    cpu: &C,
    bus: &M,
    at: u16,
) -> Result<Operand, MemoryError> {
    let arg = at.wrapping_add(1);
    let op = match mode {
        AddressingMode::Implied | AddressingMode::Accumulator => Operand::default(),
        AddressingMode::Immediate => Operand::direct(arg),
        AddressingMode::ZeroPage => Operand::direct(bus.fetch_u8(arg)? as u16),
        AddressingMode::ZeroPageX => zp_indexed(bus.fetch_u8(arg)?, cpu.x()),
        AddressingMode::ZeroPageY => zp_indexed(bus.fetch_u8(arg)?, cpu.y()),
        AddressingMode::Absolute => Operand::direct(bus.fetch_u16(arg)?),
        AddressingMode::AbsoluteX => indexed(bus.fetch_u16(arg)?, cpu.x()),
        AddressingMode::AbsoluteY => indexed(bus.fetch_u16(arg)?, cpu.y()),
        AddressingMode::Indirect => {
            let pointer = bus.fetch_u16(arg)?;
            Operand {
                base: pointer,
                addr: read_word_indirect_bug(bus, pointer)?,
            }
        }
        AddressingMode::IndexedIndirect => {
            let zp = bus.fetch_u8(arg)?.wrapping_add(cpu.x());
            Operand::direct(read_word_zp(bus, zp)?)
        }
        AddressingMode::IndirectIndexed => {
            let zp = bus.fetch_u8(arg)?;
            indexed(read_word_zp(bus, zp)?, cpu.y())
        }
        AddressingMode::Relative => {
            let offset = bus.fetch_u8(arg)? as i8;
            let next = at.wrapping_add(2);
            Operand {
                base: next,
                addr: next.wrapping_add(offset as u16),
            }
        }
    };
    Ok(op)
}

#[inline]
fn zp_indexed(zp: u8, index: u8) -> Operand {
    Operand {
        base: zp as u16,
        addr: zp.wrapping_add(index) as u16,
    }
}

#[inline]
fn indexed(base: u16, index: u8) -> Operand {
    Operand {
        base,
        addr: base.wrapping_add(index as u16),
    }
}

/// Read a 16-bit little endian pointer from zero page with wraparound
/// on the high byte (standard 6502 zero-page indirect behavior).
#[inline]
pub fn read_word_zp<M: Memory>(bus: &M, base: u8) -> Result<u16, MemoryError> {
    let lo = bus.fetch_u8(base as u16)? as u16;
    let hi = bus.fetch_u8(base.wrapping_add(1) as u16)? as u16;
    Ok((hi << 8) | lo)
}

/// JMP (indirect) hardware bug: when the low byte of the pointer is $FF the
/// high byte is fetched from the start of the same page.
#[inline]
pub fn read_word_indirect_bug<M: Memory>(bus: &M, addr: u16) -> Result<u16, MemoryError> {
    let lo = bus.fetch_u8(addr)? as u16;
    let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let hi = bus.fetch_u8(hi_addr)? as u16;
    Ok((hi << 8) | lo)
}
