/*!
execute.rs - 6502 instruction semantics (ALU, flags, stack, RMW, control flow).

Purpose
=======
`execute` applies one `DecodedOp` to a register file and a memory device and
returns the cycles it took. The operand has already been resolved by the
decoder, so every helper here works on `op.addr` / `op.val` and never fetches
from the instruction stream.

PC ownership
------------
Control-transfer mnemonics (JMP, JSR, RTS, RTI, BRK and the eight branches)
set `pc` themselves; a branch that is not taken sets it to the fall-through
address. Every other instruction leaves `pc` untouched for the caller to
advance by the instruction length.

Scope (crate-visible)
---------------------
Stack helpers:
    push, pop, push_word, pop_word, push_status_with_break
    php, plp, pha, pla

Core ALU / register transfer:
    lda/ldx/ldy, tax/tay/txa/tya, tsx/txs
    and/ora/eor/bit
    inx/iny/dex/dey
    adc/sbc (binary only; the 2A03 has no decimal ALU)
    cmp_generic

Shifts / rotates, INC/DEC:
    accumulator forms plus memory forms via rmw_memory

Design Notes
============
- Helpers are generic over `CpuRegs` and `Memory`; there is no dynamic dispatch.
- Memory failures propagate as `CpuError::Memory`.
*/

use crate::cpu::cycles::{branch_penalty, effective_cycles};
use crate::cpu::decode::DecodedOp;
use crate::cpu::opcode::{AddressingMode, Mnemonic};
use crate::cpu::regs::CpuRegs;
use crate::cpu::state::{
    BREAK, CARRY, DECIMAL, IRQ_DISABLE, IRQ_VECTOR, NEGATIVE, OVERFLOW, STACK_BASE, UNUSED, ZERO,
};
use crate::error::{CpuError, MemoryError};
use crate::memory::Memory;

/// Apply `op` and return the effective cycle count.
pub fn execute<C: CpuRegs, M: Memory>(
    op: &DecodedOp,
    cpu: &mut C,
    bus: &mut M,
) -> Result<u32, CpuError> {
    let mut cycles = effective_cycles(op);
    match op.mnemonic {
        // Loads / stores
        Mnemonic::Lda => lda(cpu, op.val),
        Mnemonic::Ldx => ldx(cpu, op.val),
        Mnemonic::Ldy => ldy(cpu, op.val),
        Mnemonic::Sta => bus.store_u8(op.addr, cpu.ac())?,
        Mnemonic::Stx => bus.store_u8(op.addr, cpu.x())?,
        Mnemonic::Sty => bus.store_u8(op.addr, cpu.y())?,

        // Transfers
        Mnemonic::Tax => tax(cpu),
        Mnemonic::Tay => tay(cpu),
        Mnemonic::Txa => txa(cpu),
        Mnemonic::Tya => tya(cpu),
        Mnemonic::Tsx => tsx(cpu),
        Mnemonic::Txs => txs(cpu),

        // Stack
        Mnemonic::Pha => pha(cpu, bus)?,
        Mnemonic::Pla => pla(cpu, bus)?,
        Mnemonic::Php => php(cpu, bus)?,
        Mnemonic::Plp => plp(cpu, bus)?,

        // ALU
        Mnemonic::And => and(cpu, op.val),
        Mnemonic::Ora => ora(cpu, op.val),
        Mnemonic::Eor => eor(cpu, op.val),
        Mnemonic::Bit => bit(cpu, op.val),
        Mnemonic::Adc => adc(cpu, op.val),
        Mnemonic::Sbc => sbc(cpu, op.val),
        Mnemonic::Cmp => {
            let a = cpu.ac();
            cmp_generic(cpu, a, op.val);
        }
        Mnemonic::Cpx => {
            let x = cpu.x();
            cmp_generic(cpu, x, op.val);
        }
        Mnemonic::Cpy => {
            let y = cpu.y();
            cmp_generic(cpu, y, op.val);
        }

        // Shifts / rotates
        Mnemonic::Asl if op.mode == AddressingMode::Accumulator => asl_acc(cpu),
        Mnemonic::Lsr if op.mode == AddressingMode::Accumulator => lsr_acc(cpu),
        Mnemonic::Rol if op.mode == AddressingMode::Accumulator => rol_acc(cpu),
        Mnemonic::Ror if op.mode == AddressingMode::Accumulator => ror_acc(cpu),
        Mnemonic::Asl => asl_mem(cpu, bus, op.addr)?,
        Mnemonic::Lsr => lsr_mem(cpu, bus, op.addr)?,
        Mnemonic::Rol => rol_mem(cpu, bus, op.addr)?,
        Mnemonic::Ror => ror_mem(cpu, bus, op.addr)?,

        // Increment / decrement
        Mnemonic::Inc => inc_mem(cpu, bus, op.addr)?,
        Mnemonic::Dec => dec_mem(cpu, bus, op.addr)?,
        Mnemonic::Inx => inx(cpu),
        Mnemonic::Iny => iny(cpu),
        Mnemonic::Dex => dex(cpu),
        Mnemonic::Dey => dey(cpu),

        // Flags
        Mnemonic::Clc => cpu.assign_flag(CARRY, false),
        Mnemonic::Sec => cpu.assign_flag(CARRY, true),
        Mnemonic::Cli => cpu.assign_flag(IRQ_DISABLE, false),
        Mnemonic::Sei => cpu.assign_flag(IRQ_DISABLE, true),
        Mnemonic::Cld => cpu.assign_flag(DECIMAL, false),
        Mnemonic::Sed => cpu.assign_flag(DECIMAL, true),
        Mnemonic::Clv => cpu.assign_flag(OVERFLOW, false),

        // Control flow
        Mnemonic::Jmp => cpu.set_pc(op.addr),
        Mnemonic::Jsr => {
            // Return address minus one: the last byte of the JSR itself
            push_word(cpu, bus, op.at.wrapping_add(2))?;
            cpu.set_pc(op.addr);
        }
        Mnemonic::Rts => {
            let ret = pop_word(cpu, bus)?;
            cpu.set_pc(ret.wrapping_add(1));
        }
        Mnemonic::Rti => {
            plp(cpu, bus)?;
            let ret = pop_word(cpu, bus)?;
            cpu.set_pc(ret);
        }
        Mnemonic::Brk => {
            // BRK skips a padding byte: the pushed return address is op + 2
            push_word(cpu, bus, op.at.wrapping_add(2))?;
            push_status_with_break(cpu, bus, true)?;
            cpu.assign_flag(IRQ_DISABLE, true);
            let vector = bus.fetch_u16(IRQ_VECTOR)?;
            cpu.set_pc(vector);
        }
        Mnemonic::Nop => {}

        // Branches
        Mnemonic::Bcc
        | Mnemonic::Bcs
        | Mnemonic::Bne
        | Mnemonic::Beq
        | Mnemonic::Bpl
        | Mnemonic::Bmi
        | Mnemonic::Bvc
        | Mnemonic::Bvs => {
            let take = branch_taken(op.mnemonic, cpu.sr());
            cycles += branch(cpu, op, take);
        }
    }
    Ok(cycles)
}

// ---------------------------------------------------------------------------
// Stack helpers
// ---------------------------------------------------------------------------
//
// Push: write at 0x0100 | SP, then SP = SP - 1
// Pull: SP = SP + 1, then read at 0x0100 | SP

#[inline]
pub(crate) fn push<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    v: u8,
) -> Result<(), MemoryError> {
    let sp = cpu.sp();
    bus.store_u8(STACK_BASE | sp as u16, v)?;
    cpu.set_sp(sp.wrapping_sub(1));
    Ok(())
}

#[inline]
pub(crate) fn pop<C: CpuRegs, M: Memory>(cpu: &mut C, bus: &M) -> Result<u8, MemoryError> {
    let sp = cpu.sp().wrapping_add(1);
    cpu.set_sp(sp);
    bus.fetch_u8(STACK_BASE | sp as u16)
}

/// High byte first, so the word reads back little-endian from the stack.
#[inline]
pub(crate) fn push_word<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    v: u16,
) -> Result<(), MemoryError> {
    push(cpu, bus, (v >> 8) as u8)?;
    push(cpu, bus, (v & 0xFF) as u8)
}

#[inline]
pub(crate) fn pop_word<C: CpuRegs, M: Memory>(cpu: &mut C, bus: &M) -> Result<u16, MemoryError> {
    let lo = pop(cpu, bus)? as u16;
    let hi = pop(cpu, bus)? as u16;
    Ok((hi << 8) | lo)
}

/// Push P with control over Break flag semantics (BRK/PHP vs IRQ/NMI).
pub(crate) fn push_status_with_break<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    set_break: bool,
) -> Result<(), MemoryError> {
    let v = cpu.compose_status_for_push(set_break);
    push(cpu, bus, v)
}

#[inline]
pub(crate) fn php<C: CpuRegs, M: Memory>(cpu: &mut C, bus: &mut M) -> Result<(), MemoryError> {
    push_status_with_break(cpu, bus, true)
}

/// B is not a real flip-flop: a pulled status drops it and keeps bit 5 set.
#[inline]
pub(crate) fn plp<C: CpuRegs, M: Memory>(cpu: &mut C, bus: &M) -> Result<(), MemoryError> {
    let v = pop(cpu, bus)?;
    cpu.set_sr((v | UNUSED) & !BREAK);
    Ok(())
}

#[inline]
pub(crate) fn pha<C: CpuRegs, M: Memory>(cpu: &mut C, bus: &mut M) -> Result<(), MemoryError> {
    let a = cpu.ac();
    push(cpu, bus, a)
}

#[inline]
pub(crate) fn pla<C: CpuRegs, M: Memory>(cpu: &mut C, bus: &M) -> Result<(), MemoryError> {
    let val = pop(cpu, bus)?;
    lda(cpu, val);
    Ok(())
}

// ---------------------------------------------------------------------------
// Loads / Transfers
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn lda<C: CpuRegs>(cpu: &mut C, v: u8) {
    cpu.set_ac(v);
    cpu.update_zn(v);
}

#[inline]
pub(crate) fn ldx<C: CpuRegs>(cpu: &mut C, v: u8) {
    cpu.set_x(v);
    cpu.update_zn(v);
}

#[inline]
pub(crate) fn ldy<C: CpuRegs>(cpu: &mut C, v: u8) {
    cpu.set_y(v);
    cpu.update_zn(v);
}

#[inline]
pub(crate) fn tax<C: CpuRegs>(cpu: &mut C) {
    let a = cpu.ac();
    ldx(cpu, a);
}

#[inline]
pub(crate) fn tay<C: CpuRegs>(cpu: &mut C) {
    let a = cpu.ac();
    ldy(cpu, a);
}

#[inline]
pub(crate) fn txa<C: CpuRegs>(cpu: &mut C) {
    let x = cpu.x();
    lda(cpu, x);
}

#[inline]
pub(crate) fn tya<C: CpuRegs>(cpu: &mut C) {
    let y = cpu.y();
    lda(cpu, y);
}

#[inline]
pub(crate) fn tsx<C: CpuRegs>(cpu: &mut C) {
    let sp = cpu.sp();
    ldx(cpu, sp);
}

/// The only transfer that leaves the flags alone.
#[inline]
pub(crate) fn txs<C: CpuRegs>(cpu: &mut C) {
    let x = cpu.x();
    cpu.set_sp(x);
}

// ---------------------------------------------------------------------------
// Logical / Bit
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn and<C: CpuRegs>(cpu: &mut C, v: u8) {
    let r = cpu.ac() & v;
    lda(cpu, r);
}

#[inline]
pub(crate) fn ora<C: CpuRegs>(cpu: &mut C, v: u8) {
    let r = cpu.ac() | v;
    lda(cpu, r);
}

#[inline]
pub(crate) fn eor<C: CpuRegs>(cpu: &mut C, v: u8) {
    let r = cpu.ac() ^ v;
    lda(cpu, r);
}

#[inline]
pub(crate) fn bit<C: CpuRegs>(cpu: &mut C, v: u8) {
    let a = cpu.ac();
    cpu.assign_flag(ZERO, (a & v) == 0);
    cpu.assign_flag(NEGATIVE, (v & 0x80) != 0);
    cpu.assign_flag(OVERFLOW, (v & 0x40) != 0);
}

// ---------------------------------------------------------------------------
// Increment / Decrement (register)
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn inx<C: CpuRegs>(cpu: &mut C) {
    let v = cpu.x().wrapping_add(1);
    ldx(cpu, v);
}

#[inline]
pub(crate) fn iny<C: CpuRegs>(cpu: &mut C) {
    let v = cpu.y().wrapping_add(1);
    ldy(cpu, v);
}

#[inline]
pub(crate) fn dex<C: CpuRegs>(cpu: &mut C) {
    let v = cpu.x().wrapping_sub(1);
    ldx(cpu, v);
}

#[inline]
pub(crate) fn dey<C: CpuRegs>(cpu: &mut C) {
    let v = cpu.y().wrapping_sub(1);
    ldy(cpu, v);
}

// ---------------------------------------------------------------------------
// Shifts / Rotates
// ---------------------------------------------------------------------------

fn shift_left<C: CpuRegs>(cpu: &mut C, v: u8, carry_in: bool) -> u8 {
    cpu.update_carry((v & 0x80) != 0);
    let r = (v << 1) | u8::from(carry_in);
    cpu.update_zn(r);
    r
}

fn shift_right<C: CpuRegs>(cpu: &mut C, v: u8, carry_in: bool) -> u8 {
    cpu.update_carry((v & 0x01) != 0);
    let r = (v >> 1) | if carry_in { 0x80 } else { 0 };
    cpu.update_zn(r);
    r
}

#[inline]
pub(crate) fn asl_acc<C: CpuRegs>(cpu: &mut C) {
    let a = cpu.ac();
    let r = shift_left(cpu, a, false);
    cpu.set_ac(r);
}

#[inline]
pub(crate) fn lsr_acc<C: CpuRegs>(cpu: &mut C) {
    let a = cpu.ac();
    let r = shift_right(cpu, a, false);
    cpu.set_ac(r);
}

#[inline]
pub(crate) fn rol_acc<C: CpuRegs>(cpu: &mut C) {
    let (a, carry) = (cpu.ac(), cpu.is_flag_set(CARRY));
    let r = shift_left(cpu, a, carry);
    cpu.set_ac(r);
}

#[inline]
pub(crate) fn ror_acc<C: CpuRegs>(cpu: &mut C) {
    let (a, carry) = (cpu.ac(), cpu.is_flag_set(CARRY));
    let r = shift_right(cpu, a, carry);
    cpu.set_ac(r);
}

/// Canonical 6502 RMW sequence: read, write the old value back, write the new one.
pub(crate) fn rmw_memory<C: CpuRegs, M: Memory, F>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
    transform: F,
) -> Result<u8, MemoryError>
where
    F: FnOnce(&mut C, u8) -> u8,
{
    let old = bus.fetch_u8(addr)?;
    bus.store_u8(addr, old)?;
    let new = transform(cpu, old);
    bus.store_u8(addr, new)?;
    Ok(new)
}

#[inline]
pub(crate) fn asl_mem<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
) -> Result<(), MemoryError> {
    rmw_memory(cpu, bus, addr, |c, old| shift_left(c, old, false)).map(|_| ())
}

#[inline]
pub(crate) fn lsr_mem<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
) -> Result<(), MemoryError> {
    rmw_memory(cpu, bus, addr, |c, old| shift_right(c, old, false)).map(|_| ())
}

#[inline]
pub(crate) fn rol_mem<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
) -> Result<(), MemoryError> {
    rmw_memory(cpu, bus, addr, |c, old| {
        let carry = c.is_flag_set(CARRY);
        shift_left(c, old, carry)
    })
    .map(|_| ())
}

#[inline]
pub(crate) fn ror_mem<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
) -> Result<(), MemoryError> {
    rmw_memory(cpu, bus, addr, |c, old| {
        let carry = c.is_flag_set(CARRY);
        shift_right(c, old, carry)
    })
    .map(|_| ())
}

// ---------------------------------------------------------------------------
// INC / DEC memory
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn inc_mem<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
) -> Result<(), MemoryError> {
    let r = rmw_memory(cpu, bus, addr, |_, old| old.wrapping_add(1))?;
    cpu.update_zn(r);
    Ok(())
}

#[inline]
pub(crate) fn dec_mem<C: CpuRegs, M: Memory>(
    cpu: &mut C,
    bus: &mut M,
    addr: u16,
) -> Result<(), MemoryError> {
    let r = rmw_memory(cpu, bus, addr, |_, old| old.wrapping_sub(1))?;
    cpu.update_zn(r);
    Ok(())
}

// ---------------------------------------------------------------------------
// ADC / SBC
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn adc<C: CpuRegs>(cpu: &mut C, v: u8) {
    let a = cpu.ac();
    let carry_in = u16::from(cpu.is_flag_set(CARRY));
    let sum16 = a as u16 + v as u16 + carry_in;
    let result = sum16 as u8;

    cpu.update_carry(sum16 > 0xFF);
    // Overflow: ( !(A ^ M) & (A ^ R) & 0x80 ) != 0
    cpu.update_overflow(((!(a ^ v)) & (a ^ result) & 0x80) != 0);
    lda(cpu, result);
}

#[inline]
pub(crate) fn sbc<C: CpuRegs>(cpu: &mut C, v: u8) {
    adc(cpu, v ^ 0xFF);
}

#[inline]
pub(crate) fn cmp_generic<C: CpuRegs>(cpu: &mut C, reg: u8, v: u8) {
    cpu.update_carry(reg >= v);
    cpu.update_zn(reg.wrapping_sub(v));
}

// ---------------------------------------------------------------------------
// Branch
// ---------------------------------------------------------------------------

/// Condition test for the eight conditional branches.
fn branch_taken(mnemonic: Mnemonic, sr: u8) -> bool {
    let set = |mask: u8| sr & mask != 0;
    match mnemonic {
        Mnemonic::Bcc => !set(CARRY),
        Mnemonic::Bcs => set(CARRY),
        Mnemonic::Bne => !set(ZERO),
        Mnemonic::Beq => set(ZERO),
        Mnemonic::Bpl => !set(NEGATIVE),
        Mnemonic::Bmi => set(NEGATIVE),
        Mnemonic::Bvc => !set(OVERFLOW),
        Mnemonic::Bvs => set(OVERFLOW),
        _ => false,
    }
}

/// Set `pc` to the target or the fall-through address; return the extra cycles.
fn branch<C: CpuRegs>(cpu: &mut C, op: &DecodedOp, take: bool) -> u32 {
    cpu.set_pc(if take { op.addr } else { op.base });
    branch_penalty(op, take)
}
