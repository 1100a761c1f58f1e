/*!
core::Cpu - 6502 CPU façade wrapping the register file.

Design
======
- `Cpu` stores a single field: `regs: Registers`.
- `step` is the driving loop body: decode at `pc`, execute, then advance `pc`
  by the instruction length unless the instruction wrote `pc` itself.
- `lookahead` decodes ahead of `pc` without side effects (disassembly views).

The façade is generic over `Memory`, so the same CPU drives the full `Bus` or
any other device that speaks the trait.
*/

use log::{debug, info};

use crate::cpu::decode::{DecodedOp, decode, decode_many};
use crate::cpu::execute::execute;
use crate::cpu::state::Registers;
use crate::error::{CpuError, MemoryError};
use crate::memory::Memory;

/// Result of one executed instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub op: DecodedOp,
    pub cycles: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    regs: Registers,
}

impl Cpu {
    /// Construct a new CPU with power‑up defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Mutable register access (debuggers, tests, skip-on-illegal policy).
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Reset registers and load `pc` from the reset vector.
    pub fn reset<M: Memory>(&mut self, bus: &M) -> Result<(), MemoryError> {
        self.regs.reset(bus)?;
        info!("cpu reset: pc={:#06X}", self.regs.pc);
        Ok(())
    }

    /// Decode the instruction at `addr` against the current registers.
    pub fn decode<M: Memory>(&self, bus: &M, addr: u16) -> Result<DecodedOp, CpuError> {
        decode(bus, &self.regs, addr)
    }

    /// Decode `count` instructions starting at `pc`.
    pub fn lookahead<M: Memory>(&self, bus: &M, count: usize) -> Vec<Result<DecodedOp, CpuError>> {
        decode_many(bus, &self.regs, self.regs.pc, count)
    }

    /// Execute one instruction.
    ///
    /// On error the registers are left as they were before the step, except
    /// for a memory failure in the middle of a multi-access instruction.
    pub fn step<M: Memory>(&mut self, bus: &mut M) -> Result<Step, CpuError> {
        let op = decode(bus, &self.regs, self.regs.pc)?;
        let cycles = execute(&op, &mut self.regs, bus)?;
        if !op.mnemonic.writes_pc() {
            self.regs.pc = op.next_pc();
        }
        debug!(
            "{:04X}  {:<8}  {:<14} cyc={} -> {}",
            op.at,
            hex_bytes(&op),
            op.to_string(),
            cycles,
            self.regs
        );
        Ok(Step { op, cycles })
    }
}

/// `A2 05`-style rendering of an instruction's raw bytes.
pub fn hex_bytes(op: &DecodedOp) -> String {
    let mut s = format!("{:02X}", op.opcode);
    for b in op.operand_bytes() {
        s.push_str(&format!(" {b:02X}"));
    }
    s
}
