/*!
Machine: the single owning context for one emulated system.

A `Machine` owns the `Cpu`, the `Bus` (and through it the `Cartridge`) and the
`MachineConfig`. Front ends borrow what they need (`registers`, `cartridge`,
`lookahead`) and drive execution with `step` or `run`; nothing is shared
through raw pointers or globals.
*/

use std::path::Path;

use log::{info, warn};

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::config::{IllegalOpcodePolicy, MachineConfig};
use crate::cpu::{Cpu, CpuRegs, DecodedOp, Registers, Step};
use crate::error::{CpuError, Error};

/// Why `run` returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The instruction budget was used up.
    BudgetExhausted,
    /// A step failed and the configuration says to stop.
    Halted(CpuError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub instructions: u64,
    pub cycles: u64,
    /// Undocumented opcode bytes stepped over under `IllegalOpcodePolicy::Skip`.
    pub skipped: u64,
    pub stop: StopReason,
}

#[derive(Debug)]
pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    config: MachineConfig,
    total_cycles: u64,
}

impl Machine {
    /// Build a machine around an already loaded cartridge. Call `reset` before running.
    pub fn new(cartridge: Cartridge, config: MachineConfig) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(cartridge),
            config,
            total_cycles: 0,
        }
    }

    /// Load an iNES file and reset.
    pub fn from_ines_file<P: AsRef<Path>>(path: P, config: MachineConfig) -> Result<Self, Error> {
        let cartridge = Cartridge::from_ines_file(path)?;
        let mut machine = Self::new(cartridge, config);
        machine.reset()?;
        Ok(machine)
    }

    /// Parse an in-memory iNES image and reset.
    pub fn from_ines_bytes(data: &[u8], config: MachineConfig) -> Result<Self, Error> {
        let cartridge = Cartridge::from_ines_bytes(data)?;
        let mut machine = Self::new(cartridge, config);
        machine.reset()?;
        Ok(machine)
    }

    /// Clear internal RAM and reset the CPU from the reset vector.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.bus.reset();
        self.cpu.reset(&self.bus)?;
        self.total_cycles = 0;
        info!("machine reset: {}", self.cpu.registers());
        Ok(())
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<Step, CpuError> {
        let step = self.cpu.step(&mut self.bus)?;
        self.total_cycles += u64::from(step.cycles);
        Ok(step)
    }

    /// Execute up to `config.instruction_budget` instructions.
    ///
    /// Illegal opcodes either stop the run or are stepped over one byte at a
    /// time, per `config.illegal_opcode`. Any other failure stops the run.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary {
            instructions: 0,
            cycles: 0,
            skipped: 0,
            stop: StopReason::BudgetExhausted,
        };
        for _ in 0..self.config.instruction_budget {
            match self.step() {
                Ok(step) => {
                    summary.instructions += 1;
                    summary.cycles += u64::from(step.cycles);
                }
                Err(CpuError::IllegalOpcode { opcode, addr })
                    if self.config.illegal_opcode == IllegalOpcodePolicy::Skip =>
                {
                    warn!("skipping illegal opcode {opcode:#04X} at {addr:#06X}");
                    self.cpu.registers_mut().advance_pc(1);
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!("run halted: {e}");
                    summary.stop = StopReason::Halted(e);
                    break;
                }
            }
        }
        info!(
            "run finished: {} instructions, {} cycles, {} skipped, {:?}",
            summary.instructions, summary.cycles, summary.skipped, summary.stop
        );
        summary
    }

    /// Decode `count` instructions from `pc` without executing them.
    pub fn lookahead(&self, count: usize) -> Vec<Result<DecodedOp, CpuError>> {
        self.cpu.lookahead(&self.bus, count)
    }

    pub fn registers(&self) -> &Registers {
        self.cpu.registers()
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        self.cpu.registers_mut()
    }

    pub fn cartridge(&self) -> &Cartridge {
        self.bus.cartridge()
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Cycles executed since the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }
}
