#![doc = r#"
nes6502 library crate.

The instruction-processing core of the NES CPU: a bit-field 6502 decoder and
executor, the CPU address-space router, and an iNES (mapper 0) cartridge
loader.

Modules:
- memory: bounds-checked `MemoryBlock` and the `Memory` capability trait
- bus: CPU address map (internal RAM, PPU register window, cartridge)
- cartridge: iNES loader and cartridge metadata; owns an NROM board
- mapper: NROM (mapper 0) PRG/CHR mapping
- cpu: 6502 core (register file, decoder, executor, `Cpu` facade)
- machine: `Machine`, the owning context that ties CPU, bus and config together
- config: `MachineConfig` and command-line parsing for the binary
- error: error types for every layer

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod error;
pub mod machine;
pub mod mapper;
pub mod memory;

// Re-export commonly used types at the crate root for convenience.
pub use bus::Bus;
pub use cartridge::Cartridge;
pub use config::{IllegalOpcodePolicy, MachineConfig};
pub use cpu::{Cpu, DecodedOp, Registers};
pub use error::{CartridgeError, CpuError, Error, MemoryError};
pub use machine::{Machine, RunSummary, StopReason};
pub use memory::{Memory, MemoryBlock};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
