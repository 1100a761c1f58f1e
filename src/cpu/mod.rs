/*!
cpu::mod - Public façade for the 6502 CPU core.

Layout:

```text
state.rs      - Register file, flag masks, vectors, reset.
regs.rs       - `CpuRegs` trait the decoder and instruction helpers use.
opcode.rs     - `Mnemonic` and `AddressingMode` vocabularies.
decode.rs     - Bit-field decoder producing `DecodedOp`.
addressing.rs - Effective-address resolution for every addressing mode.
cycles.rs     - Page-cross and branch cycle adjustments.
execute.rs    - Instruction semantics; applies a `DecodedOp`.
core/         - The `Cpu` façade (reset, step, lookahead).
```

Data flow per step: `decode` reads memory (registers only for index values)
→ `DecodedOp` → `execute` mutates registers and memory and returns cycles →
`Cpu::step` advances `pc` unless the instruction wrote it.

Usage:
```rust,ignore
use nes6502::cpu::Cpu;

let mut cpu = Cpu::new();
cpu.reset(&bus)?;
let step = cpu.step(&mut bus)?;
```
*/

pub mod addressing;
pub mod core;
pub mod cycles;
pub mod decode;
pub mod execute;
pub mod opcode;
pub mod regs;
pub mod state;

pub use crate::cpu::core::{Cpu, Step};
pub use crate::cpu::decode::{DecodedOp, MAX_DECODE_COUNT, OpcodeInfo, decode, decode_many, lookup};
pub use crate::cpu::opcode::{AddressingMode, Mnemonic};
pub use crate::cpu::regs::CpuRegs;
pub use crate::cpu::state::{
    BREAK, CARRY, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, Registers, UNUSED, ZERO,
};
