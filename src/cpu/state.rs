/*!
state.rs - 6502 register file and status flag masks.

`Registers` is the single owner of all architecturally visible state: the
program counter, accumulator, both index registers, the status byte and the
stack pointer. Bus access, decode and timing live elsewhere.

6502 Status Register Bit Layout
===============================
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
Where:
  N = NEGATIVE
  V = OVERFLOW
  1 = UNUSED (always reads as 1)
  B = BREAK (PHP/BRK only; hardware IRQ/NMI push with B clear)
  D = DECIMAL (stored, but the 2A03 has no decimal ALU)
  I = IRQ_DISABLE
  Z = ZERO
  C = CARRY
*/

use std::fmt;

use crate::error::MemoryError;
use crate::memory::Memory;

/// Processor status flag bit masks.
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000;
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000;
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Vector addresses.
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Stack page base; the stack pointer indexes into $0100-$01FF.
pub const STACK_BASE: u16 = 0x0100;

/// Status after reset: IRQ disabled, bit 5 set.
pub const RESET_STATUS: u8 = IRQ_DISABLE | UNUSED;
pub const RESET_SP: u8 = 0xFD;

/// 6502 register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    pub ac: u8,
    pub x: u8,
    pub y: u8,
    pub sr: u8,
    pub sp: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            pc: 0x0000,
            ac: 0,
            x: 0,
            y: 0,
            sr: RESET_STATUS,
            sp: RESET_SP,
        }
    }
}

impl Registers {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset registers and load `pc` from the reset vector at $FFFC/$FFFD.
    pub fn reset<M: Memory>(&mut self, bus: &M) -> Result<(), MemoryError> {
        *self = Self::default();
        self.pc = bus.fetch_u16(RESET_VECTOR)?;
        Ok(())
    }

    /// Address the next push writes to.
    #[inline]
    pub fn stack_top(&self) -> u16 {
        STACK_BASE | self.sp as u16
    }
}

impl fmt::Display for Registers {
    /// `PC:8002 A:00 X:05 Y:00 P:24 SP:FD nv-bdIzc`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: [(u8, char); 8] = [
            (NEGATIVE, 'n'),
            (OVERFLOW, 'v'),
            (UNUSED, '-'),
            (BREAK, 'b'),
            (DECIMAL, 'd'),
            (IRQ_DISABLE, 'i'),
            (ZERO, 'z'),
            (CARRY, 'c'),
        ];
        write!(
            f,
            "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} ",
            self.pc, self.ac, self.x, self.y, self.sr, self.sp
        )?;
        for (mask, letter) in LETTERS {
            let c = if self.sr & mask != 0 && mask != UNUSED {
                letter.to_ascii_uppercase()
            } else {
                letter
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
