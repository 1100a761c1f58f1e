/*!
regs.rs - CpuRegs trait: the register + flag interface the decoder and the
instruction helpers are written against.

The trait deliberately has no bus access, no stack and no fetch helpers;
those stay explicit at call sites with a `Memory` implementor passed
alongside. Helpers are generic (`fn op<C: CpuRegs>(cpu: &mut C)`), so the
abstraction costs nothing at run time.

Implemented for `Registers`.
*/

use crate::cpu::state::{BREAK, CARRY, NEGATIVE, OVERFLOW, Registers, UNUSED, ZERO};

pub trait CpuRegs {
    fn ac(&self) -> u8;
    fn x(&self) -> u8;
    fn y(&self) -> u8;
    fn sp(&self) -> u8;
    fn pc(&self) -> u16;
    fn sr(&self) -> u8;

    fn set_ac(&mut self, v: u8);
    fn set_x(&mut self, v: u8);
    fn set_y(&mut self, v: u8);
    fn set_sp(&mut self, v: u8);
    fn set_pc(&mut self, v: u16);
    fn set_sr(&mut self, v: u8);

    /// Advance PC by `delta` (wrapping at 16 bits).
    #[inline]
    fn advance_pc(&mut self, delta: u16) {
        let pc = self.pc().wrapping_add(delta);
        self.set_pc(pc);
    }

    #[inline]
    fn is_flag_set(&self, mask: u8) -> bool {
        (self.sr() & mask) != 0
    }

    /// Set or clear the flag bits in `mask`.
    #[inline]
    fn assign_flag(&mut self, mask: u8, value: bool) {
        let sr = if value {
            self.sr() | mask
        } else {
            self.sr() & !mask
        };
        self.set_sr(sr);
    }

    /// ZERO and NEGATIVE from a result byte.
    #[inline]
    fn update_zn(&mut self, result: u8) {
        self.assign_flag(ZERO, result == 0);
        self.assign_flag(NEGATIVE, (result & 0x80) != 0);
    }

    #[inline]
    fn update_carry(&mut self, carry: bool) {
        self.assign_flag(CARRY, carry);
    }

    #[inline]
    fn update_overflow(&mut self, overflow: bool) {
        self.assign_flag(OVERFLOW, overflow);
    }

    /// Status byte as pushed by PHP/BRK (`set_break`) or by IRQ/NMI.
    /// Bit 5 is always set on the stack copy.
    #[inline]
    fn compose_status_for_push(&self, set_break: bool) -> u8 {
        let v = self.sr() | UNUSED;
        if set_break { v | BREAK } else { v & !BREAK }
    }
}

impl CpuRegs for Registers {
    #[inline]
    fn ac(&self) -> u8 {
        self.ac
    }
    #[inline]
    fn x(&self) -> u8 {
        self.x
    }
    #[inline]
    fn y(&self) -> u8 {
        self.y
    }
    #[inline]
    fn sp(&self) -> u8 {
        self.sp
    }
    #[inline]
    fn pc(&self) -> u16 {
        self.pc
    }
    #[inline]
    fn sr(&self) -> u8 {
        self.sr
    }

    #[inline]
    fn set_ac(&mut self, v: u8) {
        self.ac = v;
    }
    #[inline]
    fn set_x(&mut self, v: u8) {
        self.x = v;
    }
    #[inline]
    fn set_y(&mut self, v: u8) {
        self.y = v;
    }
    #[inline]
    fn set_sp(&mut self, v: u8) {
        self.sp = v;
    }
    #[inline]
    fn set_pc(&mut self, v: u16) {
        self.pc = v;
    }
    #[inline]
    fn set_sr(&mut self, v: u8) {
        self.sr = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::state::{DECIMAL, IRQ_DISABLE};

    #[test]
    fn flag_assignment() {
        let mut r = Registers::new();
        r.assign_flag(IRQ_DISABLE, false);
        assert!(!r.is_flag_set(IRQ_DISABLE));
        r.assign_flag(DECIMAL, true);
        assert!(r.is_flag_set(DECIMAL));
        r.assign_flag(DECIMAL, false);
        assert!(!r.is_flag_set(DECIMAL));
    }

    #[test]
    fn update_zn_behavior() {
        let mut r = Registers::new();
        r.update_zn(0x00);
        assert!(r.is_flag_set(ZERO));
        assert!(!r.is_flag_set(NEGATIVE));
        r.update_zn(0x80);
        assert!(!r.is_flag_set(ZERO));
        assert!(r.is_flag_set(NEGATIVE));
        r.update_zn(0x7F);
        assert!(!r.is_flag_set(ZERO) && !r.is_flag_set(NEGATIVE));
    }

    #[test]
    fn pc_advance_wraps() {
        let mut r = Registers::new();
        r.set_pc(0xFFFF);
        r.advance_pc(1);
        assert_eq!(r.pc(), 0x0000);
        r.advance_pc(2);
        assert_eq!(r.pc(), 0x0002);
    }

    #[test]
    fn pushed_status_forces_bit5() {
        let mut r = Registers::new();
        r.set_sr(0x00);
        assert_eq!(r.compose_status_for_push(true), BREAK | UNUSED);
        r.set_sr(0xFF);
        assert_eq!(r.compose_status_for_push(false), 0xFF & !BREAK);
    }
}
