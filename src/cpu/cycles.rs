/*!
cycles.rs - Dynamic cycle adjustments for the 6502 CPU core.

Base cycle counts live with the opcode descriptions in `decode`; this module
adds the two dynamic penalties on top:

  - page crossing: +1 when an instruction flagged `page_penalty` indexes into
    a different page than its base address;
  - branches: +1 when taken, +1 more when the target lies in a different page
    than the fall-through address.

Read-modify-write instructions have their full cost in the base count.
*/

use crate::cpu::decode::DecodedOp;

/// True if `a` and `b` lie in different 256-byte pages.
#[inline]
pub fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

/// Extra cycle for an indexed read that leaves its base page.
#[inline]
pub fn page_penalty(op: &DecodedOp) -> u32 {
    u32::from(op.page_penalty && page_crossed(op.base, op.addr))
}

/// Extra cycles for a conditional branch: 0 not taken, 1 taken, 2 taken across a page.
#[inline]
pub fn branch_penalty(op: &DecodedOp, taken: bool) -> u32 {
    if !taken {
        return 0;
    }
    1 + u32::from(page_crossed(op.base, op.addr))
}

/// Cycles an instruction costs before branch adjustments.
#[inline]
pub fn effective_cycles(op: &DecodedOp) -> u32 {
    u32::from(op.cycles) + page_penalty(op)
}
