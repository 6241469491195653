//! LS-8 register file.
//!
//! Eight general-purpose registers, two of which are reserved:
//! - R7: stack pointer (SP)
//! - R6: flags register (FL), written only by CMP
//!
//! Registers hold native-width values rather than truncating to 8 bits:
//! the LS-8 instruction encoding is 8-bit, but its arithmetic never
//! masks results, so an overflowing program observably grows past 255.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of registers in the LS-8.
pub const NUM_REGISTERS: usize = 8;

/// Register index of the stack pointer.
pub const SP: u8 = 7;

/// Register index of the flags register.
pub const FL: u8 = 6;

/// Flag pattern set by CMP when the operands are equal.
pub const FLAG_EQUAL: u64 = 0b0000_0001;

/// Flag pattern set by CMP when the first operand is greater.
pub const FLAG_GREATER: u64 = 0b0000_0010;

/// Flag pattern set by CMP when the first operand is less.
pub const FLAG_LESS: u64 = 0b0000_0100;

/// The LS-8 register file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registers {
    regs: [u64; NUM_REGISTERS],
}

impl Registers {
    /// Create a new register file with all values zeroed.
    ///
    /// Note that this includes the stack pointer: the LS-8 never
    /// initializes R7 itself, so programs that use the stack must
    /// point it somewhere sensible (via LDI) before the first PUSH.
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_REGISTERS],
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.regs = [0; NUM_REGISTERS];
    }

    /// Read a register by index (0-7).
    #[inline]
    pub fn get(&self, index: u8) -> Result<u64, RegisterError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::IndexOutOfRange(index))
    }

    /// Write a register by index (0-7).
    #[inline]
    pub fn set(&mut self, index: u8, value: u64) -> Result<(), RegisterError> {
        match self.regs.get_mut(index as usize) {
            Some(reg) => {
                *reg = value;
                Ok(())
            }
            None => Err(RegisterError::IndexOutOfRange(index)),
        }
    }

    /// Current stack pointer (R7).
    #[inline]
    pub fn sp(&self) -> u64 {
        self.regs[SP as usize]
    }

    /// Set the stack pointer (R7).
    #[inline]
    pub fn set_sp(&mut self, value: u64) {
        self.regs[SP as usize] = value;
    }

    /// Current flags register (R6).
    #[inline]
    pub fn flags(&self) -> u64 {
        self.regs[FL as usize]
    }

    /// Set the flags register (R6).
    #[inline]
    pub fn set_flags(&mut self, value: u64) {
        self.regs[FL as usize] = value;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a numeric comparison to its flag pattern.
///
/// Exactly one of EQUAL/LESS/GREATER is produced.
pub fn compare_flag(a: u64, b: u64) -> u64 {
    use std::cmp::Ordering;

    match a.cmp(&b) {
        Ordering::Equal => FLAG_EQUAL,
        Ordering::Less => FLAG_LESS,
        Ordering::Greater => FLAG_GREATER,
    }
}

/// Errors that can occur during register operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// Register index is outside 0-7.
    #[error("register index {0} out of range (0-7)")]
    IndexOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut regs = Registers::new();

        regs.set(0, 42).unwrap();
        assert_eq!(regs.get(0).unwrap(), 42);
        assert_eq!(regs.get(1).unwrap(), 0);
    }

    #[test]
    fn test_index_bounds() {
        let mut regs = Registers::new();

        assert!(regs.get(7).is_ok());
        assert_eq!(regs.get(8), Err(RegisterError::IndexOutOfRange(8)));
        assert_eq!(regs.set(200, 1), Err(RegisterError::IndexOutOfRange(200)));
    }

    #[test]
    fn test_reserved_slots() {
        let mut regs = Registers::new();

        regs.set_sp(0xF4);
        assert_eq!(regs.sp(), 0xF4);
        assert_eq!(regs.get(SP).unwrap(), 0xF4);

        regs.set_flags(FLAG_LESS);
        assert_eq!(regs.flags(), FLAG_LESS);
        assert_eq!(regs.get(FL).unwrap(), FLAG_LESS);
    }

    #[test]
    fn test_native_width_values() {
        let mut regs = Registers::new();

        // No 8-bit truncation on write
        regs.set(3, 65025).unwrap();
        assert_eq!(regs.get(3).unwrap(), 65025);
    }

    #[test]
    fn test_compare_flag() {
        assert_eq!(compare_flag(5, 5), FLAG_EQUAL);
        assert_eq!(compare_flag(3, 5), FLAG_LESS);
        assert_eq!(compare_flag(5, 3), FLAG_GREATER);
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.set(2, 99).unwrap();
        regs.set_sp(0xF4);

        regs.reset();

        assert_eq!(regs.get(2).unwrap(), 0);
        assert_eq!(regs.sp(), 0);
    }
}
