//! CPU emulation for the LS-8 machine.
//!
//! This module implements the complete LS-8 architecture:
//! - 256 bytes of flat memory shared by code, data, and stack
//! - 8 registers, with R7 as stack pointer and R6 as flags
//! - a 13-instruction set dispatched by a fetch-decode-execute loop

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Registers, RegisterError, NUM_REGISTERS, SP, FL};
pub use decode::{Instruction, Opcode, DecodeError};
pub use execute::{Cpu, CpuError, CpuState, CpuSnapshot};
