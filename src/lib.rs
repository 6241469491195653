//! # LS-8 Emulator
//!
//! An emulator of the LS-8, an 8-bit register machine with 256 bytes of
//! memory, 8 registers, and a 13-instruction set covering arithmetic,
//! a memory-backed stack, subroutine calls, and compare-and-branch.
//!
//! Programs are plain text files of binary literals (see [`loader`]);
//! the [`Cpu`] runs them with a fetch-decode-execute loop until it
//! halts or faults.

pub mod cpu;
pub mod loader;

// Re-export commonly used types
pub use cpu::{Cpu, CpuError, CpuSnapshot, CpuState, Instruction, Memory, Opcode, Registers};
pub use loader::{load_program, parse_program, LoaderError};
