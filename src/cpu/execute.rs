//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::decode::{Instruction, Opcode};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::{self, RegisterError, FLAG_EQUAL};
use serde::{Serialize, Deserialize};
use std::io::Write;
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// Constructed and loaded, but not yet stepped.
    Ready,
    /// CPU is executing instructions.
    Running,
    /// CPU executed HLT. Terminal.
    Halted,
    /// CPU hit a fault. Terminal.
    Faulted,
}

/// The LS-8 CPU.
///
/// Owns all machine state and the output sink that PRN writes to.
pub struct Cpu<W> {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Program counter.
    pub pc: usize,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling).
    pub cycles: u64,
    /// Where PRN output goes.
    pub output: W,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl<W: Write> Cpu<W> {
    /// Create a new CPU with zeroed state, writing PRN output to `output`.
    pub fn new(output: W) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            pc: 0,
            state: CpuState::Ready,
            cycles: 0,
            output,
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state. The output sink is kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.pc = 0;
        self.state = CpuState::Ready;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Load a program image at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed. Any fault transitions
    /// the CPU to [`CpuState::Faulted`] and is surfaced to the caller;
    /// there is no recovery or retry.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        match self.state {
            CpuState::Ready => self.state = CpuState::Running,
            CpuState::Running => {}
            state => return Err(CpuError::NotRunning(state)),
        }

        match self.fetch_execute() {
            Ok(instr) => {
                self.cycles += 1;
                self.last_instr = Some(instr);
                Ok(instr)
            }
            Err(e) => {
                self.state = CpuState::Faulted;
                Err(e)
            }
        }
    }

    /// Run until halt or fault.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while matches!(self.state, CpuState::Ready | CpuState::Running) {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while matches!(self.state, CpuState::Ready | CpuState::Running) && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// One fetch-decode-execute cycle.
    fn fetch_execute(&mut self) -> Result<Instruction, CpuError> {
        let pc = self.pc;

        // Fetch
        let raw = self.mem.read(pc)?;
        let opcode = Opcode::from_byte(raw)
            .map_err(|_| CpuError::IllegalInstruction { opcode: raw, pc })?;

        let mut operands = [0u8; 2];
        for (i, slot) in operands.iter_mut().take(opcode.operand_count()).enumerate() {
            *slot = self.mem.read(pc + 1 + i)?;
        }

        // Decode and execute
        let instr = Instruction::new(opcode, operands);
        self.execute(instr)?;

        // Advance PC by the instruction width unless the instruction
        // owns its PC (control transfers; HLT leaves it untouched)
        if !opcode.manages_pc() {
            self.pc = pc + 1 + opcode.operand_count();
        }

        Ok(instr)
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, instr: Instruction) -> Result<(), CpuError> {
        match instr {
            Instruction::Hlt => {
                self.state = CpuState::Halted;
            }

            Instruction::Ldi { reg, value } => {
                self.regs.set(reg, value as u64)?;
            }

            Instruction::Prn { reg } => {
                let value = self.regs.get(reg)?;
                writeln!(self.output, "{}", value)
                    .map_err(|e| CpuError::Output(e.to_string()))?;
            }

            // ALU operations wrap at u64 width; the LS-8 never
            // truncates results back to 8 bits
            Instruction::Mul { dst, src } => {
                let result = self.regs.get(dst)?.wrapping_mul(self.regs.get(src)?);
                self.regs.set(dst, result)?;
            }

            Instruction::Add { dst, src } => {
                let result = self.regs.get(dst)?.wrapping_add(self.regs.get(src)?);
                self.regs.set(dst, result)?;
            }

            Instruction::Push { reg } => {
                let value = self.regs.get(reg)?;
                self.push(value)?;
            }

            Instruction::Pop { reg } => {
                let value = self.pop()?;
                self.regs.set(reg, value as u64)?;
            }

            Instruction::Call { reg } => {
                let return_addr = self.pc + 2;
                self.push(return_addr as u64)?;
                self.pc = self.regs.get(reg)? as usize;
            }

            Instruction::Ret => {
                self.pc = self.pop()? as usize;
            }

            Instruction::Cmp { lhs, rhs } => {
                let a = self.regs.get(lhs)?;
                let b = self.regs.get(rhs)?;
                self.regs.set_flags(registers::compare_flag(a, b));
            }

            Instruction::Jmp { reg } => {
                self.pc = self.regs.get(reg)? as usize;
            }

            Instruction::Jeq { reg } => {
                if self.regs.flags() == FLAG_EQUAL {
                    self.pc = self.regs.get(reg)? as usize;
                } else {
                    self.pc += 2;
                }
            }

            Instruction::Jne { reg } => {
                if self.regs.flags() != FLAG_EQUAL {
                    self.pc = self.regs.get(reg)? as usize;
                } else {
                    self.pc += 2;
                }
            }
        }

        Ok(())
    }

    /// Push a value onto the stack.
    ///
    /// The stack pointer is never initialized by the machine itself, so
    /// a PUSH with SP at 0 is a fault rather than a silent wrap.
    fn push(&mut self, value: u64) -> Result<(), CpuError> {
        let pc = self.pc;
        let byte = u8::try_from(value)
            .map_err(|_| CpuError::ValueTooWide { value, pc })?;

        let new_sp = self.regs.sp()
            .checked_sub(1)
            .ok_or(CpuError::StackUnderflow { pc })?;

        self.mem.write(new_sp as usize, byte)?;
        self.regs.set_sp(new_sp);

        Ok(())
    }

    /// Pop the top value off the stack.
    fn pop(&mut self) -> Result<u8, CpuError> {
        let sp = self.regs.sp();
        let value = self.mem.read(sp as usize)?;
        self.regs.set_sp(sp + 1);

        Ok(value)
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU has halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU can still execute instructions.
    pub fn is_running(&self) -> bool {
        matches!(self.state, CpuState::Ready | CpuState::Running)
    }

    /// Capture the full machine state.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            regs: self.regs.clone(),
            mem: self.mem.clone(),
            pc: self.pc,
            state: self.state,
            cycles: self.cycles,
        }
    }
}

impl<W> std::fmt::Debug for Cpu<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("pc", &self.pc)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// A serializable snapshot of the machine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub regs: Registers,
    pub mem: Memory,
    pub pc: usize,
    pub state: CpuState,
    pub cycles: u64,
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("illegal instruction 0x{opcode:02X} at PC={pc}")]
    IllegalInstruction { opcode: u8, pc: usize },

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("register error: {0}")]
    Register(#[from] RegisterError),

    #[error("stack underflow at PC={pc} (stack pointer not initialized?)")]
    StackUnderflow { pc: usize },

    #[error("value {value} does not fit in a memory cell (PC={pc})")]
    ValueTooWide { value: u64, pc: usize },

    #[error("output error: {0}")]
    Output(String),
}
