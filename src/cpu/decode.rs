//! Instruction decoder for the LS-8.
//!
//! Each instruction is a single opcode byte followed by zero, one, or
//! two operand bytes. The opcode byte encodes its own metadata:
//!
//! - bits 7-6: number of operand bytes
//! - bit 5: ALU operation
//! - bit 4: instruction sets the program counter itself
//! - bits 3-0: instruction identifier
//!
//! PC advancement is derived from this metadata in one place rather
//! than hardcoded per handler.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A defined LS-8 opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Halt execution.
    Hlt = 0x01,
    /// Load an immediate into a register.
    Ldi = 0x82,
    /// Print a register's value in decimal.
    Prn = 0x47,
    /// Multiply two registers into the first.
    Mul = 0xA2,
    /// Add two registers into the first.
    Add = 0xA0,
    /// Push a register onto the stack.
    Push = 0x45,
    /// Pop the top of the stack into a register.
    Pop = 0x46,
    /// Call the subroutine whose address a register holds.
    Call = 0x50,
    /// Return from a subroutine.
    Ret = 0x11,
    /// Compare two registers and set the flags register.
    Cmp = 0xA7,
    /// Unconditional jump to the address a register holds.
    Jmp = 0x54,
    /// Jump if the EQUAL flag is set.
    Jeq = 0x55,
    /// Jump if the EQUAL flag is not set.
    Jne = 0x56,
}

impl Opcode {
    /// All defined opcodes.
    pub const ALL: [Opcode; 13] = [
        Opcode::Hlt,
        Opcode::Ldi,
        Opcode::Prn,
        Opcode::Mul,
        Opcode::Add,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Call,
        Opcode::Ret,
        Opcode::Cmp,
        Opcode::Jmp,
        Opcode::Jeq,
        Opcode::Jne,
    ];

    /// Decode a raw opcode byte.
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0x01 => Ok(Opcode::Hlt),
            0x82 => Ok(Opcode::Ldi),
            0x47 => Ok(Opcode::Prn),
            0xA2 => Ok(Opcode::Mul),
            0xA0 => Ok(Opcode::Add),
            0x45 => Ok(Opcode::Push),
            0x46 => Ok(Opcode::Pop),
            0x50 => Ok(Opcode::Call),
            0x11 => Ok(Opcode::Ret),
            0xA7 => Ok(Opcode::Cmp),
            0x54 => Ok(Opcode::Jmp),
            0x55 => Ok(Opcode::Jeq),
            0x56 => Ok(Opcode::Jne),
            _ => Err(DecodeError::UnknownOpcode(byte)),
        }
    }

    /// The raw opcode byte.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes following the opcode (top two bits).
    #[inline]
    pub const fn operand_count(self) -> usize {
        (self.to_byte() >> 6) as usize
    }

    /// Whether this is an ALU operation (bit 5).
    #[inline]
    pub const fn is_alu(self) -> bool {
        self.to_byte() & 0b0010_0000 != 0
    }

    /// Whether this instruction writes the program counter itself (bit 4).
    #[inline]
    pub const fn sets_pc(self) -> bool {
        self.to_byte() & 0b0001_0000 != 0
    }

    /// Whether the dispatch loop must leave the program counter alone.
    ///
    /// Control-transfer instructions assign PC themselves; HLT stops
    /// the loop without advancing at all.
    #[inline]
    pub const fn manages_pc(self) -> bool {
        self.sets_pc() || matches!(self, Opcode::Hlt)
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Mul => "MUL",
            Opcode::Add => "ADD",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Cmp => "CMP",
            Opcode::Jmp => "JMP",
            Opcode::Jeq => "JEQ",
            Opcode::Jne => "JNE",
        }
    }
}

/// A fully decoded LS-8 instruction with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt execution.
    Hlt,
    /// reg := value
    Ldi { reg: u8, value: u8 },
    /// Print reg in decimal, newline-terminated.
    Prn { reg: u8 },
    /// dst := dst * src
    Mul { dst: u8, src: u8 },
    /// dst := dst + src
    Add { dst: u8, src: u8 },
    /// SP := SP-1; mem[SP] := reg
    Push { reg: u8 },
    /// reg := mem[SP]; SP := SP+1
    Pop { reg: u8 },
    /// Push the return address, then PC := reg
    Call { reg: u8 },
    /// PC := mem[SP]; SP := SP+1
    Ret,
    /// FL := comparison of lhs and rhs
    Cmp { lhs: u8, rhs: u8 },
    /// PC := reg
    Jmp { reg: u8 },
    /// If EQUAL flag set, PC := reg
    Jeq { reg: u8 },
    /// If EQUAL flag not set, PC := reg
    Jne { reg: u8 },
}

impl Instruction {
    /// Build an instruction from a decoded opcode and its operand bytes.
    ///
    /// Only the first `opcode.operand_count()` bytes of `operands` are
    /// meaningful; the rest are ignored.
    pub fn new(opcode: Opcode, operands: [u8; 2]) -> Self {
        let [a, b] = operands;
        match opcode {
            Opcode::Hlt => Instruction::Hlt,
            Opcode::Ldi => Instruction::Ldi { reg: a, value: b },
            Opcode::Prn => Instruction::Prn { reg: a },
            Opcode::Mul => Instruction::Mul { dst: a, src: b },
            Opcode::Add => Instruction::Add { dst: a, src: b },
            Opcode::Push => Instruction::Push { reg: a },
            Opcode::Pop => Instruction::Pop { reg: a },
            Opcode::Call => Instruction::Call { reg: a },
            Opcode::Ret => Instruction::Ret,
            Opcode::Cmp => Instruction::Cmp { lhs: a, rhs: b },
            Opcode::Jmp => Instruction::Jmp { reg: a },
            Opcode::Jeq => Instruction::Jeq { reg: a },
            Opcode::Jne => Instruction::Jne { reg: a },
        }
    }

    /// The opcode this instruction was decoded from.
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::Hlt => Opcode::Hlt,
            Instruction::Ldi { .. } => Opcode::Ldi,
            Instruction::Prn { .. } => Opcode::Prn,
            Instruction::Mul { .. } => Opcode::Mul,
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Push { .. } => Opcode::Push,
            Instruction::Pop { .. } => Opcode::Pop,
            Instruction::Call { .. } => Opcode::Call,
            Instruction::Ret => Opcode::Ret,
            Instruction::Cmp { .. } => Opcode::Cmp,
            Instruction::Jmp { .. } => Opcode::Jmp,
            Instruction::Jeq { .. } => Opcode::Jeq,
            Instruction::Jne { .. } => Opcode::Jne,
        }
    }

    /// Total width in bytes (opcode plus operands).
    pub const fn len(&self) -> usize {
        1 + self.opcode().operand_count()
    }

    /// Encode back to bytes. Used by tests and program builders.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode().to_byte()];
        match *self {
            Instruction::Hlt | Instruction::Ret => {}
            Instruction::Prn { reg }
            | Instruction::Push { reg }
            | Instruction::Pop { reg }
            | Instruction::Call { reg }
            | Instruction::Jmp { reg }
            | Instruction::Jeq { reg }
            | Instruction::Jne { reg } => bytes.push(reg),
            Instruction::Ldi { reg, value } => {
                bytes.push(reg);
                bytes.push(value);
            }
            Instruction::Mul { dst, src } | Instruction::Add { dst, src } => {
                bytes.push(dst);
                bytes.push(src);
            }
            Instruction::Cmp { lhs, rhs } => {
                bytes.push(lhs);
                bytes.push(rhs);
            }
        }
        bytes
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Instruction::Hlt | Instruction::Ret => {
                write!(f, "{}", self.opcode().mnemonic())
            }
            Instruction::Prn { reg }
            | Instruction::Push { reg }
            | Instruction::Pop { reg }
            | Instruction::Call { reg }
            | Instruction::Jmp { reg }
            | Instruction::Jeq { reg }
            | Instruction::Jne { reg } => {
                write!(f, "{} R{}", self.opcode().mnemonic(), reg)
            }
            Instruction::Ldi { reg, value } => {
                write!(f, "LDI R{}, {}", reg, value)
            }
            Instruction::Mul { dst, src } => write!(f, "MUL R{}, R{}", dst, src),
            Instruction::Add { dst, src } => write!(f, "ADD R{}, R{}", dst, src),
            Instruction::Cmp { lhs, rhs } => write!(f, "CMP R{}, R{}", lhs, rhs),
        }
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The byte does not name a defined opcode.
    #[error("unknown opcode byte 0x{0:02X}")]
    UnknownOpcode(u8),
}
