//! Decoded instructions and operands.
//!
//! An [`Instruction`] renders as one line of ESET-VM2 assembly, without indentation or
//! label, e.g. `jumpEqual addr117, r0, qword[r3]`.

use std::fmt;

use crate::disassembler::{AccessSize, Mnemonic, OpCode};

/// Prefix of the labels that name code addresses
pub const LABEL_PREFIX: &str = "addr";

/// A decoded operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Direct register access, `r<index>`
    Register(u8),
    /// Memory access through a register, `<size>[r<base>]`
    Memory {
        /// Width of the access
        size: AccessSize,
        /// Register holding the address
        base: u8,
    },
    /// 64-bit literal, rendered in lowercase hexadecimal
    Constant(u64),
    /// Code address in bits, rendered as `addr<address>`
    Label(u32),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(index) => write!(f, "r{index}"),
            Operand::Memory { size, base } => write!(f, "{size}[r{base}]"),
            Operand::Constant(value) => write!(f, "{value:#x}"),
            Operand::Label(address) => write!(f, "{LABEL_PREFIX}{address}"),
        }
    }
}

/// A decoded ESET-VM2 instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Bit offset of the first opcode bit, relative to the start of the code segment
    pub address: usize,
    /// Encoded size in bits, opcode and operands
    pub size: usize,
    /// The matched opcode table entry
    pub opcode: &'static OpCode,
    /// Decoded operands in stream order
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// The mnemonic of this instruction
    #[must_use]
    pub fn mnemonic(&self) -> Mnemonic {
        self.opcode.mnemonic
    }

    /// Code addresses referenced by label operands
    pub fn targets(&self) -> impl Iterator<Item = u32> + '_ {
        self.operands.iter().filter_map(|operand| match operand {
            Operand::Label(address) => Some(*address),
            _ => None,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.mnemonic)?;

        for (index, operand) in self.operands.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            write!(f, "{separator}{operand}")?;
        }

        Ok(())
    }
}
