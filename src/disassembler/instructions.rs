//! The ESET-VM2 opcode table.
//!
//! Opcodes are prefix-free bit patterns of [`MIN_CODE_BITS`] to [`MAX_CODE_BITS`] bits,
//! stored in stream order. The decoder reads the shortest possible pattern first and extends
//! it one bit at a time until it matches an entry of [`INSTRUCTIONS`].

use std::sync::OnceLock;

use log::warn;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error::InvalidOpcodeTable, Result};

/// Length of the shortest opcode in bits
pub const MIN_CODE_BITS: u8 = 3;

/// Length of the longest opcode in bits
pub const MAX_CODE_BITS: u8 = 6;

/// Instruction mnemonics, rendered the way the ESET-VM2 assembler spells them
#[allow(missing_docs)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum Mnemonic {
    Mov,
    LoadConst,
    Add,
    Sub,
    Div,
    Mod,
    Mul,
    Compare,
    Jump,
    JumpEqual,
    Read,
    Write,
    ConsoleRead,
    ConsoleWrite,
    CreateThread,
    JoinThread,
    Hlt,
    Sleep,
    Call,
    Ret,
    Lock,
    Unlock,
}

/// Encoding class of an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum OperandKind {
    /// A register, or a sized memory access through a register (`R`)
    #[strum(serialize = "R")]
    RegisterOrMemory,
    /// A 64-bit literal (`C`)
    #[strum(serialize = "C")]
    Constant,
    /// A 32-bit code address, in bits from the start of the code segment (`L`)
    #[strum(serialize = "L")]
    Label,
}

/// Width of a memory access
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum AccessSize {
    Byte = 0,
    Word = 1,
    Dword = 2,
    Qword = 3,
}

impl AccessSize {
    /// Maps a 2-bit size tag to the access size; higher bits are ignored.
    #[must_use]
    pub fn from_tag(tag: u8) -> AccessSize {
        match tag & 0b11 {
            0 => AccessSize::Byte,
            1 => AccessSize::Word,
            2 => AccessSize::Dword,
            _ => AccessSize::Qword,
        }
    }
}

/// An entry of the opcode table
#[derive(Debug, PartialEq, Eq)]
pub struct OpCode {
    /// The mnemonic of the instruction
    pub mnemonic: Mnemonic,
    /// The opcode bits, right-aligned
    pub code: u8,
    /// Number of bits in `code`
    pub length: u8,
    /// Operand encodings, in stream order
    pub operands: &'static [OperandKind],
}

impl OpCode {
    /// Returns `true` if this entry is the opcode `code` of `width` bits.
    #[must_use]
    pub fn matches(&self, code: u8, width: u8) -> bool {
        self.length == width && self.code == code
    }

    /// Looks up the entry for `code` of `width` bits.
    #[must_use]
    pub fn lookup(code: u8, width: u8) -> Option<&'static OpCode> {
        INSTRUCTIONS.iter().find(|op| op.matches(code, width))
    }

    /// Returns the opcode bits as a binary string, e.g. `"010001"`.
    #[must_use]
    pub fn pattern(&self) -> String {
        format!("{:0width$b}", self.code, width = self.length as usize)
    }

    /// Returns `true` if the bit pattern of `self` is a prefix of the pattern of `other`.
    fn is_prefix_of(&self, other: &OpCode) -> bool {
        self.length <= other.length && other.code >> (other.length - self.length) == self.code
    }
}

const RR: &[OperandKind] = &[OperandKind::RegisterOrMemory, OperandKind::RegisterOrMemory];
const RRR: &[OperandKind] = &[
    OperandKind::RegisterOrMemory,
    OperandKind::RegisterOrMemory,
    OperandKind::RegisterOrMemory,
];
const RRRR: &[OperandKind] = &[
    OperandKind::RegisterOrMemory,
    OperandKind::RegisterOrMemory,
    OperandKind::RegisterOrMemory,
    OperandKind::RegisterOrMemory,
];
const R: &[OperandKind] = &[OperandKind::RegisterOrMemory];
const CR: &[OperandKind] = &[OperandKind::Constant, OperandKind::RegisterOrMemory];
const L: &[OperandKind] = &[OperandKind::Label];
const LR: &[OperandKind] = &[OperandKind::Label, OperandKind::RegisterOrMemory];
const LRR: &[OperandKind] = &[
    OperandKind::Label,
    OperandKind::RegisterOrMemory,
    OperandKind::RegisterOrMemory,
];
const NONE: &[OperandKind] = &[];

macro_rules! op {
    ($mnemonic:ident, $code:literal, $length:literal, $operands:expr) => {
        OpCode {
            mnemonic: Mnemonic::$mnemonic,
            code: $code,
            length: $length,
            operands: $operands,
        }
    };
}

/// All ESET-VM2 instructions
pub const INSTRUCTIONS: [OpCode; 22] = [
    op!(Mov, 0b000, 3, RR),
    op!(LoadConst, 0b001, 3, CR),
    op!(Add, 0b010001, 6, RRR),
    op!(Sub, 0b010010, 6, RRR),
    op!(Div, 0b010011, 6, RRR),
    op!(Mod, 0b010100, 6, RRR),
    op!(Mul, 0b010101, 6, RRR),
    op!(Compare, 0b01100, 5, RRR),
    op!(Jump, 0b01101, 5, L),
    op!(JumpEqual, 0b01110, 5, LRR),
    op!(Read, 0b10000, 5, RRRR),
    op!(Write, 0b10001, 5, RRR),
    op!(ConsoleRead, 0b10010, 5, R),
    op!(ConsoleWrite, 0b10011, 5, R),
    op!(CreateThread, 0b10100, 5, LR),
    op!(JoinThread, 0b10101, 5, R),
    op!(Hlt, 0b10110, 5, NONE),
    op!(Sleep, 0b10111, 5, R),
    op!(Call, 0b1100, 4, L),
    op!(Ret, 0b1101, 4, NONE),
    op!(Lock, 0b1110, 4, R),
    op!(Unlock, 0b1111, 4, R),
];

fn check_table(table: &[OpCode]) -> std::result::Result<(), String> {
    for (index, op) in table.iter().enumerate() {
        if !(MIN_CODE_BITS..=MAX_CODE_BITS).contains(&op.length) {
            return Err(format!(
                "{} has a code length of {} bits",
                op.mnemonic, op.length
            ));
        }

        if u32::from(op.code) >> op.length != 0 {
            return Err(format!(
                "{} code {:#b} does not fit into {} bits",
                op.mnemonic, op.code, op.length
            ));
        }

        for other in &table[index + 1..] {
            if op.is_prefix_of(other) || other.is_prefix_of(op) {
                return Err(format!(
                    "{} ({}) and {} ({}) are not prefix-free",
                    op.mnemonic,
                    op.pattern(),
                    other.mnemonic,
                    other.pattern()
                ));
            }
        }
    }

    Ok(())
}

/// Checks that every entry of `table` fits the code widths and that no entry's bit pattern
/// is a prefix of another's.
///
/// # Errors
/// Returns [`crate::Error::InvalidOpcodeTable`] naming the first offending entry.
///
/// # Examples
///
/// ```rust
/// use esetvm::disassembler::{verify_table, INSTRUCTIONS};
///
/// assert!(verify_table(&INSTRUCTIONS).is_ok());
/// ```
pub fn verify_table(table: &[OpCode]) -> Result<()> {
    check_table(table).map_err(InvalidOpcodeTable)
}

/// Checks [`INSTRUCTIONS`] once per process and returns the cached outcome.
///
/// # Errors
/// Returns [`crate::Error::InvalidOpcodeTable`] if the built-in table is not prefix-free.
pub fn verify_instructions() -> Result<()> {
    static VERIFIED: OnceLock<std::result::Result<(), String>> = OnceLock::new();

    VERIFIED
        .get_or_init(|| {
            let result = check_table(&INSTRUCTIONS);
            if let Err(message) = &result {
                warn!("Opcode table self-check failed: {message}");
            }
            result
        })
        .clone()
        .map_err(InvalidOpcodeTable)
}
