//! # esetvm Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the esetvm library. Import this module to get quick access to the essential
//! types for disassembling ESET-VM2 programs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all esetvm operations
pub use crate::Error;

/// Outcome classification of a disassembly run
pub use crate::ErrorStatus;

/// The result type used throughout esetvm
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for complete program listings
pub use crate::{disassemble_files, process_files, Program};

/// Container access
pub use crate::{File, Header};

/// Low-level parsing utilities
pub use crate::{BitOrder, BitReader, Parser};

// ================================================================================================
// Disassembler
// ================================================================================================

/// Decoding engine and its configuration
pub use crate::disassembler::{Decoder, DecoderConfig, TruncationPolicy};

/// Decoded instructions
pub use crate::disassembler::{AccessSize, Instruction, JumpTargets, Mnemonic, Operand};

/// Opcode table
pub use crate::disassembler::{OpCode, OperandKind, INSTRUCTIONS};

/// Free decoding functions
pub use crate::disassembler::{decode_instruction, decode_stream, write_listing};
