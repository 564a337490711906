//! ESET-VM2 disassembler and instruction decoding engine.
//!
//! This module turns the bit-packed code segment of an ESET-VM2 program into assembly text.
//! Decoding is a linear sweep: instructions are decoded back to back from the first bit
//! until the stream is exhausted, collecting the targets of all label operands on the way.
//! The listing is rendered afterwards, with an `addr<N>:` label before every instruction
//! that is a jump or call target.
//!
//! # Key Types
//! - [`Decoder`] - Decodes a code segment and renders its listing
//! - [`Instruction`] - A decoded instruction
//! - [`Operand`] - Instruction operands (registers, memory, constants, labels)
//! - [`OpCode`] - An entry of the opcode table [`INSTRUCTIONS`]
//! - [`DecoderConfig`] - Decoding options
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a whole code segment
//! - [`write_listing`] - Render decoded instructions with labels
//!
//! # Example
//! ```rust
//! use esetvm::{disassembler::decode_instruction, BitReader};
//!
//! let code = [0b1100_0000, 0x00, 0x00, 0x00, 0x00]; // call addr0
//! let mut reader = BitReader::new(&code);
//! let instruction = decode_instruction(&mut reader)?.unwrap();
//! assert_eq!(instruction.to_string(), "call addr0");
//! # Ok::<(), esetvm::Error>(())
//! ```

mod config;
mod decoder;
mod instruction;
mod instructions;
mod listing;
mod targets;

pub use config::{DecoderConfig, TruncationPolicy};
pub use decoder::{decode_instruction, decode_stream, Decoder};
pub use instruction::{Instruction, Operand, LABEL_PREFIX};
pub use instructions::*;
pub use listing::{write_data_section, write_listing};
pub use targets::JumpTargets;
