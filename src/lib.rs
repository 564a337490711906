// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory and opts back in locally

//! # esetvm
//!
//! A disassembler for ESET-VM2 bytecode programs.
//!
//! ESET-VM2 code is bit-packed: instructions start at arbitrary bit offsets, opcodes are
//! prefix-free codes of 3 to 6 bits, and operand fields are stored least-significant-bit
//! first. `esetvm` decodes such a code segment into labeled assembly text that can be fed
//! back into the ESET-VM2 assembler.
//!
//! ## Features
//!
//! - **Bit-granular reading** - [`BitReader`] extracts fields of 1 to 8 bits in natural or
//!   bit-reversed order, and bit-reversed 8 to 64 bit fields, with a sticky end-of-stream state
//! - **Prefix-free opcode decoding** - one bit at a time against a compile-time opcode table
//!   that is self-checked at startup
//! - **Labeled listings** - every jump or call target that starts an instruction receives an
//!   `addr<N>:` label
//! - **Container support** - `ESET-VM2` header validation, `.dataSize` and `.data` preamble
//! - **Parallel batch mode** - independent programs are disassembled concurrently
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use esetvm::Program;
//! use std::path::Path;
//!
//! let program = Program::from_file(Path::new("program.evm"))?;
//! print!("{}", program.to_listing()?);
//! # Ok::<(), esetvm::Error>(())
//! ```
//!
//! ### Disassembling a raw code segment
//!
//! ```rust
//! use esetvm::{BitReader, Decoder};
//!
//! let code = [0b0100_0101, 0b0001_0101, 0b0001_1000];
//! let mut decoder = Decoder::new(BitReader::new(&code));
//!
//! let mut listing = Vec::new();
//! decoder.parse(&mut listing)?;
//! assert_eq!(listing, b".code\n\tadd r1, dword[r2], r3\n");
//! # Ok::<(), esetvm::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - container loading, the byte [`Parser`] and the [`BitReader`]
//! - [`disassembler`] - opcode table, instruction decoding and listing output
//! - [`Program`] - high-level entry point producing complete listings
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade. Discarded trailing instructions and decode
//! summaries are reported at `debug` level, every decoded instruction at `trace` level.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use esetvm::prelude::*;
///
/// let program = Program::from_file("program.evm".as_ref())?;
/// let listing = program.to_listing()?;
/// # Ok::<(), esetvm::Error>(())
/// ```
pub mod prelude;

/// Container access and bit-level input streams.
///
/// - [`file::File`] - a loaded `ESET-VM2` container with its validated [`file::Header`]
/// - [`file::parser::Parser`] - little-endian byte reader used for the header
/// - [`file::bitreader::BitReader`] - bit-granular reader used for the code segment
pub mod file;

/// Instruction decoding and disassembly of ESET-VM2 bytecode.
///
/// # Key Types
///
/// - [`disassembler::Decoder`] - Decodes a whole code segment and renders the listing
/// - [`disassembler::Instruction`] - A decoded instruction
/// - [`disassembler::Operand`] - A decoded operand (register, memory, constant, label)
/// - [`disassembler::OpCode`] - An entry of the opcode table [`disassembler::INSTRUCTIONS`]
///
/// # Main Functions
///
/// - [`disassembler::decode_instruction`] - Decode a single instruction
/// - [`disassembler::decode_stream`] - Decode a whole code segment
/// - [`disassembler::write_listing`] - Render decoded instructions with labels
///
/// # Examples
///
/// ```rust
/// use esetvm::{disassembler::decode_instruction, BitReader};
///
/// let code = [0b1101_0000]; // ret
/// let mut reader = BitReader::new(&code);
/// let instruction = decode_instruction(&mut reader)?.unwrap();
/// assert_eq!(instruction.to_string(), "ret");
/// # Ok::<(), esetvm::Error>(())
/// ```
pub mod disassembler;

mod program;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust,no_run
/// use esetvm::{Program, Result};
///
/// fn load_program(path: &str) -> Result<Program> {
///     Program::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Example
///
/// ```rust,no_run
/// use esetvm::{Error, Program};
/// match Program::from_file(std::path::Path::new("program.evm")) {
///     Ok(program) => println!("Loaded successfully"),
///     Err(Error::NotSupported) => println!("Not an ESET-VM2 program"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::{Error, ErrorStatus};

/// Main entry point for working with ESET-VM2 programs.
pub use program::{disassemble_files, process_files, Program};

/// Decoding engine and its configuration.
pub use disassembler::{Decoder, DecoderConfig, TruncationPolicy};

/// Low-level file and bit stream parsing utilities.
///
/// # Example
///
/// ```rust
/// use esetvm::{BitOrder, BitReader};
///
/// let data = [0x11, 0x02, 0xFF];
/// let mut reader = BitReader::new(&data);
/// assert_eq!(reader.read_bits::<1>(BitOrder::Natural), 0);
/// assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 1);
/// assert_eq!(reader.position(), 4);
/// ```
pub use file::{
    bitreader::{BitOrder, BitReader},
    parser::Parser,
    File, Header,
};
