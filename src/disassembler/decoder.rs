//! ESET-VM2 instruction decoding.
//!
//! Decoding is a single linear pass over the code segment. Each instruction starts with a
//! prefix-free opcode, which is matched by reading [`MIN_CODE_BITS`] bits and extending the
//! candidate one bit at a time up to [`MAX_CODE_BITS`]. The operands follow immediately,
//! without any alignment. The pass ends when the stream is exhausted at an instruction
//! boundary.
//!
//! # Example: Decoding a Single Instruction
//!
//! ```rust
//! use esetvm::{disassembler::decode_instruction, BitReader};
//!
//! let code = [0b1011_0000]; // hlt
//! let mut reader = BitReader::new(&code);
//!
//! let instruction = decode_instruction(&mut reader)?.unwrap();
//! assert_eq!(instruction.to_string(), "hlt");
//! assert_eq!(instruction.size, 5);
//!
//! // Three padding bits are left, not enough for an opcode
//! assert!(decode_instruction(&mut reader)?.is_none());
//! # Ok::<(), esetvm::Error>(())
//! ```
//!
//! # Example: Decoding a Code Segment
//!
//! ```rust
//! use esetvm::disassembler::decode_stream;
//!
//! let instructions = decode_stream(&[0b0100_0101, 0b0001_0101, 0b0001_1000])?;
//! assert_eq!(instructions.len(), 1);
//! assert_eq!(instructions[0].to_string(), "add r1, dword[r2], r3");
//! # Ok::<(), esetvm::Error>(())
//! ```

use std::io::Write;

use log::{debug, trace};

use crate::{
    disassembler::{
        listing::write_listing, verify_instructions, AccessSize, DecoderConfig, Instruction,
        JumpTargets, OpCode, Operand, OperandKind, TruncationPolicy, MAX_CODE_BITS,
        MIN_CODE_BITS,
    },
    file::bitreader::{BitOrder, BitReader},
    Error::{Truncated, UnknownOpcode},
    ErrorStatus, Result,
};

/// Outcome of decoding at one instruction boundary
enum Step {
    /// A complete instruction
    Decoded(Instruction),
    /// The opcode matched, but the stream ended inside the operands
    Truncated { address: usize, opcode: &'static OpCode },
    /// The stream ended before an opcode could be matched
    End,
}

/// Decodes the code segment behind a [`BitReader`] and renders it as a labeled listing.
///
/// The decoder owns the reader, the decoded instructions and the collected jump targets.
/// Decoding runs to completion before anything is rendered, so a format error never leaves
/// a partial listing in the output.
///
/// # Examples
///
/// ```rust
/// use esetvm::{BitReader, Decoder, ErrorStatus};
///
/// let code = [0b1011_0000]; // hlt
/// let mut decoder = Decoder::new(BitReader::new(&code));
///
/// let mut listing = Vec::new();
/// decoder.parse(&mut listing)?;
///
/// assert_eq!(listing, b".code\n\thlt\n");
/// assert_eq!(decoder.error_status(), ErrorStatus::NoError);
/// # Ok::<(), esetvm::Error>(())
/// ```
pub struct Decoder<'a> {
    reader: BitReader<'a>,
    config: DecoderConfig,
    instructions: Vec<Instruction>,
    targets: JumpTargets,
    status: ErrorStatus,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder with the default configuration
    ///
    /// ## Arguments
    /// * 'reader' - The bit stream over the code segment
    #[must_use]
    pub fn new(reader: BitReader<'a>) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    /// Create a new decoder
    ///
    /// ## Arguments
    /// * 'reader' - The bit stream over the code segment
    /// * 'config' - Decoding options
    #[must_use]
    pub fn with_config(reader: BitReader<'a>, config: DecoderConfig) -> Self {
        Decoder {
            reader,
            config,
            instructions: Vec::new(),
            targets: JumpTargets::new(),
            status: ErrorStatus::NoError,
        }
    }

    /// Decodes the whole code segment and writes the listing to `sink`.
    ///
    /// The output starts with `.code`, followed by one tab-indented line per instruction.
    /// Instructions that are the target of a jump or call are preceded by an
    /// `addr<bit offset>:` label line.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownOpcode`] if an instruction boundary holds no valid
    /// opcode, [`crate::Error::Truncated`] for a partial trailing instruction under
    /// [`TruncationPolicy::Error`], and [`crate::Error::FileError`] if writing to `sink`
    /// fails. Nothing is written for format errors.
    pub fn parse<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<()> {
        self.decode_all()?;

        let result = write_listing(sink, &self.instructions, &self.targets);
        self.status = match &result {
            Ok(()) => ErrorStatus::NoError,
            Err(error) => error.status(),
        };
        result
    }

    /// Status of the last [`Decoder::parse`] or [`Decoder::decode_all`] call.
    #[must_use]
    pub fn error_status(&self) -> ErrorStatus {
        self.status
    }

    /// Decodes the whole code segment without rendering it.
    ///
    /// Decoding always starts from the first bit, so calling this again yields the same
    /// instructions. A failed run leaves no instructions and no jump targets behind.
    ///
    /// # Errors
    /// Same as [`Decoder::parse`], minus output errors.
    pub fn decode_all(&mut self) -> Result<()> {
        let result = self.run();
        self.status = match &result {
            Ok(()) => ErrorStatus::NoError,
            Err(error) => {
                self.instructions.clear();
                self.targets = JumpTargets::new();
                self.targets.seal();
                error.status()
            }
        };
        result
    }

    /// Instructions decoded by the last run, in stream order; empty if it failed
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Jump and call targets referenced by the decoded instructions; empty if the last run
    /// failed
    #[must_use]
    pub fn jump_targets(&self) -> &JumpTargets {
        &self.targets
    }

    /// Consumes the decoder and returns ownership of the decoded instructions.
    #[must_use]
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    fn run(&mut self) -> Result<()> {
        if self.config.verify_table {
            verify_instructions()?;
        }

        self.reader.reset();
        self.instructions.clear();
        self.targets = JumpTargets::new();

        loop {
            match decode_step(&mut self.reader)? {
                Step::Decoded(instruction) => {
                    trace!("{:>8}: {}", instruction.address, instruction);

                    for target in instruction.targets() {
                        self.targets.push(target);
                    }
                    self.instructions.push(instruction);
                }
                Step::Truncated { address, opcode } => match self.config.truncation {
                    TruncationPolicy::Discard => {
                        debug!(
                            "Discarding truncated {} at bit {} ({} bits of code)",
                            opcode.mnemonic,
                            address,
                            self.reader.len_bits()
                        );
                        break;
                    }
                    TruncationPolicy::Error => return Err(Truncated { position: address }),
                },
                Step::End => break,
            }
        }

        self.targets.seal();

        debug!(
            "Decoded {} instructions with {} jump targets from {} bits",
            self.instructions.len(),
            self.targets.len(),
            self.reader.len_bits()
        );

        Ok(())
    }
}

/// Decodes a whole code segment with the default configuration.
///
/// A partial instruction at the end of the segment is dropped.
///
/// # Errors
/// Returns [`crate::Error::UnknownOpcode`] if an instruction boundary holds no valid opcode.
pub fn decode_stream(data: &[u8]) -> Result<Vec<Instruction>> {
    let mut decoder = Decoder::new(BitReader::new(data));
    decoder.decode_all()?;

    Ok(decoder.into_instructions())
}

/// Decodes the instruction at the current position of `reader`.
///
/// Returns `Ok(None)` if the stream ends before an opcode could be matched, which is the
/// regular end of a program.
///
/// # Errors
/// Returns [`crate::Error::UnknownOpcode`] if no opcode matches, and
/// [`crate::Error::Truncated`] if the stream ends inside the operands.
pub fn decode_instruction(reader: &mut BitReader) -> Result<Option<Instruction>> {
    match decode_step(reader)? {
        Step::Decoded(instruction) => Ok(Some(instruction)),
        Step::Truncated { address, .. } => Err(Truncated { position: address }),
        Step::End => Ok(None),
    }
}

fn decode_step(reader: &mut BitReader) -> Result<Step> {
    let address = reader.position();

    let Some(opcode) = decode_opcode(reader)? else {
        return Ok(Step::End);
    };

    let operands = opcode
        .operands
        .iter()
        .map(|kind| decode_operand(reader, *kind))
        .collect::<Vec<_>>();

    if reader.is_exhausted() {
        return Ok(Step::Truncated { address, opcode });
    }

    Ok(Step::Decoded(Instruction {
        address,
        size: reader.position() - address,
        opcode,
        operands,
    }))
}

fn decode_opcode(reader: &mut BitReader) -> Result<Option<&'static OpCode>> {
    let position = reader.position();
    let mut code = reader.read_bits::<{ MIN_CODE_BITS as u32 }>(BitOrder::Natural);
    let mut width = MIN_CODE_BITS;

    loop {
        if reader.is_exhausted() {
            return Ok(None);
        }

        if let Some(opcode) = OpCode::lookup(code, width) {
            return Ok(Some(opcode));
        }

        if width == MAX_CODE_BITS {
            return Err(UnknownOpcode {
                code,
                width,
                position,
            });
        }

        code = (code << 1) | reader.read_bit();
        width += 1;
    }
}

fn decode_operand(reader: &mut BitReader, kind: OperandKind) -> Operand {
    match kind {
        OperandKind::RegisterOrMemory => {
            if reader.read_bit() == 1 {
                let size = AccessSize::from_tag(reader.read_bits::<2>(BitOrder::Reversed));
                let base = reader.read_bits::<4>(BitOrder::Reversed);
                Operand::Memory { size, base }
            } else {
                Operand::Register(reader.read_bits::<4>(BitOrder::Reversed))
            }
        }
        OperandKind::Constant => Operand::Constant(reader.read_wide::<u64>()),
        OperandKind::Label => Operand::Label(reader.read_wide::<u32>()),
    }
}
