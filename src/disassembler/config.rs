//! Decoder configuration
//!
//! Controls how the decoder treats an instruction that is cut off by the end of the code
//! segment, and whether the opcode table is self-checked before decoding.

/// What to do with an instruction whose opcode decoded but whose operands run past the end
/// of the code segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Drop the partial instruction and finish cleanly.
    ///
    /// Code segments are padded to whole bytes, and zero padding bits form the prefix of a
    /// `mov`, so a trailing partial instruction is expected in well-formed programs.
    #[default]
    Discard,
    /// Report [`crate::Error::Truncated`]
    Error,
}

/// Configuration for a [`crate::disassembler::Decoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Handling of a trailing instruction that is cut off by the end of the stream
    pub truncation: TruncationPolicy,

    /// Check that the opcode table is prefix-free before the first decode.
    /// The result is cached for the lifetime of the process.
    pub verify_table: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            truncation: TruncationPolicy::Discard,
            verify_table: true,
        }
    }
}

impl DecoderConfig {
    /// Creates a configuration that produces the same listings as the reference ESET-VM2
    /// disassembler: partial trailing instructions are dropped, no table check
    #[must_use]
    pub fn compatible() -> Self {
        Self {
            truncation: TruncationPolicy::Discard,
            verify_table: false,
        }
    }

    /// Creates a configuration that rejects every stream that does not end on an
    /// instruction boundary
    #[must_use]
    pub fn strict() -> Self {
        Self {
            truncation: TruncationPolicy::Error,
            verify_table: true,
        }
    }
}
