use strum::{Display, EnumIter, FromRepr};
use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two classes, mirrored by [`ErrorStatus`]:
///
/// ## Format Errors
/// - [`Error::UnknownOpcode`] - No opcode matched any prefix up to the maximum code width
/// - [`Error::Truncated`] - An instruction's operands run past the end of the code segment
///   (only reported with [`crate::TruncationPolicy::Error`])
///
/// ## Input Errors
/// - [`Error::NotSupported`] - The container does not carry the `ESET-VM2` magic
/// - [`Error::Malformed`] - Header sizes are inconsistent with the container
/// - [`Error::OutOfBounds`] - Attempted to read beyond the input
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::FileError`] - Filesystem I/O errors, including failing output sinks
/// - [`Error::InvalidOpcodeTable`] - The opcode table failed its self-check
///
/// Exhausting the bit stream between two instructions is not an error; it is how the
/// decoder learns that the program has ended.
///
/// # Examples
///
/// ```rust,no_run
/// use esetvm::{Error, Program};
/// use std::path::Path;
///
/// match Program::from_file(Path::new("program.evm")) {
///     Ok(program) => {
///         println!("code segment: {} bytes", program.file().code().len());
///     }
///     Err(Error::NotSupported) => {
///         eprintln!("Not an ESET-VM2 program");
///     }
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed file: {} ({}:{})", message, file, line);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No entry of the opcode table matched the bits at an instruction boundary.
    ///
    /// The decoder extends its candidate one bit at a time from the minimum to the
    /// maximum code width; this error carries the final candidate.
    ///
    /// # Fields
    ///
    /// * `code` - The unmatched candidate, right-aligned
    /// * `width` - The number of bits in `code`
    /// * `position` - Bit offset of the instruction that failed to decode
    #[error("Unknown instruction code {code:#04x} ({width} bits) at bit {position}")]
    UnknownOpcode {
        /// The unmatched candidate code
        code: u8,
        /// Bit width of the candidate
        width: u8,
        /// Bit offset at which the instruction started
        position: usize,
    },

    /// The code segment ended inside the operands of an instruction.
    #[error("Instruction at bit {position} is truncated by the end of the code segment")]
    Truncated {
        /// Bit offset at which the truncated instruction started
        position: usize,
    },

    /// The file is damaged and could not be parsed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input does not start with the `ESET-VM2` magic.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps errors of the input file as well as of the sink a listing is written to.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures, such as a failed memory mapping.
    #[error("{0}")]
    Error(String),

    /// The opcode table is not prefix-free or contains an entry outside the code widths.
    #[error("Invalid opcode table - {0}")]
    InvalidOpcodeTable(String),
}

impl Error {
    /// Classifies this error into the status reported to callers and mapped to exit codes.
    #[must_use]
    pub fn status(&self) -> ErrorStatus {
        match self {
            Error::UnknownOpcode { .. } | Error::Truncated { .. } => ErrorStatus::FormatError,
            _ => ErrorStatus::InputError,
        }
    }
}

/// Outcome classification of a disassembly run.
///
/// The numeric value of each variant is the process exit code used by the command line
/// driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum ErrorStatus {
    /// Decoding finished on a clean end of stream
    #[default]
    #[strum(serialize = "no error")]
    NoError = 0,
    /// The bytecode could not be decoded
    #[strum(serialize = "format error")]
    FormatError = 1,
    /// The container could not be read or validated
    #[strum(serialize = "input error")]
    InputError = 2,
}

impl ErrorStatus {
    /// Returns the process exit code for this status.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }
}
