//! The fixed-size header of an ESET-VM2 program container.

use crate::{file::parser::Parser, Error::NotSupported, Result};

/// Magic bytes every ESET-VM2 container starts with
pub const MAGIC: [u8; 8] = *b"ESET-VM2";

/// Size of the header in bytes: magic plus three `u32` size fields
pub const HEADER_SIZE: usize = 20;

/// Header of an ESET-VM2 program.
///
/// The header is followed by `code_size` bytes of bit-packed code and `initial_data_size`
/// bytes of initial data. `data_size` is the size of the data segment the VM allocates at
/// runtime and does not occupy space in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Size of the code segment in bytes
    pub code_size: u32,
    /// Size of the runtime data segment in bytes
    pub data_size: u32,
    /// Number of bytes the data segment is initialised with
    pub initial_data_size: u32,
}

impl Header {
    /// Parses the header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] if the magic does not match, or
    /// [`crate::Error::OutOfBounds`] if `data` is shorter than [`HEADER_SIZE`].
    pub fn parse(data: &[u8]) -> Result<Header> {
        let mut parser = Parser::new(data);

        if parser.read_bytes(MAGIC.len())? != MAGIC {
            return Err(NotSupported);
        }

        Ok(Header {
            code_size: parser.read_le::<u32>()?,
            data_size: parser.read_le::<u32>()?,
            initial_data_size: parser.read_le::<u32>()?,
        })
    }

    /// Byte range of the code segment within the container.
    #[must_use]
    pub fn code_range(&self) -> std::ops::Range<usize> {
        HEADER_SIZE..HEADER_SIZE + self.code_size as usize
    }

    /// Byte range of the initial data within the container.
    #[must_use]
    pub fn initial_data_range(&self) -> std::ops::Range<usize> {
        let start = self.code_range().end;
        start..start + self.initial_data_size as usize
    }

    /// Total number of bytes the header declares, including the header itself.
    #[must_use]
    pub fn declared_len(&self) -> u64 {
        HEADER_SIZE as u64 + u64::from(self.code_size) + u64::from(self.initial_data_size)
    }
}
