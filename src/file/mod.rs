//! ESET-VM2 container access and bit-level input streams.
//!
//! An ESET-VM2 program is a small container: a 20 byte [`Header`], followed by the
//! bit-packed code segment and the initial contents of the data segment. This module
//! loads such containers from disk or memory and validates their layout before any
//! decoding takes place.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - A loaded, validated container
//! - [`crate::file::Backend`] - Trait for the data sources (memory-mapped files, buffers)
//! - [`crate::file::parser::Parser`] - Little-endian byte cursor used for the header
//! - [`crate::file::bitreader::BitReader`] - Bit-granular reader used for the code segment
//! - [`crate::file::io`] - Primitive little-endian reads
//!
//! # Examples
//!
//! ```rust
//! use esetvm::File;
//!
//! let mut image = b"ESET-VM2".to_vec();
//! image.extend_from_slice(&1u32.to_le_bytes()); // code size
//! image.extend_from_slice(&64u32.to_le_bytes()); // data size
//! image.extend_from_slice(&0u32.to_le_bytes()); // initial data size
//! image.push(0b1101_0000); // ret
//!
//! let file = File::from_mem(image)?;
//! assert_eq!(file.header().data_size, 64);
//! assert_eq!(file.code(), &[0b1101_0000]);
//! assert!(file.initial_data().is_empty());
//! # Ok::<(), esetvm::Error>(())
//! ```

pub mod bitreader;
pub mod io;
pub mod parser;

mod header;
mod memory;
mod physical;

pub use header::{Header, HEADER_SIZE, MAGIC};

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;
use std::path::Path;

/// Backend trait for file data sources.
///
/// Abstracts over where the program image lives, so that both memory-mapped files and
/// in-memory buffers can be decoded the same way. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded ESET-VM2 program container.
///
/// Construction validates the magic and checks that the code segment and the initial data
/// declared by the header are fully present, so the accessors below cannot fail.
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed container header
    header: Header,
}

impl File {
    /// Loads a program from the given path.
    ///
    /// The file is memory-mapped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or opened
    /// - The file is empty
    /// - The file does not start with the `ESET-VM2` magic
    /// - The header declares more code or initial data than the file contains
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a program from a memory buffer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`File::from_file`], minus the I/O errors.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let header = Header::parse(data.data())?;

        if header.declared_len() > data.len() as u64 {
            return Err(malformed_error!(
                "Header declares {} bytes of code and {} bytes of initial data, but the file only holds {} bytes after the header",
                header.code_size,
                header.initial_data_size,
                data.len().saturating_sub(HEADER_SIZE)
            ));
        }

        Ok(File {
            data: Box::new(data),
            header,
        })
    }

    /// Returns the parsed container header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the bit-packed code segment.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.data.data()[self.header.code_range()]
    }

    /// Returns the initial contents of the data segment.
    #[must_use]
    pub fn initial_data(&self) -> &[u8] {
        &self.data.data()[self.header.initial_data_range()]
    }

    /// Returns the total size of the container in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the container has a length of zero.
    ///
    /// Never true for a successfully loaded file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
}
