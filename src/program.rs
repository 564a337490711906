//! High-level entry point for disassembling complete ESET-VM2 programs.
//!
//! A [`Program`] combines a loaded [`File`] with a [`DecoderConfig`] and produces the full
//! listing of the program: the `.dataSize` directive, the `.data` section with the initial
//! data, and the `.code` section.
//!
//! # Examples
//!
//! ```rust
//! use esetvm::Program;
//!
//! let mut image = b"ESET-VM2".to_vec();
//! image.extend_from_slice(&1u32.to_le_bytes()); // code size
//! image.extend_from_slice(&8u32.to_le_bytes()); // data size
//! image.extend_from_slice(&2u32.to_le_bytes()); // initial data size
//! image.push(0b1011_0000); // hlt
//! image.extend_from_slice(&[0xCA, 0xFE]);
//!
//! let program = Program::from_mem(image)?;
//! assert_eq!(
//!     program.to_listing()?,
//!     ".dataSize 8\n.data\nca fe\n.code\n\thlt\n"
//! );
//! # Ok::<(), esetvm::Error>(())
//! ```

use std::{io::Write, path::Path};

use log::debug;
use rayon::prelude::*;

use crate::{
    disassembler::{write_data_section, write_listing, Decoder, DecoderConfig},
    file::{bitreader::BitReader, File},
    Result,
};

/// A loaded ESET-VM2 program, ready to be disassembled
pub struct Program {
    file: File,
    config: DecoderConfig,
}

impl Program {
    /// Loads a program from disk.
    ///
    /// # Errors
    /// Returns the errors of [`File::from_file`].
    pub fn from_file(path: &Path) -> Result<Program> {
        debug!("Loading {}", path.display());

        Ok(Program {
            file: File::from_file(path)?,
            config: DecoderConfig::default(),
        })
    }

    /// Loads a program from a memory buffer.
    ///
    /// # Errors
    /// Returns the errors of [`File::from_mem`].
    pub fn from_mem(data: Vec<u8>) -> Result<Program> {
        Ok(Program {
            file: File::from_mem(data)?,
            config: DecoderConfig::default(),
        })
    }

    /// Replaces the decoder configuration
    #[must_use]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying container
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    /// The active decoder configuration
    #[must_use]
    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    /// Creates a decoder over the code segment of this program
    #[must_use]
    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::with_config(BitReader::new(self.file.code()), self.config)
    }

    /// Writes the complete listing of the program to `sink`.
    ///
    /// The code segment is decoded before anything is written, so a format error leaves
    /// `sink` untouched.
    ///
    /// # Errors
    /// Returns the decoding errors of [`Decoder::decode_all`], or
    /// [`crate::Error::FileError`] if writing fails.
    pub fn disassemble<W: Write + ?Sized>(&self, sink: &mut W) -> Result<()> {
        let mut decoder = self.decoder();
        decoder.decode_all()?;

        let header = self.file.header();
        write_data_section(sink, header.data_size, self.file.initial_data())?;
        write_listing(sink, decoder.instructions(), decoder.jump_targets())
    }

    /// Returns the complete listing of the program as a string.
    ///
    /// # Errors
    /// Returns the decoding errors of [`Decoder::decode_all`].
    pub fn to_listing(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.disassemble(&mut buffer)?;

        into_string(buffer)
    }

    /// Returns the `.code` section of the program only, without the data preamble.
    ///
    /// # Errors
    /// Returns the decoding errors of [`Decoder::decode_all`].
    pub fn to_code_listing(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.decoder().parse(&mut buffer)?;

        into_string(buffer)
    }
}

fn into_string(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).map_err(|error| crate::Error::Error(error.to_string()))
}

/// Loads several programs and runs `f` on each of them in parallel.
///
/// Every program is loaded with `config`. Results are returned in the order of `paths`;
/// a program that fails to load or to process does not affect the others.
///
/// # Examples
///
/// ```rust,no_run
/// use esetvm::{process_files, DecoderConfig, Program};
///
/// let paths = ["a.evm", "b.evm"];
/// let code = process_files(&paths, DecoderConfig::default(), Program::to_code_listing);
/// assert_eq!(code.len(), 2);
/// ```
pub fn process_files<P, T, F>(paths: &[P], config: DecoderConfig, f: F) -> Vec<Result<T>>
where
    P: AsRef<Path> + Sync,
    T: Send,
    F: Fn(&Program) -> Result<T> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let program = Program::from_file(path.as_ref())?.with_config(config);
            f(&program)
        })
        .collect()
}

/// Disassembles several programs in parallel into complete listings.
///
/// Results are returned in the order of `paths`; a failing program does not affect the
/// others. See [`process_files`] for other per-program operations.
///
/// # Examples
///
/// ```rust,no_run
/// use esetvm::{disassemble_files, DecoderConfig};
/// use std::path::PathBuf;
///
/// let paths = vec![PathBuf::from("a.evm"), PathBuf::from("b.evm")];
/// for (path, listing) in paths.iter().zip(disassemble_files(&paths, DecoderConfig::default())) {
///     match listing {
///         Ok(text) => print!("{text}"),
///         Err(error) => eprintln!("{}: {error}", path.display()),
///     }
/// }
/// ```
pub fn disassemble_files<P: AsRef<Path> + Sync>(
    paths: &[P],
    config: DecoderConfig,
) -> Vec<Result<String>> {
    process_files(paths, config, Program::to_listing)
}
