//! Memory-mapped file backend.
//!
//! [`crate::file::physical::Physical`] maps a program file from disk into the address space
//! instead of reading it into a buffer. The code segment is then decoded straight from the
//! mapping.

use super::Backend;
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O to access program files on disk.
///
/// All access operations are bounds checked.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the program on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        // Read-only mapping, the file must not be truncated while it is mapped
        #[allow(unsafe_code)]
        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("esetvm_{}_{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn physical() {
        let path = temp_file("physical.evm", b"ESET-VM2\x02\x00\x00\x00");
        let physical = Physical::new(&path).unwrap();

        assert_eq!(physical.len(), 12);
        assert_eq!(&physical.data()[..8], b"ESET-VM2");
        assert_eq!(physical.data()[8], 0x02);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn invalid_file_path() {
        let result = Physical::new(PathBuf::from("/nonexistent/path/to/program.evm"));
        match result.unwrap_err() {
            FileError(io_error) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }

    #[test]
    fn empty_file() {
        let path = temp_file("empty.evm", b"");

        let physical = Physical::new(&path).unwrap();
        assert_eq!(physical.len(), 0);
        assert!(physical.data().is_empty());

        std::fs::remove_file(&path).unwrap();
    }
}
