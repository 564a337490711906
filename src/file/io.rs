//! Little-endian, bounds-checked reading of primitive values from byte buffers.
//!
//! The ESET-VM2 container header stores its size fields as little-endian 32-bit integers.
//! This module provides the [`crate::file::io::ByteIO`] trait and the read function the
//! [`crate::file::parser::Parser`] builds on.
//!
//! # Examples
//!
//! ```rust
//! use esetvm::file::io::read_le_at;
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05];
//! let mut offset = 0;
//! let value: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!(value, 0x04030201);
//!
//! let last: u8 = read_le_at(&data, &mut offset)?;
//! assert_eq!(last, 0x05);
//! assert_eq!(offset, 5);
//! # Ok::<(), esetvm::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait implemented by the primitive integer types that can be decoded from raw bytes.
pub trait ByteIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_byte_io {
    ($($ty:ty),*) => {
        $(
            impl ByteIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_byte_io!(u8, u16, u32, u64);

/// Reads a value of type `T` in little-endian byte order at `offset` and advances the offset.
///
/// The offset is left untouched if the read fails.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the value extends past the end of `data`.
pub fn read_le_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    fn read_first<T: ByteIO>(data: &[u8]) -> Result<T> {
        let mut offset = 0;
        read_le_at(data, &mut offset)
    }

    #[test]
    fn read_le_widths() {
        assert_eq!(read_first::<u8>(&TEST_BUFFER).unwrap(), 0x01);
        assert_eq!(read_first::<u16>(&TEST_BUFFER).unwrap(), 0x0201);
        assert_eq!(read_first::<u32>(&TEST_BUFFER).unwrap(), 0x04030201);
        assert_eq!(read_first::<u64>(&TEST_BUFFER).unwrap(), 0x0807060504030201);
    }

    #[test]
    fn read_le_at_advances() {
        let mut offset = 2;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x06050403);
        assert_eq!(offset, 6);
    }

    #[test]
    fn errors() {
        let buffer = [0xFF, 0xFF, 0xFF, 0xFF];

        assert!(matches!(read_first::<u64>(&buffer), Err(OutOfBounds)));

        let mut offset = 2;
        let result = read_le_at::<u32>(&buffer, &mut offset);
        assert!(matches!(result, Err(OutOfBounds)));
        assert_eq!(offset, 2);

        let mut offset = usize::MAX;
        assert!(read_le_at::<u8>(&buffer, &mut offset).is_err());
    }
}
