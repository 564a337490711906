//! Bit-granular input stream over the ESET-VM2 code segment.
//!
//! ESET-VM2 packs its code without any byte alignment. Bits are consumed in stream order,
//! from the most significant bit of the first byte onwards, but the format stores its
//! fields in two different orders:
//!
//! - opcodes and the register/memory selector bit are stored in stream order
//!   ([`BitOrder::Natural`]), so the first bit read is the most significant one;
//! - register indices, access-size tags, 32-bit addresses and 64-bit constants are stored
//!   least-significant-bit first, so the first bit read is the least significant one
//!   ([`BitOrder::Reversed`] and [`BitReader::read_wide`]).
//!
//! All order-sensitive arithmetic of the disassembler lives in this module.
//!
//! # End of stream
//!
//! A read that would run past the end of the buffer does not fail with an error. Instead
//! the reader becomes *exhausted*: the read returns zero, the cursor stays where it was,
//! and every further read returns zero as well until [`BitReader::reset`] is called. The
//! decoder relies on this sticky state to detect the end of a program.
//!
//! # Examples
//!
//! ```rust
//! use esetvm::{BitOrder, BitReader};
//!
//! let data = [0x11, 0x02, 0xFF];
//! let mut reader = BitReader::new(&data);
//!
//! assert_eq!(reader.read_bits::<1>(BitOrder::Natural), 0);
//! assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 0b001);
//! assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 0b000);
//! assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 0b100);
//! assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0b0000_1011);
//! assert_eq!(reader.read_bits::<6>(BitOrder::Natural), 0b11_1111);
//! assert!(!reader.is_exhausted());
//!
//! assert_eq!(reader.read_bit(), 0);
//! assert!(reader.is_exhausted());
//! ```

/// Order in which the bits of a narrow field are stored in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// The first bit in the stream is the most significant bit of the field
    Natural,
    /// The first bit in the stream is the least significant bit of the field
    Reversed,
}

/// Unsigned integer types that can be read as a whole, bit-reversed field with
/// [`BitReader::read_wide`].
pub trait WideField: Copy {
    /// Width of the field in bits
    const BITS: u32;

    /// Truncates a right-aligned value to this type.
    fn from_bits(value: u64) -> Self;
}

macro_rules! impl_wide_field {
    ($($ty:ty),*) => {
        $(
            impl WideField for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[allow(clippy::cast_possible_truncation)]
                fn from_bits(value: u64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_wide_field!(u8, u16, u32, u64);

/// A read-only bit stream over a borrowed byte buffer.
///
/// The cursor is a single absolute bit index that only moves forward, except when the
/// reader is explicitly [`reset`](BitReader::reset).
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// The borrowed code bytes
    data: &'a [u8],
    /// Absolute bit index of the next bit to read
    position: usize,
    /// Sticky end-of-stream state
    exhausted: bool,
}

impl<'a> BitReader<'a> {
    /// Creates a reader positioned at the first bit of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            position: 0,
            exhausted: false,
        }
    }

    /// Returns the underlying byte buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the size of the stream in bits.
    #[must_use]
    pub fn len_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// Returns the absolute bit index of the next bit to be read.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bits that can still be read.
    #[must_use]
    pub fn remaining_bits(&self) -> usize {
        self.len_bits().saturating_sub(self.position)
    }

    /// Returns `true` once a read has tried to run past the end of the buffer.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Moves the cursor back to the first bit and clears the exhausted state.
    pub fn reset(&mut self) {
        self.position = 0;
        self.exhausted = false;
    }

    /// Reserves `width` bits for the next read.
    ///
    /// Returns the start position of the field, or `None` (marking the stream exhausted)
    /// if the field does not fit or the stream is already exhausted.
    fn claim(&mut self, width: usize) -> Option<usize> {
        if self.exhausted || width > self.remaining_bits() {
            self.exhausted = true;
            return None;
        }

        let start = self.position;
        self.position += width;
        Some(start)
    }

    /// Reads a field of `WIDTH` bits (1 to 8), right-aligned in the returned byte.
    ///
    /// With [`BitOrder::Reversed`] the bit pattern is mirrored within its width, so that
    /// the first bit of the stream becomes the least significant bit of the result.
    ///
    /// Returns `0` without moving the cursor if the field does not fit into the remaining
    /// stream; the reader is exhausted afterwards.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use esetvm::{BitOrder, BitReader};
    ///
    /// let data = [0b1000_0000];
    /// let mut reader = BitReader::new(&data);
    /// assert_eq!(reader.read_bits::<4>(BitOrder::Reversed), 0b0001);
    ///
    /// reader.reset();
    /// assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0b1000);
    /// ```
    pub fn read_bits<const WIDTH: u32>(&mut self, order: BitOrder) -> u8 {
        const { assert!(WIDTH >= 1 && WIDTH <= 8, "bit fields must be 1 to 8 bits wide") };

        let Some(start) = self.claim(WIDTH as usize) else {
            return 0;
        };

        let byte = start / 8;
        let shift = start % 8;

        // A field of at most 8 bits spans at most two bytes
        let high = u16::from(self.data[byte]);
        let low = u16::from(self.data.get(byte + 1).copied().unwrap_or(0));
        let window = (high << 8) | low;

        #[allow(clippy::cast_possible_truncation)]
        let value = ((window >> (16 - shift - WIDTH as usize)) & ((1 << WIDTH) - 1)) as u8;

        match order {
            BitOrder::Natural => value,
            BitOrder::Reversed => value.reverse_bits() >> (8 - WIDTH),
        }
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> u8 {
        self.read_bits::<1>(BitOrder::Natural)
    }

    /// Reads a `T::BITS` wide field stored least-significant-bit first.
    ///
    /// The field may start at any bit position and cross byte boundaries. The bits are
    /// collected in stream order and the result is mirrored across its full width, so the
    /// first bit of the stream ends up as the least significant bit of the value. This is
    /// the encoding of 32-bit label addresses and 64-bit constants.
    ///
    /// Returns `0` without moving the cursor if the field does not fit into the remaining
    /// stream; the reader is exhausted afterwards.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use esetvm::BitReader;
    ///
    /// let data = [0x01, 0xFF, 0x00, 0x04];
    /// let mut reader = BitReader::new(&data);
    ///
    /// assert_eq!(reader.read_wide::<u8>(), 0x80);
    /// assert_eq!(reader.read_wide::<u16>(), 0x00FF);
    /// assert!(!reader.is_exhausted());
    /// assert_eq!(reader.read_wide::<u16>(), 0);
    /// assert!(reader.is_exhausted());
    /// ```
    pub fn read_wide<T: WideField>(&mut self) -> T {
        let width = T::BITS as usize;
        let Some(start) = self.claim(width) else {
            return T::from_bits(0);
        };

        let byte = start / 8;
        let shift = start % 8;
        let count = (shift + width).div_ceil(8);

        // At most 9 bytes for a 64-bit field starting mid-byte
        let assembled = self.data[byte..byte + count]
            .iter()
            .fold(0_u128, |acc, &b| (acc << 8) | u128::from(b));

        let mask = (1_u128 << width) - 1;
        #[allow(clippy::cast_possible_truncation)]
        let natural = ((assembled >> (count * 8 - shift - width)) & mask) as u64;

        T::from_bits(natural.reverse_bits() >> (64 - width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_widths() {
        let data = [0x11, 0x02, 0xFF];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<1>(BitOrder::Natural), 0);
        assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 1);
        assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 0);
        assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 0b100);
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0b0000_1011);
        assert_eq!(reader.read_bits::<6>(BitOrder::Natural), 0b11_1111);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.position(), 24);

        assert_eq!(reader.read_bits::<1>(BitOrder::Natural), 0);
        assert!(reader.is_exhausted());
        assert_eq!(reader.position(), 24);
    }

    #[test]
    fn reset_replays() {
        let data = [0x11, 0x02, 0xFF];
        let mut reader = BitReader::new(&data);

        let first: Vec<u8> = vec![
            reader.read_bits::<1>(BitOrder::Natural),
            reader.read_bits::<3>(BitOrder::Natural),
            reader.read_bits::<3>(BitOrder::Natural),
            reader.read_bits::<3>(BitOrder::Natural),
            reader.read_bits::<8>(BitOrder::Natural),
            reader.read_bits::<6>(BitOrder::Natural),
            reader.read_bits::<1>(BitOrder::Natural),
        ];
        assert!(reader.is_exhausted());

        reader.reset();
        assert!(!reader.is_exhausted());
        assert_eq!(reader.position(), 0);

        let second: Vec<u8> = vec![
            reader.read_bits::<1>(BitOrder::Natural),
            reader.read_bits::<3>(BitOrder::Natural),
            reader.read_bits::<3>(BitOrder::Natural),
            reader.read_bits::<3>(BitOrder::Natural),
            reader.read_bits::<8>(BitOrder::Natural),
            reader.read_bits::<6>(BitOrder::Natural),
            reader.read_bits::<1>(BitOrder::Natural),
        ];
        assert_eq!(first, second);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn byte_reads_then_overrun() {
        let data = [0x11, 0x02, 0xFF];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0x11);
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0x02);
        assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0x0F);
        assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0x0F);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0);
        assert!(reader.is_exhausted());

        reader.reset();
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0x11);
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0x02);
        assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0x0F);
        // 4 bits left, 8 requested
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0x00);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn failed_read_does_not_advance() {
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0xAB);
        assert_eq!(reader.read_bits::<5>(BitOrder::Natural), 0b11001);
        let before = reader.position();

        assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0);
        assert_eq!(reader.position(), before);
        assert_eq!(reader.read_wide::<u32>(), 0);
        assert_eq!(reader.position(), before);

        reader.reset();
        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0xAB);
        assert_eq!(reader.read_bits::<5>(BitOrder::Natural), 0b11001);
    }

    #[test]
    fn exhaustion_is_sticky() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<6>(BitOrder::Natural), 0b11_1111);
        assert_eq!(reader.read_bits::<3>(BitOrder::Natural), 0);
        assert!(reader.is_exhausted());

        // Two bits would still fit, but the stream stays exhausted
        for _ in 0..4 {
            assert_eq!(reader.read_bits::<2>(BitOrder::Natural), 0);
            assert_eq!(reader.read_bit(), 0);
            assert_eq!(reader.read_wide::<u64>(), 0);
        }
        assert!(reader.is_exhausted());
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn exact_end_is_not_exhausted() {
        let data = [0b1010_1010];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<8>(BitOrder::Natural), 0b1010_1010);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.remaining_bits(), 0);

        assert_eq!(reader.read_bit(), 0);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn reversed_fields() {
        // 1 | 01 | 0100 | 0
        let data = [0b1010_1000];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bit(), 1);
        assert_eq!(reader.read_bits::<2>(BitOrder::Reversed), 0b10);
        assert_eq!(reader.read_bits::<4>(BitOrder::Reversed), 0b0010);
        assert_eq!(reader.read_bit(), 0);
    }

    #[test]
    fn reversed_across_byte_boundary() {
        // The field 0b1101 starts at bit 6
        let data = [0b0000_0011, 0b0100_0000];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<6>(BitOrder::Natural), 0);
        assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0b1101);

        reader.reset();
        assert_eq!(reader.read_bits::<6>(BitOrder::Natural), 0);
        assert_eq!(reader.read_bits::<4>(BitOrder::Reversed), 0b1011);
    }

    #[test]
    fn wide_aligned() {
        let data = [0x01, 0xFF, 0x00, 0x04];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_wide::<u8>(), 0x80);
        assert_eq!(reader.read_wide::<u16>(), 0x00FF);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.read_wide::<u16>(), 0x00);
        assert!(reader.is_exhausted());
        assert_eq!(reader.position(), 24);
    }

    #[test]
    fn wide_unaligned() {
        let data = [0b1010_0000, 0b0000_0011, 0b0000_0011, 0b0000_0011];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<2>(BitOrder::Natural), 0b10);
        assert_eq!(reader.read_wide::<u8>(), 0b0000_0001);
        assert_eq!(reader.read_wide::<u16>(), 0b0011_0000_0011_0000);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.read_bits::<6>(BitOrder::Natural), 0b00_0011);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.read_wide::<u64>(), 0);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn wide_u32_and_u64() {
        // 0x0000_0400 stored LSB first: bit 10 set, i.e. stream bit 10
        let data = [0x00, 0b0010_0000, 0x00, 0x00];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_wide::<u32>(), 1024);
        assert_eq!(reader.remaining_bits(), 0);

        let data = [0xFF; 9];
        let mut reader = BitReader::new(&data);
        reader.read_bits::<3>(BitOrder::Natural);
        assert_eq!(reader.read_wide::<u64>(), u64::MAX);
        assert_eq!(reader.position(), 67);
        assert_eq!(reader.remaining_bits(), 5);
    }

    #[test]
    fn wide_u64_unaligned_value() {
        // 0x1 stored LSB first, starting at bit 4
        let data = [0b0000_1000, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits::<4>(BitOrder::Natural), 0);
        assert_eq!(reader.read_wide::<u64>(), 1);
        assert_eq!(reader.position(), 68);
    }

    #[test]
    fn empty_buffer() {
        let mut reader = BitReader::new(&[]);

        assert_eq!(reader.len_bits(), 0);
        assert_eq!(reader.read_bit(), 0);
        assert!(reader.is_exhausted());
        assert_eq!(reader.position(), 0);
    }
}
