use crate::{
    disassembler::{AccessSize, Mnemonic, INSTRUCTIONS},
    file::MAGIC,
};

/// Assembles ESET-VM2 code bit by bit, for building decoder inputs in tests.
///
/// Opcodes are written in stream order, operand fields least-significant-bit first.
#[derive(Default)]
pub struct CodeWriter {
    buf: Vec<u8>,
    bits: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bit offset of the next instruction
    pub fn position(&self) -> usize {
        self.bits
    }

    pub fn bit(mut self, val: bool) -> Self {
        if self.bits % 8 == 0 {
            self.buf.push(0);
        }
        if val {
            let last = self.buf.len() - 1;
            self.buf[last] |= 0x80 >> (self.bits % 8);
        }
        self.bits += 1;
        self
    }

    /// Writes the lower `n` bits of `val`, MSB first
    pub fn bits(mut self, val: u64, n: u32) -> Self {
        for i in (0..n).rev() {
            self = self.bit((val >> i) & 1 == 1);
        }
        self
    }

    /// Writes the lower `n` bits of `val`, LSB first
    pub fn field(mut self, val: u64, n: u32) -> Self {
        for i in 0..n {
            self = self.bit((val >> i) & 1 == 1);
        }
        self
    }

    pub fn op(self, mnemonic: Mnemonic) -> Self {
        let op = INSTRUCTIONS
            .iter()
            .find(|op| op.mnemonic == mnemonic)
            .unwrap();
        self.bits(u64::from(op.code), u32::from(op.length))
    }

    pub fn reg(self, index: u8) -> Self {
        self.bit(false).field(u64::from(index), 4)
    }

    pub fn mem(self, size: AccessSize, base: u8) -> Self {
        self.bit(true)
            .field(size as u64, 2)
            .field(u64::from(base), 4)
    }

    pub fn constant(self, value: u64) -> Self {
        self.field(value, 64)
    }

    pub fn label(self, address: u32) -> Self {
        self.field(u64::from(address), 32)
    }

    /// The code bytes, zero padded to a whole byte
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Wraps a code segment and initial data into an ESET-VM2 container
pub fn image(code: &[u8], data_size: u32, initial_data: &[u8]) -> Vec<u8> {
    let mut image = MAGIC.to_vec();
    image.extend_from_slice(&(code.len() as u32).to_le_bytes());
    image.extend_from_slice(&data_size.to_le_bytes());
    image.extend_from_slice(&(initial_data.len() as u32).to_le_bytes());
    image.extend_from_slice(code);
    image.extend_from_slice(initial_data);
    image
}

#[test]
fn code_writer_layout() {
    // add r1, dword[r2], r3
    let code = CodeWriter::new()
        .op(Mnemonic::Add)
        .reg(1)
        .mem(AccessSize::Dword, 2)
        .reg(3)
        .build();
    assert_eq!(code, vec![0b0100_0101, 0b0001_0101, 0b0001_1000]);
}
