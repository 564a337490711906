//! Benchmarks for ESET-VM2 decoding.
//!
//! - Raw bit reads in both orders
//! - Decoding a synthetic program of mixed instructions
//! - Rendering the complete listing, labels included

extern crate esetvm;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use esetvm::{disassembler::decode_stream, BitOrder, BitReader, Decoder};
use std::hint::black_box;

/// Packs bits MSB first
#[derive(Default)]
struct Bits {
    buf: Vec<u8>,
    len: usize,
}

impl Bits {
    fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.buf.push(0);
        }
        if bit {
            let last = self.buf.len() - 1;
            self.buf[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    fn opcode(&mut self, code: u8, width: u32) {
        for i in (0..width).rev() {
            self.push((code >> i) & 1 == 1);
        }
    }

    fn field(&mut self, value: u64, width: u32) {
        for i in 0..width {
            self.push((value >> i) & 1 == 1);
        }
    }

    fn reg(&mut self, index: u64) {
        self.push(false);
        self.field(index, 4);
    }
}

/// A loop body repeated `count` times: loadConst, add, compare, jumpEqual, consoleWrite
fn program(count: usize) -> Vec<u8> {
    let mut bits = Bits::default();

    for i in 0..count {
        let start = bits.len as u64;

        bits.opcode(0b001, 3);
        bits.field(i as u64, 64);
        bits.reg(1);

        bits.opcode(0b010001, 6);
        bits.reg(0);
        bits.push(true);
        bits.field(3, 2);
        bits.field(2, 4);
        bits.reg(0);

        bits.opcode(0b01100, 5);
        bits.reg(0);
        bits.reg(1);
        bits.reg(2);

        bits.opcode(0b01110, 5);
        bits.field(start, 32);
        bits.reg(2);
        bits.reg(3);

        bits.opcode(0b10011, 5);
        bits.reg(0);
    }

    // hlt
    bits.opcode(0b10110, 5);
    bits.buf
}

fn bench_read_bits(c: &mut Criterion) {
    let data = vec![0xA5_u8; 4096];

    let mut group = c.benchmark_group("bitreader");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("natural_5", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(black_box(&data));
            let mut acc = 0_u32;
            while !reader.is_exhausted() {
                acc = acc.wrapping_add(u32::from(reader.read_bits::<5>(BitOrder::Natural)));
            }
            black_box(acc)
        });
    });

    group.bench_function("wide_u32", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(black_box(&data));
            reader.read_bits::<3>(BitOrder::Natural);
            let mut acc = 0_u32;
            while !reader.is_exhausted() {
                acc = acc.wrapping_add(reader.read_wide::<u32>());
            }
            black_box(acc)
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let code = program(1000);

    let mut group = c.benchmark_group("decoder");
    group.throughput(Throughput::Bytes(code.len() as u64));

    group.bench_function("decode_stream", |b| {
        b.iter(|| {
            let instructions = decode_stream(black_box(&code)).unwrap();
            black_box(instructions)
        });
    });

    group.bench_function("parse_listing", |b| {
        let mut out = Vec::with_capacity(256 * 1024);
        b.iter(|| {
            out.clear();
            let mut decoder = Decoder::new(BitReader::new(black_box(&code)));
            decoder.parse(&mut out).unwrap();
            black_box(out.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_read_bits, bench_decode);
criterion_main!(benches);
