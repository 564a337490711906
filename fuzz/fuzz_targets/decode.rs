#![no_main]

use libfuzzer_sys::fuzz_target;
use esetvm::{BitReader, Decoder, DecoderConfig};

fuzz_target!(|data: &[u8]| {
    let mut decoder = Decoder::with_config(BitReader::new(data), DecoderConfig::strict());
    let mut out = Vec::new();
    let _ = decoder.parse(&mut out);
});
