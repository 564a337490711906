#![no_main]

use libfuzzer_sys::fuzz_target;
use esetvm::Program;

fuzz_target!(|data: &[u8]| {
    if let Ok(program) = Program::from_mem(data.to_vec()) {
        let _ = program.to_listing();
    }
});
