pub mod common;
pub mod disasm;
pub mod info;
pub mod opcodes;
