use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// esetvm - disassembler for ESET-VM2 programs
#[derive(Debug, Parser)]
#[command(name = "esetvm", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Disassemble programs into ESET-VM2 assembly.
    Disasm {
        /// Paths to the .evm programs. Several files are decoded in parallel.
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<PathBuf>,

        /// Fail on a truncated trailing instruction instead of dropping it.
        #[arg(long)]
        strict: bool,

        /// Print only the .code section.
        #[arg(long)]
        code_only: bool,
    },

    /// Display the container header and decoding statistics.
    Info {
        /// Path to the .evm program.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// List the instruction set with opcode bit patterns and operand encodings.
    Opcodes,
}
