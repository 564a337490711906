use std::{
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use esetvm::{process_files, DecoderConfig, Program};
use serde::Serialize;

use crate::{app::GlobalOptions, commands::common::load_program, output::print_output};

/// Options for the `disasm` command.
#[derive(Debug, Clone, Copy)]
pub struct DisasmOptions {
    /// Report truncated trailing instructions as errors
    pub strict: bool,
    /// Skip the `.dataSize` and `.data` preamble
    pub code_only: bool,
}

impl DisasmOptions {
    fn config(self) -> DecoderConfig {
        if self.strict {
            DecoderConfig::strict()
        } else {
            DecoderConfig::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramListing {
    pub path: String,
    #[serde(flatten)]
    pub listing: CodeListing,
}

#[derive(Debug, Serialize)]
pub struct CodeListing {
    pub data_size: u32,
    pub initial_data: String,
    pub jump_targets: Vec<u32>,
    pub instructions: Vec<InstructionInfo>,
}

#[derive(Debug, Serialize)]
pub struct InstructionInfo {
    pub address: usize,
    pub size: usize,
    pub mnemonic: String,
    pub text: String,
    pub label: bool,
}

pub fn run(paths: &[PathBuf], opts: DisasmOptions, global: &GlobalOptions) -> anyhow::Result<()> {
    if global.json {
        let listings = paths
            .iter()
            .zip(process_files(paths, opts.config(), code_listing))
            .map(|(path, listing)| {
                let listing = listing
                    .with_context(|| format!("failed to disassemble {}", path.display()))?;
                Ok(ProgramListing {
                    path: path.display().to_string(),
                    listing,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        return print_output(&listings, global, |_| {});
    }

    match paths {
        [path] => run_single(path, opts),
        _ => run_many(paths, opts),
    }
}

fn run_single(path: &Path, opts: DisasmOptions) -> anyhow::Result<()> {
    let program = load_program(path, opts.config())?;

    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());

    write_program(&mut w, &program, opts)
        .with_context(|| format!("failed to disassemble {}", path.display()))?;
    w.flush()?;

    Ok(())
}

fn run_many(paths: &[PathBuf], opts: DisasmOptions) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());

    let listings = if opts.code_only {
        process_files(paths, opts.config(), Program::to_code_listing)
    } else {
        process_files(paths, opts.config(), Program::to_listing)
    };

    let mut first_error = None;
    let mut failed = 0;

    for (path, listing) in paths.iter().zip(listings) {
        match listing {
            Ok(text) => {
                writeln!(w, "; {}", path.display())?;
                write!(w, "{text}")?;
            }
            Err(error) => {
                eprintln!("{}: {error:#}", path.display());
                failed += 1;
                first_error.get_or_insert(anyhow::Error::from(error));
            }
        }
    }
    w.flush()?;

    match first_error {
        Some(error) => Err(error.context(format!(
            "failed to disassemble {failed} of {} files",
            paths.len()
        ))),
        None => Ok(()),
    }
}

fn write_program<W: Write>(w: &mut W, program: &Program, opts: DisasmOptions) -> esetvm::Result<()> {
    if opts.code_only {
        program.decoder().parse(w)
    } else {
        program.disassemble(w)
    }
}

fn code_listing(program: &Program) -> esetvm::Result<CodeListing> {
    let mut decoder = program.decoder();
    decoder.decode_all()?;

    let targets = decoder.jump_targets();
    let instructions = decoder
        .instructions()
        .iter()
        .map(|instruction| InstructionInfo {
            address: instruction.address,
            size: instruction.size,
            mnemonic: instruction.mnemonic().to_string(),
            text: instruction.to_string(),
            label: targets.contains(instruction.address),
        })
        .collect();

    let file = program.file();
    Ok(CodeListing {
        data_size: file.header().data_size,
        initial_data: file
            .initial_data()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect(),
        jump_targets: targets.iter().collect(),
        instructions,
    })
}
