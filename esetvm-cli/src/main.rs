mod app;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use esetvm::ErrorStatus;

use crate::app::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Show esetvm info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("esetvm", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    let result = match &cli.command {
        Command::Disasm {
            paths,
            strict,
            code_only,
        } => commands::disasm::run(
            paths,
            commands::disasm::DisasmOptions {
                strict: *strict,
                code_only: *code_only,
            },
            &cli.global,
        ),
        Command::Info { path } => commands::info::run(path, &cli.global),
        Command::Opcodes => commands::opcodes::run(&cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(exit_status(&error).exit_code())
        }
    }
}

/// Status of the first library error in the chain; anything else is an input problem.
fn exit_status(error: &anyhow::Error) -> ErrorStatus {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<esetvm::Error>())
        .map_or(ErrorStatus::InputError, esetvm::Error::status)
}
