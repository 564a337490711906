use std::path::Path;

use anyhow::Context;
use esetvm::{DecoderConfig, Program};

/// Load a program and attach the decoder configuration.
pub fn load_program(path: &Path, config: DecoderConfig) -> anyhow::Result<Program> {
    Program::from_file(path)
        .map(|program| program.with_config(config))
        .with_context(|| format!("failed to load program: {}", path.display()))
}
