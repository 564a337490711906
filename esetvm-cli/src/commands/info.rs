use std::path::Path;

use esetvm::{file::HEADER_SIZE, DecoderConfig, ErrorStatus};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_program,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct ProgramInfo {
    pub path: String,
    pub file_size: usize,
    pub code_size: u32,
    pub data_size: u32,
    pub initial_data_size: u32,
    pub trailing_bytes: usize,
    pub code_bits: usize,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub instruction_count: usize,
    pub jump_target_count: usize,
    pub unused_bits: usize,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    // Compatible mode so that truncated programs still report their statistics
    let program = load_program(path, DecoderConfig::compatible())?;
    let file = program.file();
    let header = file.header();

    let mut decoder = program.decoder();
    let decoded = decoder.decode_all();

    let code_bits = file.code().len() * 8;
    let used_bits: usize = decoder.instructions().iter().map(|i| i.size).sum();

    let info = ProgramInfo {
        path: path.display().to_string(),
        file_size: file.len(),
        code_size: header.code_size,
        data_size: header.data_size,
        initial_data_size: header.initial_data_size,
        trailing_bytes: file.len()
            - HEADER_SIZE
            - header.code_size as usize
            - header.initial_data_size as usize,
        code_bits,
        status: decoder.error_status().to_string(),
        error: decoded.err().map(|e| e.to_string()),
        instruction_count: decoder.instructions().len(),
        jump_target_count: decoder.jump_targets().len(),
        unused_bits: if decoder.error_status() == ErrorStatus::NoError {
            code_bits - used_bits
        } else {
            0
        },
    };

    print_output(&info, opts, |info| {
        let mut tw = TabWriter::new(&[("Field", Align::Left), ("Value", Align::Right)]);
        tw.row(vec!["File size".into(), info.file_size.to_string()]);
        tw.row(vec!["Code size".into(), info.code_size.to_string()]);
        tw.row(vec!["Data size".into(), info.data_size.to_string()]);
        tw.row(vec![
            "Initial data".into(),
            info.initial_data_size.to_string(),
        ]);
        tw.row(vec!["Trailing bytes".into(), info.trailing_bytes.to_string()]);
        tw.row(vec!["Code bits".into(), info.code_bits.to_string()]);
        tw.row(vec!["Instructions".into(), info.instruction_count.to_string()]);
        tw.row(vec!["Jump targets".into(), info.jump_target_count.to_string()]);
        tw.row(vec!["Unused bits".into(), info.unused_bits.to_string()]);
        tw.row(vec!["Status".into(), info.status.clone()]);
        tw.print();

        if let Some(error) = &info.error {
            println!("\n{error}");
        }
    })
}
