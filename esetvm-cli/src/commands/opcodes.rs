use esetvm::disassembler::INSTRUCTIONS;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct OpcodeInfo {
    pub mnemonic: String,
    pub pattern: String,
    pub length: u8,
    pub operands: String,
}

pub fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    let opcodes: Vec<OpcodeInfo> = INSTRUCTIONS
        .iter()
        .map(|op| OpcodeInfo {
            mnemonic: op.mnemonic.to_string(),
            pattern: op.pattern(),
            length: op.length,
            operands: op.operands.iter().map(ToString::to_string).collect(),
        })
        .collect();

    print_output(&opcodes, opts, |opcodes| {
        let mut tw = TabWriter::new(&[
            ("Mnemonic", Align::Left),
            ("Code", Align::Right),
            ("Bits", Align::Right),
            ("Operands", Align::Left),
        ]);
        for op in opcodes {
            tw.row(vec![
                op.mnemonic.clone(),
                op.pattern.clone(),
                op.length.to_string(),
                op.operands.clone(),
            ]);
        }
        tw.print();
    })
}
