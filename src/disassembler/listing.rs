//! Rendering of decoded programs as ESET-VM2 assembly.

use std::io::Write;

use crate::{
    disassembler::{Instruction, JumpTargets, LABEL_PREFIX},
    Result,
};

/// Number of initial data bytes per `.data` line
const DATA_BYTES_PER_LINE: usize = 16;

/// Writes the `.code` section for `instructions`.
///
/// Every instruction whose address is in `targets` is preceded by a label line. Targets
/// that do not start an instruction get no label.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if writing to `sink` fails.
///
/// # Examples
///
/// ```rust
/// use esetvm::disassembler::{decode_stream, write_listing, JumpTargets};
///
/// let instructions = decode_stream(&[0b1101_0000])?; // ret
/// let targets: JumpTargets = [0].into_iter().collect();
///
/// let mut out = Vec::new();
/// write_listing(&mut out, &instructions, &targets)?;
/// assert_eq!(out, b".code\naddr0:\n\tret\n");
/// # Ok::<(), esetvm::Error>(())
/// ```
pub fn write_listing<W: Write + ?Sized>(
    sink: &mut W,
    instructions: &[Instruction],
    targets: &JumpTargets,
) -> Result<()> {
    writeln!(sink, ".code")?;

    for instruction in instructions {
        if targets.contains(instruction.address) {
            writeln!(sink, "{LABEL_PREFIX}{}:", instruction.address)?;
        }
        writeln!(sink, "\t{instruction}")?;
    }

    Ok(())
}

/// Writes the `.dataSize` directive and, if there is initial data, the `.data` section.
///
/// Initial data is dumped as lowercase hex bytes, 16 per line.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if writing to `sink` fails.
pub fn write_data_section<W: Write + ?Sized>(
    sink: &mut W,
    data_size: u32,
    initial_data: &[u8],
) -> Result<()> {
    writeln!(sink, ".dataSize {data_size}")?;

    if initial_data.is_empty() {
        return Ok(());
    }

    write!(sink, ".data")?;
    for line in initial_data.chunks(DATA_BYTES_PER_LINE) {
        writeln!(sink)?;
        for (index, byte) in line.iter().enumerate() {
            if index > 0 {
                write!(sink, " ")?;
            }
            write!(sink, "{byte:02x}")?;
        }
    }
    writeln!(sink)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::decode_stream;

    fn data_section(data_size: u32, initial_data: &[u8]) -> String {
        let mut out = Vec::new();
        write_data_section(&mut out, data_size, initial_data).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn data_size_only() {
        assert_eq!(data_section(256, &[]), ".dataSize 256\n");
    }

    #[test]
    fn data_lines() {
        assert_eq!(
            data_section(4, &[0x00, 0x0A, 0xFF]),
            ".dataSize 4\n.data\n00 0a ff\n"
        );

        let bytes: Vec<u8> = (0..=16).collect();
        assert_eq!(
            data_section(17, &bytes),
            ".dataSize 17\n.data\n00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f\n10\n"
        );
    }

    #[test]
    fn listing_without_targets() {
        // hlt, then ret
        let instructions = decode_stream(&[0b1011_0110, 0b1000_0000]).unwrap();
        let mut out = Vec::new();
        write_listing(&mut out, &instructions, &JumpTargets::new()).unwrap();
        assert_eq!(out, b".code\n\thlt\n\tret\n");

        let targets: JumpTargets = [5, 6].into_iter().collect();
        let mut out = Vec::new();
        write_listing(&mut out, &instructions, &targets).unwrap();
        assert_eq!(out, b".code\n\thlt\naddr5:\n\tret\n");
    }
}
