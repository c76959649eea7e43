use camino::Utf8PathBuf;
use clap::{Parser, ValueHint};
use m6809_emulator::parser::Program;
use tracing::{info, warn};

use super::assemble_file;

#[derive(Parser, Debug)]
pub struct AssembleOpt {
    /// Input file
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    input: Utf8PathBuf,
}

/// Format a program as an `address  bytes  instruction` listing
fn listing(program: &Program) -> String {
    program
        .layout()
        .map(|(address, instruction)| {
            let bytes = instruction
                .bytes()
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{address:04X}  {bytes:<8}  {instruction}\n")
        })
        .collect()
}

impl AssembleOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        let program = assemble_file(&self.input)?;

        for instruction in program.instructions().iter().filter(|i| !i.is_known()) {
            warn!(%instruction, "No encoding for this instruction, using the END opcode");
        }

        print!("{}", listing(&program));
        info!(
            instructions = program.instructions().len(),
            bytes = program.len(),
            "Program assembled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn listing_test() {
        let program = m6809_emulator::assemble("LDA #5\nLDX #$1234\nSTA $1000\nDECA\nEND").unwrap();
        assert_eq!(
            listing(&program),
            "0000  86 05     LDA #$05\n\
             0002  8E 12 34  LDX #$1234\n\
             0005  B7 10 00  STA $1000\n\
             0008  4A        DECA\n"
        );
    }
}
