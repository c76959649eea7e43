use std::fs;

use camino::Utf8Path;
use miette::NamedSource;
use tracing::info;

mod assemble;
mod completion;
mod run;

#[derive(clap::Subcommand)]
pub enum Subcommand {
    /// Assemble and run a program
    Run(self::run::RunOpt),

    /// Assemble a program and print its listing
    Assemble(self::assemble::AssembleOpt),

    /// Generate shell completions
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Self::Run(opt) => opt.exec(),
            Self::Assemble(opt) => opt.exec(),
            Self::Completion(opt) => opt.exec(),
        }
    }
}

/// Read and assemble a source file
///
/// Assembly errors are turned into a report that points to the offending
/// line.
fn assemble_file(path: &Utf8Path) -> anyhow::Result<m6809_emulator::parser::Program> {
    info!(%path, "Reading program");
    let source = fs::read_to_string(path)?;

    m6809_emulator::assemble(&source).map_err(|e| {
        let report =
            miette::Report::new(e).with_source_code(NamedSource::new(path.as_str(), source));
        eprintln!("{report:?}");
        anyhow::anyhow!("could not assemble {path}")
    })
}
