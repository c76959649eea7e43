use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::Opt;

#[derive(Parser, Debug)]
pub struct CompletionOpt {
    /// The shell to generate completions for
    #[clap(value_enum)]
    shell: Shell,
}

impl CompletionOpt {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut command = Opt::command();
        let name = command.get_name().to_owned();
        debug!(shell = %self.shell, %name, "Generating completions");
        generate(self.shell, &mut command, name, &mut io::stdout());
        Ok(())
    }
}
