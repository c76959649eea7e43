use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueHint};
use m6809_emulator::compile;
use m6809_emulator::runtime::Computer;
use tracing::{debug, info, warn};

use super::assemble_file;
use crate::interactive::run_interactive;

#[derive(Parser, Debug)]
pub struct RunOpt {
    /// Input file
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    input: Utf8PathBuf,

    /// Run the program in interactive mode
    #[clap(short, long, action = ArgAction::SetTrue)]
    interactive: bool,

    /// Stop after this many instructions, even if the program did not halt
    #[clap(short, long, value_parser)]
    max_steps: Option<usize>,

    /// Wait this many milliseconds between two instructions
    #[clap(short, long, value_parser, default_value = "0")]
    delay: u64,

    /// Print each executed instruction
    #[clap(short, long, action = ArgAction::SetTrue)]
    trace: bool,
}

impl RunOpt {
    /// Step until the computer halts or the step limit is reached
    fn run(&self, computer: &mut Computer) {
        let delay = Duration::from_millis(self.delay);
        let mut count = 0;

        while !computer.is_halted() {
            if self.max_steps.is_some_and(|max| count >= max) {
                warn!(steps = count, "Step limit reached, stopping");
                return;
            }

            let trace = computer.step();
            count += 1;
            if self.trace {
                println!("{trace}");
            }

            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }

    pub fn exec(self) -> anyhow::Result<()> {
        let program = assemble_file(&self.input)?;

        debug!("Building computer");
        let mut computer = compile(&program);

        info!("Running program");
        if self.interactive {
            run_interactive(&mut computer)?;
        } else if self.max_steps.is_none() && self.delay == 0 && !self.trace {
            computer.run();
        } else {
            self.run(&mut computer);
        }

        info!(
            steps = computer.steps(),
            registers = %computer.registers(),
            "End of program"
        );

        Ok(())
    }
}
