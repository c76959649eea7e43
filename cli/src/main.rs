use std::io::IsTerminal;
use std::process::exit;

use clap::{ArgAction, ArgGroup, Parser};
use tracing::error;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;
mod interactive;

use crate::commands::Subcommand;

#[derive(Parser)]
#[clap(name = "m6809", version, about, group = ArgGroup::new("format"))]
struct Opt {
    /// Log more details, repeat for even more (-vvv)
    #[clap(short, long, action = ArgAction::Count, global(true))]
    verbose: u8,

    /// Always use colors, even when stdout is not a terminal
    #[clap(short = 'c', long, global(true), group = "format")]
    color: bool,

    /// Never use colors
    #[clap(short = 'C', long, global(true), group = "format")]
    no_color: bool,

    /// Log as JSON, one object per line
    #[clap(short, long, global(true), group = "format")]
    json: bool,

    #[clap(subcommand)]
    command: Subcommand,
}

impl Opt {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "m6809_emulator=debug,m6809=debug,info",
            2 => "m6809_emulator=trace,m6809=trace,info",
            3 => "m6809_emulator=trace,m6809=trace,debug",
            4..=u8::MAX => "trace",
        }
    }

    fn should_use_colors(&self) -> bool {
        match (self.color, self.no_color) {
            (true, _) => true,
            (_, true) => false,
            _ => std::io::stdout().is_terminal(),
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // RUST_LOG takes precedence over the verbosity flags
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_filter()))
    }

    /// Install the global subscriber, logging either as text or as JSON
    fn init_tracing(&self) {
        let (json_layer, text_layer) = if self.json {
            (Some(tracing_subscriber::fmt::layer().json()), None)
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .without_time()
                .with_ansi(self.should_use_colors())
                .with_target(false);
            (None, Some(layer))
        };

        tracing_subscriber::registry()
            .with(self.filter_layer())
            .with(json_layer)
            .with(text_layer)
            .init();
    }
}

fn main() {
    let opt = Opt::parse();
    opt.init_tracing();

    if let Err(e) = opt.command.exec() {
        error!("{:#}", e);
        exit(1);
    }
}
