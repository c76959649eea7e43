//! Interactive debugger
//!
//! Lines typed by the user are split with `shell-words` and parsed as a
//! [`Command`] with clap, while rustyline takes care of line editing, history
//! and completion.

use std::collections::BTreeSet;

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use m6809_emulator::constants as C;
use m6809_emulator::opcodes::disassemble;
use m6809_emulator::runtime::{Computer, Reg, Trace};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use tracing::{debug, info, warn};

mod helper;
mod parse;
use self::helper::CommandHelper;
use self::parse::Address;

static AFTER_HELP: &str = r#"
Type "help <command>" for details about a command.
Pressing enter on an empty line repeats the previous command."#;

/// Number of bytes shown on each line of a memory dump
const DUMP_WIDTH: usize = 8;

/// Largest byte count accepted by `memory`
const ADDRESS_SPACE: u64 = (C::RAM_SIZE + C::ROM_SIZE) as u64;

/// Debugger commands
#[derive(Parser, Clone, Copy, Debug)]
#[clap(
    help_template = "{about}\n\nCOMMANDS:\n{subcommands}\n{after-help}",
    after_help = AFTER_HELP,
    disable_version_flag = true,
    infer_subcommands = true,
    no_binary_name = true,
)]
enum Command {
    /// Run one or more instructions
    #[command(alias = "s")]
    Step {
        /// How many instructions to run
        #[clap(value_parser, default_value = "1")]
        count: u64,
    },

    /// Run until a breakpoint is hit or the processor halts
    #[command(alias = "c")]
    Continue,

    /// Reset the processor, keeping the memory as is
    Reset,

    /// Print all registers, or a single one
    Registers {
        #[clap(value_parser)]
        register: Option<Reg>,
    },

    /// Dump a block of memory
    Memory {
        /// First address, like $20 or 32
        #[clap(value_parser)]
        address: Address,

        /// How many bytes to dump, at most the whole address space
        #[clap(
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=ADDRESS_SPACE),
            default_value = "1"
        )]
        count: usize,
    },

    /// Disassemble the instructions that follow
    List {
        /// How many instructions to list
        #[clap(value_parser, default_value = "10")]
        count: u32,
    },

    /// Stop `continue` when the program counter reaches an address
    Break {
        #[clap(value_parser)]
        address: Address,
    },

    /// Remove a breakpoint
    Unbreak {
        #[clap(value_parser)]
        address: Address,
    },

    /// Show breakpoints and the number of executed instructions
    Info {
        #[clap(subcommand)]
        topic: Option<InfoTopic>,
    },

    /// Leave the debugger
    #[command(alias = "quit")]
    Exit,
}

#[derive(Parser, Clone, Copy, Debug)]
enum InfoTopic {
    /// Breakpoints, in address order
    Breakpoints,

    /// Instructions executed since the last reset
    Steps,
}

/// What the read loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// State of a debugging session around a computer
struct Debugger<'a> {
    computer: &'a mut Computer,
    breakpoints: BTreeSet<C::Address>,

    /// Where the next `list` without any step in between resumes
    list_cursor: Option<C::Address>,
}

impl<'a> Debugger<'a> {
    fn new(computer: &'a mut Computer) -> Self {
        Self {
            computer,
            breakpoints: BTreeSet::new(),
            list_cursor: None,
        }
    }

    fn step(&mut self) -> Trace {
        self.list_cursor = None;
        let trace = self.computer.step();
        info!("{trace}");
        if trace.is_halt() {
            warn!(pc = self.computer.registers().pc, "Processor halted");
        }
        trace
    }

    /// Step until the processor halts or stops on a breakpoint, returns the
    /// number of instructions executed
    fn resume(&mut self) -> usize {
        let mut count = 0;
        while !self.computer.is_halted() {
            self.step();
            count += 1;

            let pc = self.computer.registers().pc;
            if self.breakpoints.contains(&pc) {
                info!(pc, "Breakpoint reached");
                break;
            }
        }
        count
    }

    /// Disassemble `count` instructions, from `pc` or from where the last
    /// listing stopped
    fn listing(&mut self, count: u32) -> Vec<String> {
        let pc = self.computer.registers().pc;
        let mut address = self.list_cursor.unwrap_or(pc);
        let mut lines = Vec::new();

        for _ in 0..count {
            let instruction = disassemble(self.computer.memory(), address);
            let marker = match (self.breakpoints.contains(&address), address == pc) {
                (true, true) => "B>",
                (true, false) => "B ",
                (false, true) => " >",
                (false, false) => "  ",
            };
            lines.push(format!("{marker} ${address:04X}    {instruction}"));

            // An instruction is at most 3 bytes long
            #[allow(clippy::cast_possible_truncation)]
            let len = instruction.len() as C::Address;
            address = address.wrapping_add(len);
        }

        self.list_cursor = Some(address);
        lines
    }

    fn register(&self, register: Option<Reg>) -> String {
        let registers = self.computer.registers();
        match register {
            None => registers.to_string(),
            Some(Reg::CC) => format!("CC = {} ({:?})", registers.cc, registers.cc),
            Some(reg) if reg.width() == 8 => format!("{reg} = ${:02X}", registers.get(reg)),
            Some(reg) => format!("{reg} = ${:04X}", registers.get(reg)),
        }
    }

    fn show_breakpoints(&self) {
        if self.breakpoints.is_empty() {
            info!("No breakpoints");
        }
        for &address in &self.breakpoints {
            let instruction = disassemble(self.computer.memory(), address);
            info!("Breakpoint at ${address:04X}    {instruction}");
        }
    }

    fn execute(&mut self, command: Command) -> Flow {
        let halted = self.computer.is_halted();
        match command {
            Command::Exit => return Flow::Exit,

            Command::Step { .. } | Command::Continue if halted => {
                warn!("The processor is halted, \"reset\" to start over or \"exit\" to quit");
            }

            Command::Step { count } => {
                for _ in 0..count {
                    if self.step().is_halt() {
                        break;
                    }
                }
            }

            Command::Continue => {
                let count = self.resume();
                debug!(count, "Resumed execution");
            }

            Command::Reset => {
                self.list_cursor = None;
                self.computer.reset();
                info!(pc = self.computer.registers().pc, "Processor reset");
            }

            Command::Registers { register } => info!("{}", self.register(register)),

            Command::Memory {
                address: Address(address),
                count,
            } => {
                let bytes = self.computer.memory().dump(address, count);
                for line in format_dump(address, &bytes) {
                    info!("{line}");
                }
            }

            Command::List { count } => {
                for line in self.listing(count) {
                    info!("{line}");
                }
            }

            Command::Break {
                address: Address(address),
            } => {
                if self.breakpoints.insert(address) {
                    info!(address, "Breakpoint set");
                } else {
                    warn!(address, "There already is a breakpoint here");
                }
            }

            Command::Unbreak {
                address: Address(address),
            } => {
                if self.breakpoints.remove(&address) {
                    info!(address, "Breakpoint removed");
                } else {
                    warn!(address, "There is no breakpoint here");
                }
            }

            Command::Info { topic } => {
                if matches!(topic, None | Some(InfoTopic::Breakpoints)) {
                    self.show_breakpoints();
                }
                if matches!(topic, None | Some(InfoTopic::Steps)) {
                    info!("{} instructions executed", self.computer.steps());
                }
            }
        }

        Flow::Continue
    }
}

/// Format a block of memory, a few bytes per line
fn format_dump(start: C::Address, bytes: &[C::Byte]) -> Vec<String> {
    bytes
        .chunks(DUMP_WIDTH)
        .enumerate()
        .map(|(index, chunk)| {
            // The address space wraps around
            #[allow(clippy::cast_possible_truncation)]
            let address = start.wrapping_add((index * DUMP_WIDTH) as C::Address);
            let values: Vec<_> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            format!("${:04X}  {}", address, values.join(" "))
        })
        .collect()
}

pub(crate) fn run_interactive(computer: &mut Computer) -> anyhow::Result<()> {
    info!("Interactive mode, type \"help\" for the list of commands");

    let config = Config::builder()
        .auto_add_history(true)
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();
    let mut editor: Editor<CommandHelper, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(CommandHelper::new::<Command>()));

    let mut debugger = Debugger::new(computer);
    let mut previous: Option<Command> = None;

    loop {
        let line = match editor.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let command = if line.trim().is_empty() {
            match &previous {
                Some(command) => *command,
                None => continue,
            }
        } else {
            let words = match shell_words::split(&line) {
                Ok(words) => words,
                Err(e) => {
                    warn!(error = %e, "Could not split input");
                    continue;
                }
            };

            match Command::try_parse_from(words) {
                Ok(command) => command,
                Err(e) => {
                    // Also covers `help`, which clap reports as an error
                    let _ = e.print();
                    continue;
                }
            }
        };

        debug!(?command, "Executing command");
        previous = Some(command);
        if debugger.execute(command) == Flow::Exit {
            break;
        }
    }

    info!("Leaving interactive mode");
    Ok(())
}

#[cfg(test)]
mod tests {
    use m6809_emulator::{assemble, compile};
    use pretty_assertions::assert_eq;

    use super::*;

    fn computer(source: &str) -> Computer {
        compile(&assemble(source).unwrap())
    }

    #[test]
    fn parse_command_test() {
        let command = Command::try_parse_from(["memory", "$20", "4"]).unwrap();
        assert!(matches!(
            command,
            Command::Memory {
                address: Address(0x20),
                count: 4
            }
        ));

        let command = Command::try_parse_from(["s"]).unwrap();
        assert!(matches!(command, Command::Step { count: 1 }));

        let command = Command::try_parse_from(["registers", "pc"]).unwrap();
        assert!(matches!(
            command,
            Command::Registers {
                register: Some(Reg::PC)
            }
        ));

        assert!(Command::try_parse_from(["break", "nowhere"]).is_err());
    }

    #[test]
    fn memory_count_range_test() {
        let command = Command::try_parse_from(["memory", "0", "65536"]).unwrap();
        assert!(matches!(command, Command::Memory { count: 65536, .. }));

        for count in ["0", "65537", "18446744073709551615"] {
            let error = Command::try_parse_from(["memory", "0", count]).unwrap_err();
            assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn memory_dump_whole_address_space_test() {
        let mut computer = Computer::default();
        let mut debugger = Debugger::new(&mut computer);
        let command = Command::try_parse_from(["memory", "$FFFE", "65536"]).unwrap();
        assert_eq!(debugger.execute(command), Flow::Continue);
    }

    #[test]
    fn format_dump_test() {
        let bytes: Vec<u8> = (0..10).collect();
        assert_eq!(
            format_dump(0x0020, &bytes),
            vec!["$0020  00 01 02 03 04 05 06 07", "$0028  08 09"]
        );
        assert!(format_dump(0, &[]).is_empty());
    }

    #[test]
    fn breakpoint_test() {
        let mut computer = computer("INCA\nINCA\nINCB\nINCB\nEND");
        let mut debugger = Debugger::new(&mut computer);

        debugger.execute(Command::Break {
            address: Address(0x0002),
        });
        debugger.execute(Command::Continue);
        assert_eq!(debugger.computer.registers().pc, 2);
        assert_eq!(debugger.computer.registers().a, 2);

        debugger.execute(Command::Continue);
        assert!(debugger.computer.is_halted());
        assert_eq!(debugger.computer.registers().b, 2);

        // Halted, nothing happens until a reset
        debugger.execute(Command::Step { count: 3 });
        assert_eq!(debugger.computer.steps(), 5);

        debugger.execute(Command::Reset);
        debugger.execute(Command::Unbreak {
            address: Address(0x0002),
        });
        debugger.execute(Command::Continue);
        assert_eq!(debugger.computer.steps(), 5);
    }

    #[test]
    fn step_stops_on_halt_test() {
        let mut computer = computer("NOP\nEND");
        let mut debugger = Debugger::new(&mut computer);
        debugger.execute(Command::Step { count: 10 });
        assert!(debugger.computer.is_halted());
        assert_eq!(debugger.computer.steps(), 2);
    }

    #[test]
    fn listing_test() {
        let mut computer = computer("LDA #5\nSTA $1234\nBNE -5\nEND");
        let mut debugger = Debugger::new(&mut computer);
        debugger.breakpoints.insert(0x0002);

        assert_eq!(
            debugger.listing(2),
            vec![" > $0000    LDA #$05", "B  $0002    STA $1234"]
        );
        // The next listing picks up where the last one stopped
        assert_eq!(debugger.listing(2), vec!["   $0005    BNE $0002", "   $0007    END"]);

        debugger.execute(Command::Step { count: 1 });
        assert_eq!(debugger.listing(1), vec!["B> $0002    STA $1234"]);
    }

    #[test]
    fn register_test() {
        let mut computer = computer("LDA #$80\nLDX #$BEEF\nEND");
        computer.run();
        let debugger = Debugger::new(&mut computer);

        assert_eq!(debugger.register(Some(Reg::A)), "A = $80");
        assert_eq!(debugger.register(Some(Reg::X)), "X = $BEEF");
        assert_eq!(debugger.register(Some(Reg::CC)), "CC = ---IN--- (0b00011000)");
    }

    #[test]
    fn exit_test() {
        let mut computer = Computer::default();
        let mut debugger = Debugger::new(&mut computer);
        assert_eq!(debugger.execute(Command::Exit), Flow::Exit);
        assert_eq!(debugger.execute(Command::Reset), Flow::Continue);
    }
}
