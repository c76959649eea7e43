use tracing::{debug, info, warn};

use crate::constants as C;
use crate::opcodes;

mod instructions;
mod memory;
mod registers;
mod trace;

pub use self::memory::{Memory, Ram, Rom};
pub use self::registers::{ConditionCodes, Reg, RegisterParseError, Registers};
pub use self::trace::Trace;

/// Execution state of the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Running,

    /// Only a reset gets the processor out of this state
    Halted,
}

/// A processor and the memory it is attached to
///
/// Each computer owns its registers and memory, nothing is shared between
/// instances.
#[derive(Clone)]
pub struct Computer {
    registers: Registers,
    memory: Memory,
    state: State,
    steps: usize,
}

impl Default for Computer {
    fn default() -> Self {
        Self::new(Memory::default())
    }
}

impl std::fmt::Debug for Computer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Computer {{ registers: {:?}, state: {:?}, memory: [...] }}",
            self.registers, self.state
        )
    }
}

impl Computer {
    /// Build a computer around a memory and reset it
    #[must_use]
    pub fn new(memory: Memory) -> Self {
        let mut computer = Self {
            registers: Registers::default(),
            memory,
            state: State::Running,
            steps: 0,
        };
        computer.reset();
        computer
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to the memory, used to load programs
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Number of instructions executed since the last reset
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Put the registers back to their power-on values
    ///
    /// The program counter is loaded from the reset vector. The memory is
    /// left untouched.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        let pc = self.memory.read_word(C::RESET_VECTOR);
        debug!(pc, "Reset");
        self.registers = Registers {
            pc,
            ..Registers::default()
        };
        self.state = State::Running;
        self.steps = 0;
    }

    fn halt(&mut self) {
        self.state = State::Halted;
    }

    /// Read the byte at `%pc` and move past it
    fn fetch_byte(&mut self) -> C::Byte {
        let value = self.memory.read(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        value
    }

    /// Read the big-endian word at `%pc` and move past it
    fn fetch_word(&mut self) -> C::Word {
        let high = self.fetch_byte();
        let low = self.fetch_byte();
        C::Word::from_be_bytes([high, low])
    }

    /// Execute the next instruction
    ///
    /// When halted, nothing happens and [`Trace::Halted`] is returned.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn step(&mut self) -> Trace {
        if self.is_halted() {
            return Trace::Halted;
        }

        let address = self.registers.pc;
        let opcode = self.fetch_byte();
        let trace = if let Some(info) = opcodes::decode(opcode) {
            self.execute(info)
        } else {
            warn!(address, opcode, "Invalid opcode, halting");
            self.halt();
            Trace::InvalidOpcode(opcode)
        };

        self.steps += 1;
        info!(address, "{}", trace);
        debug!("Register state {}", self.registers);
        trace
    }

    /// Step until the processor halts, returning the number of steps
    ///
    /// This never returns if the program loops forever. Drive [`Self::step`]
    /// directly to keep control between instructions.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> usize {
        let mut count = 0;
        while !self.is_halted() {
            self.step();
            count += 1;
        }
        count
    }
}
