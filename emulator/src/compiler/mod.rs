use tracing::debug;

use crate::{parser::Program, runtime::Computer};

pub(crate) mod memory;

pub use self::memory::load;

/// Build a computer ready to run a program
///
/// The program is loaded in a blank memory and the processor is reset, so
/// that it starts at the address stored in the reset vector.
#[tracing::instrument(skip(program))]
#[must_use]
pub fn compile(program: &Program) -> Computer {
    let mut computer = Computer::default();
    load(program, computer.memory_mut());
    computer.reset();
    debug!(pc = computer.registers().pc, "Computer ready");
    computer
}
