use tracing::{debug, trace, warn};

use crate::{constants as C, parser::Program, runtime::Memory};

/// Write a program to memory, from [`C::PROGRAM_START`]
///
/// Nothing is written after the last instruction: the program relies on the
/// zero-filled memory that follows it to decode as the end-of-program opcode.
/// Bytes that land in ROM are dropped.
#[tracing::instrument(skip_all, fields(len = program.len()))]
pub fn load(program: &Program, memory: &mut Memory) {
    for (address, instruction) in program.layout() {
        trace!(address, %instruction, "Loading instruction");
        for (offset, byte) in (0..).zip(instruction.bytes()) {
            memory.write(address.wrapping_add(offset), byte);
        }
    }

    let end = usize::from(C::PROGRAM_START) + program.len();
    if end > C::RAM_SIZE {
        warn!(end, "Program does not fit in RAM");
    }
    debug!(instructions = program.instructions().len(), "Program loaded");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::assemble;

    #[test]
    fn load_test() {
        let program = assemble("LDA #$05\nLDX #$1234\nSTA $20\nSTB $1000\nINCA\nEND").unwrap();
        let mut memory = Memory::default();
        load(&program, &mut memory);

        assert_eq!(
            memory.dump(0, 14),
            vec![0x86, 0x05, 0x8E, 0x12, 0x34, 0x97, 0x20, 0xF7, 0x10, 0x00, 0x4C, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn load_overwrites_test() {
        let mut memory = Memory::default();
        load(&assemble("NOP\nNOP\nNOP\nEND").unwrap(), &mut memory);
        load(&assemble("INCA\nEND").unwrap(), &mut memory);

        // Only the bytes of the new program are written
        assert_eq!(memory.dump(0, 4), vec![0x4C, 0x12, 0x12, 0x00]);
    }

    #[test]
    fn empty_program_test() {
        let mut memory = Memory::default();
        load(&assemble("END").unwrap(), &mut memory);
        assert_eq!(memory, Memory::default());
    }
}
