use tracing::debug;

use super::{Computer, ConditionCodes, State, Trace};
use crate::constants as C;
use crate::opcodes::{self, Mnemonic, Mode, OpcodeInfo, Operand};

/// One of the two 8-bit accumulators
#[derive(Debug, Clone, Copy)]
enum Accumulator {
    A,
    B,
}

impl Computer {
    fn accumulator(&mut self, acc: Accumulator) -> &mut C::Byte {
        match acc {
            Accumulator::A => &mut self.registers.a,
            Accumulator::B => &mut self.registers.b,
        }
    }

    /// Read the operand bytes following the opcode
    ///
    /// This always consumes exactly `info.operand_len()` bytes.
    fn fetch_operand(&mut self, info: &OpcodeInfo) -> Operand {
        match info.mode {
            Mode::Inherent => Operand::Inherent,
            Mode::Immediate if info.size == 3 => Operand::Immediate(self.fetch_word()),
            Mode::Immediate => Operand::Immediate(self.fetch_byte().into()),
            Mode::Direct => Operand::Direct(self.fetch_byte()),
            Mode::Extended => Operand::Extended(self.fetch_word()),
        }
    }

    /// The address an operand points to, if any
    ///
    /// Direct addresses are taken as is, the direct page register is not used.
    fn effective_address(operand: Operand) -> Option<C::Address> {
        match operand {
            Operand::Direct(address) => Some(address.into()),
            Operand::Extended(address) => Some(address),
            Operand::Inherent | Operand::Immediate(_) => None,
        }
    }

    /// Resolve an 8-bit source operand
    fn read_byte_operand(&self, operand: Operand) -> C::Byte {
        match Self::effective_address(operand) {
            Some(address) => self.memory.read(address),
            None => operand.value().to_be_bytes()[1],
        }
    }

    /// Resolve a 16-bit source operand
    fn read_word_operand(&self, operand: Operand) -> C::Word {
        match Self::effective_address(operand) {
            Some(address) => self.memory.read_word(address),
            None => operand.value(),
        }
    }

    fn load(&mut self, acc: Accumulator, operand: Operand) {
        let value = self.read_byte_operand(operand);
        *self.accumulator(acc) = value;
        self.registers.cc.update_nz(value);
    }

    fn store(&mut self, acc: Accumulator, operand: Operand) {
        let value = *self.accumulator(acc);
        if let Some(address) = Self::effective_address(operand) {
            self.memory.write(address, value);
        }
    }

    fn add(&mut self, acc: Accumulator, operand: Operand) {
        let value = self.read_byte_operand(operand);
        let current = *self.accumulator(acc);
        let (result, carry) = current.overflowing_add(value);
        debug!("{} + {} = {}", current, value, result);

        *self.accumulator(acc) = result;
        self.registers.cc.update_nz(result);
        self.registers.cc.set(ConditionCodes::CARRY, carry);
    }

    fn sub(&mut self, acc: Accumulator, operand: Operand) {
        let value = self.read_byte_operand(operand);
        let current = *self.accumulator(acc);
        let (result, borrow) = current.overflowing_sub(value);
        debug!("{} - {} = {}", current, value, result);

        *self.accumulator(acc) = result;
        self.registers.cc.update_nz(result);
        self.registers.cc.set(ConditionCodes::CARRY, borrow);
    }

    /// Increment or decrement an accumulator, leaving the carry untouched
    fn adjust(&mut self, acc: Accumulator, delta: i8) {
        let value = self.accumulator(acc).wrapping_add_signed(delta);
        *self.accumulator(acc) = value;
        self.registers.cc.update_nz(value);
    }

    /// Apply a relative branch, the offset having already been fetched
    fn branch(&mut self, mnemonic: Mnemonic, operand: Operand, taken: bool) -> Trace {
        let offset = operand.value().to_be_bytes()[1];
        let target = opcodes::relative_target(self.registers.pc, offset);
        if taken {
            debug!("Jumping to address {:#06x}", target);
            self.registers.pc = target;
        }

        Trace::Branch {
            mnemonic,
            target,
            taken,
        }
    }

    /// Execute a decoded instruction, `%pc` pointing right after its opcode
    pub(crate) fn execute(&mut self, info: &OpcodeInfo) -> Trace {
        use Accumulator::{A, B};

        let operand = self.fetch_operand(info);
        let zero = self.registers.cc.contains(ConditionCodes::ZERO);

        match info.mnemonic {
            Mnemonic::Lda => self.load(A, operand),
            Mnemonic::Ldb => self.load(B, operand),
            Mnemonic::Ldx => {
                let value = self.read_word_operand(operand);
                self.registers.x = value;
                self.registers.cc.update_nz16(value);
            }

            Mnemonic::Sta => self.store(A, operand),
            Mnemonic::Stb => self.store(B, operand),
            Mnemonic::Stx => {
                if let Some(address) = Self::effective_address(operand) {
                    self.memory.write_word(address, self.registers.x);
                }
            }

            Mnemonic::Adda => self.add(A, operand),
            Mnemonic::Addb => self.add(B, operand),
            Mnemonic::Suba => self.sub(A, operand),
            Mnemonic::Subb => self.sub(B, operand),

            Mnemonic::Inca => self.adjust(A, 1),
            Mnemonic::Incb => self.adjust(B, 1),
            Mnemonic::Deca => self.adjust(A, -1),
            Mnemonic::Decb => self.adjust(B, -1),

            Mnemonic::Bra => return self.branch(info.mnemonic, operand, true),
            Mnemonic::Beq => return self.branch(info.mnemonic, operand, zero),
            Mnemonic::Bne => return self.branch(info.mnemonic, operand, !zero),

            Mnemonic::Nop => {}

            Mnemonic::End => {
                self.state = State::Halted;
                return Trace::End;
            }
        }

        Trace::Executed {
            mnemonic: info.mnemonic,
            operand,
            size: info.size,
        }
    }
}
