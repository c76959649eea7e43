use crate::constants as C;
use crate::opcodes::{self, Mnemonic, Operand};

/// What a single step did
///
/// Its `Display` implementation gives a human-readable trace line. The exact
/// text is meant for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    /// A regular instruction, with its resolved operand
    Executed {
        mnemonic: Mnemonic,
        operand: Operand,
        size: u8,
    },

    /// A relative branch, with its destination
    Branch {
        mnemonic: Mnemonic,
        target: C::Address,
        taken: bool,
    },

    /// The end-of-program opcode was reached
    End,

    /// An opcode outside the instruction set was fetched
    InvalidOpcode(C::Byte),

    /// The processor was already halted, nothing was done
    Halted,
}

impl Trace {
    /// Checks if the processor is halted after this step
    #[must_use]
    pub const fn is_halt(&self) -> bool {
        matches!(self, Self::End | Self::InvalidOpcode(_) | Self::Halted)
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Executed {
                mnemonic,
                operand,
                size,
            } => opcodes::write_instruction(f, mnemonic, *operand, *size),
            Self::Branch {
                mnemonic: Mnemonic::Bra,
                target,
                ..
            } => write!(f, "BRA ${target:04X}"),
            Self::Branch {
                mnemonic,
                target,
                taken: true,
            } => write!(f, "{mnemonic} ${target:04X} (taken)"),
            Self::Branch {
                mnemonic,
                target,
                taken: false,
            } => write!(f, "{mnemonic} ${target:04X} (not taken)"),
            Self::End => write!(f, "END - PROGRAM HALTED"),
            Self::InvalidOpcode(opcode) => write!(f, "INVALID OPCODE: ${opcode:02X}"),
            Self::Halted => write!(f, "CPU HALTED"),
        }
    }
}
