use nom::combinator::all_consuming;
use nom::Finish;

use super::errors::{LineError, LiteralError};
use super::literal::parse_literal;
use super::parse_identifier;
use crate::constants as C;
use crate::opcodes::{self, Mnemonic, Mode, OpcodeInfo, Operand};

/// One assembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    mnemonic: String,
    operand: Operand,
    info: Option<&'static OpcodeInfo>,
}

impl Instruction {
    /// Build an instruction, looking up its encoding
    ///
    /// A mnemonic/mode pair that is not in the encoding table is encoded as
    /// the end-of-program sentinel, keeping the size of its addressing mode.
    #[must_use]
    pub fn new(mnemonic: &str, operand: Operand) -> Self {
        let mnemonic = mnemonic.to_uppercase();
        let info = mnemonic
            .parse::<Mnemonic>()
            .ok()
            .and_then(|m| opcodes::encode(m, operand.mode()));

        Self {
            mnemonic,
            operand,
            info,
        }
    }

    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    #[must_use]
    pub fn operand(&self) -> Operand {
        self.operand
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.operand.mode()
    }

    /// Checks if the instruction has a proper encoding
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.info.is_some()
    }

    #[must_use]
    pub fn opcode(&self) -> C::Byte {
        self.info.map_or(opcodes::SENTINEL, |info| info.opcode)
    }

    /// Encoded size in bytes
    #[must_use]
    pub fn size(&self) -> u8 {
        self.info
            .map_or_else(|| self.operand.mode().size(), |info| info.size)
    }

    /// The encoded bytes: the opcode, then the operand (big-endian for 16-bit
    /// operands, low byte only for 8-bit operands)
    #[must_use]
    pub fn bytes(&self) -> Vec<C::Byte> {
        let [high, low] = self.operand.value().to_be_bytes();
        match self.size() {
            1 => vec![self.opcode()],
            2 => vec![self.opcode(), low],
            _ => vec![self.opcode(), high, low],
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        opcodes::write_instruction(f, &self.mnemonic, self.operand, self.size())
    }
}

/// An assembled program, ready to be loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Total encoded size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions
            .iter()
            .map(|i| usize::from(i.size()))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Iterate over the instructions along with their load address
    pub fn layout(&self) -> impl Iterator<Item = (C::Address, &Instruction)> + '_ {
        self.instructions
            .iter()
            .scan(C::PROGRAM_START, |address, instruction| {
                let current = *address;
                *address = address.wrapping_add(instruction.size().into());
                Some((current, instruction))
            })
    }

    /// The whole program, encoded
    #[must_use]
    pub fn bytes(&self) -> Vec<C::Byte> {
        self.instructions.iter().flat_map(Instruction::bytes).collect()
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        write!(f, "END")
    }
}

/// Parse a number literal, telling malformed and out-of-range literals apart
fn parse_value(literal: &str) -> Result<i32, LineError> {
    match all_consuming(parse_literal::<LiteralError<&str>>)(literal).finish() {
        Ok((_, value)) => Ok(value),
        Err(LiteralError::ParseIntError { inner, .. }) => Err(LineError::LiteralOutOfRange {
            literal: literal.to_owned(),
            source: inner,
        }),
        Err(LiteralError::Nom { .. }) => Err(LineError::InvalidLiteral(literal.to_owned())),
    }
}

fn parse_operand(token: &str) -> Result<Operand, LineError> {
    if let Some(value) = token.strip_prefix('#') {
        parse_value(value).map(Operand::immediate)
    } else {
        parse_value(token).map(Operand::address)
    }
}

/// Parse a single line, already stripped from its comment and whitespace
pub(crate) fn parse_line(line: &str) -> Result<Instruction, LineError> {
    let mut tokens = line.split_whitespace();
    let mnemonic = tokens.next().unwrap_or_default();

    if all_consuming(parse_identifier::<()>)(mnemonic).is_err() {
        return Err(LineError::InvalidMnemonic(mnemonic.to_owned()));
    }

    let operand = match (tokens.next(), tokens.next()) {
        (_, Some(extra)) => return Err(LineError::UnexpectedToken(extra.to_owned())),
        (Some(token), None) => parse_operand(token)?,
        (None, None) => {
            let inherent = mnemonic
                .to_uppercase()
                .parse::<Mnemonic>()
                .is_ok_and(Mnemonic::is_inherent);

            if !inherent {
                return Err(LineError::MissingOperand(mnemonic.to_uppercase()));
            }
            Operand::Inherent
        }
    };

    Ok(Instruction::new(mnemonic, operand))
}
