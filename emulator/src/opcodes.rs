//! Instruction encoding table
//!
//! This is the only place where opcodes are mapped to mnemonics and
//! addressing modes. The assembler uses it to encode instructions, the
//! processor to decode them and the disassembler to list them.

use parse_display::{Display, FromStr};

use crate::constants as C;
use crate::runtime::Memory;

/// The documented instruction subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
#[display(style = "UPPERCASE")]
pub enum Mnemonic {
    /// Load accumulator A
    Lda,
    /// Load accumulator B
    Ldb,
    /// Load index register X
    Ldx,
    /// Store accumulator A
    Sta,
    /// Store accumulator B
    Stb,
    /// Store index register X
    Stx,
    /// Add to accumulator A
    Adda,
    /// Add to accumulator B
    Addb,
    /// Subtract from accumulator A
    Suba,
    /// Subtract from accumulator B
    Subb,
    /// Increment accumulator A
    Inca,
    /// Increment accumulator B
    Incb,
    /// Decrement accumulator A
    Deca,
    /// Decrement accumulator B
    Decb,
    /// Branch always
    Bra,
    /// Branch if equal (Z set)
    Beq,
    /// Branch if not equal (Z clear)
    Bne,
    /// No-op
    Nop,
    /// End of program, halts the processor
    End,
}

impl Mnemonic {
    /// Mnemonics that are valid without an operand
    pub const INHERENT: [Mnemonic; 5] = [
        Mnemonic::Nop,
        Mnemonic::Inca,
        Mnemonic::Incb,
        Mnemonic::Deca,
        Mnemonic::Decb,
    ];

    /// Checks if this mnemonic can be written without an operand
    #[must_use]
    pub fn is_inherent(self) -> bool {
        Self::INHERENT.contains(&self)
    }

    /// Checks if the operand byte is a relative branch offset
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(self, Mnemonic::Bra | Mnemonic::Beq | Mnemonic::Bne)
    }
}

/// How an instruction operand is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(style = "UPPERCASE")]
pub enum Mode {
    /// No operand
    Inherent,
    /// Literal value
    Immediate,
    /// 8-bit address (branches store their relative offset here too)
    Direct,
    /// 16-bit address
    Extended,
}

impl Mode {
    /// Encoded size in bytes of an instruction in this mode
    #[must_use]
    pub const fn size(self) -> u8 {
        match self {
            Mode::Inherent => 1,
            Mode::Immediate | Mode::Direct => 2,
            Mode::Extended => 3,
        }
    }
}

/// One entry of the encoding table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub opcode: C::Byte,
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    /// Total size, opcode included
    pub size: u8,
}

impl OpcodeInfo {
    const fn new(opcode: C::Byte, mnemonic: Mnemonic, mode: Mode) -> Self {
        Self {
            opcode,
            mnemonic,
            mode,
            size: mode.size(),
        }
    }

    /// Entry with a 16-bit immediate operand
    ///
    /// Only `LDX #` uses it. The operand is encoded as a full big-endian
    /// word, so `LDX #$1234` assembles to `8E 12 34`, one byte longer than
    /// the other immediate instructions. Listings of tools that truncate it
    /// to `8E 34` will not match byte for byte.
    const fn wide(opcode: C::Byte, mnemonic: Mnemonic) -> Self {
        Self {
            opcode,
            mnemonic,
            mode: Mode::Immediate,
            size: 3,
        }
    }

    /// Number of operand bytes following the opcode
    #[must_use]
    pub const fn operand_len(&self) -> u8 {
        self.size - 1
    }
}

/// Opcode of the end-of-program sentinel, also used for unknown encodings
pub const SENTINEL: C::Byte = 0x00;

#[rustfmt::skip]
pub static OPCODES: [OpcodeInfo; 36] = {
    use Mnemonic::*;
    use Mode::*;
    [
        OpcodeInfo::new(0x86, Lda, Immediate),
        OpcodeInfo::new(0x96, Lda, Direct),
        OpcodeInfo::new(0xB6, Lda, Extended),
        OpcodeInfo::new(0xC6, Ldb, Immediate),
        OpcodeInfo::new(0xD6, Ldb, Direct),
        OpcodeInfo::new(0xF6, Ldb, Extended),
        OpcodeInfo::wide(0x8E, Ldx),
        OpcodeInfo::new(0x9E, Ldx, Direct),
        OpcodeInfo::new(0xBE, Ldx, Extended),

        OpcodeInfo::new(0x97, Sta, Direct),
        OpcodeInfo::new(0xB7, Sta, Extended),
        OpcodeInfo::new(0xD7, Stb, Direct),
        OpcodeInfo::new(0xF7, Stb, Extended),
        OpcodeInfo::new(0x9F, Stx, Direct),
        OpcodeInfo::new(0xBF, Stx, Extended),

        OpcodeInfo::new(0x8B, Adda, Immediate),
        OpcodeInfo::new(0x9B, Adda, Direct),
        OpcodeInfo::new(0xBB, Adda, Extended),
        OpcodeInfo::new(0xCB, Addb, Immediate),
        OpcodeInfo::new(0xDB, Addb, Direct),
        OpcodeInfo::new(0xFB, Addb, Extended),
        OpcodeInfo::new(0x80, Suba, Immediate),
        OpcodeInfo::new(0x90, Suba, Direct),
        OpcodeInfo::new(0xB0, Suba, Extended),
        OpcodeInfo::new(0xC0, Subb, Immediate),
        OpcodeInfo::new(0xD0, Subb, Direct),
        OpcodeInfo::new(0xF0, Subb, Extended),

        OpcodeInfo::new(0x4C, Inca, Inherent),
        OpcodeInfo::new(0x5C, Incb, Inherent),
        OpcodeInfo::new(0x4A, Deca, Inherent),
        OpcodeInfo::new(0x5A, Decb, Inherent),

        OpcodeInfo::new(0x20, Bra, Direct),
        OpcodeInfo::new(0x27, Beq, Direct),
        OpcodeInfo::new(0x26, Bne, Direct),

        OpcodeInfo::new(0x12, Nop, Inherent),
        OpcodeInfo::new(SENTINEL, End, Inherent),
    ]
};

/// Find the encoding of a mnemonic in a given mode
#[must_use]
pub fn encode(mnemonic: Mnemonic, mode: Mode) -> Option<&'static OpcodeInfo> {
    OPCODES
        .iter()
        .find(|info| info.mnemonic == mnemonic && info.mode == mode)
}

/// Find what an opcode byte means
#[must_use]
pub fn decode(opcode: C::Byte) -> Option<&'static OpcodeInfo> {
    OPCODES.iter().find(|info| info.opcode == opcode)
}

/// An instruction operand, tagged with its addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    Inherent,

    /// `#value`
    Immediate(C::Word),

    /// An address that fits in 8 bits
    Direct(C::Byte),

    /// Any other address
    Extended(C::Address),
}

impl Operand {
    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::Inherent => Mode::Inherent,
            Self::Immediate(_) => Mode::Immediate,
            Self::Direct(_) => Mode::Direct,
            Self::Extended(_) => Mode::Extended,
        }
    }

    /// The operand value, widened to 16 bits
    #[must_use]
    pub fn value(self) -> C::Word {
        match self {
            Self::Inherent => 0,
            Self::Immediate(v) | Self::Extended(v) => v,
            Self::Direct(v) => v.into(),
        }
    }

    /// Build an address operand from a parsed value
    ///
    /// The addressing mode only depends on the magnitude of the value:
    /// anything up to `0xFF` (negative values included) is a direct address.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn address(value: i32) -> Self {
        if value <= 0xFF {
            Self::Direct((value & 0xFF) as C::Byte)
        } else {
            Self::Extended((value & 0xFFFF) as C::Address)
        }
    }

    /// Build an immediate operand from a parsed value
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn immediate(value: i32) -> Self {
        Self::Immediate((value & 0xFFFF) as C::Word)
    }
}

/// Write an instruction in assembler syntax
///
/// `size` is the encoded size, used to tell 8 and 16-bit immediates apart.
pub(crate) fn write_instruction(
    f: &mut std::fmt::Formatter<'_>,
    mnemonic: &dyn std::fmt::Display,
    operand: Operand,
    size: u8,
) -> std::fmt::Result {
    match operand {
        Operand::Inherent => write!(f, "{mnemonic}"),
        Operand::Immediate(v) if size == 3 => write!(f, "{mnemonic} #${v:04X}"),
        Operand::Immediate(v) => write!(f, "{mnemonic} #${v:02X}"),
        Operand::Direct(v) => write!(f, "{mnemonic} ${v:02X}"),
        Operand::Extended(v) => write!(f, "{mnemonic} ${v:04X}"),
    }
}

/// An instruction read back from memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembled {
    pub address: C::Address,
    pub bytes: Vec<C::Byte>,
    /// `None` if the opcode is not part of the table
    pub info: Option<&'static OpcodeInfo>,
}

impl Disassembled {
    /// Number of bytes taken by the instruction (1 for unknown opcodes)
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn operand(&self, mode: Mode) -> Operand {
        let value = self
            .bytes
            .iter()
            .skip(1)
            .fold(0, |acc, &b| (acc << 8) | C::Word::from(b));
        let [_, low] = value.to_be_bytes();

        match mode {
            Mode::Inherent => Operand::Inherent,
            Mode::Immediate => Operand::Immediate(value),
            Mode::Direct => Operand::Direct(low),
            Mode::Extended => Operand::Extended(value),
        }
    }
}

impl std::fmt::Display for Disassembled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(info) = self.info else {
            return write!(f, "FCB ${:02X}", self.bytes.first().copied().unwrap_or(0));
        };

        if info.mnemonic.is_branch() {
            let target = relative_target(
                self.address.wrapping_add(C::Address::from(info.size)),
                self.bytes.get(1).copied().unwrap_or(0),
            );
            return write!(f, "{} ${target:04X}", info.mnemonic);
        }

        write_instruction(f, &info.mnemonic, self.operand(info.mode), info.size)
    }
}

/// Compute the destination of a relative branch
///
/// The offset is sign-extended from bit 7 and added to the address following
/// the branch instruction.
#[must_use]
pub fn relative_target(next: C::Address, offset: C::Byte) -> C::Address {
    #[allow(clippy::cast_possible_wrap)]
    let offset = i16::from(offset as i8);
    next.wrapping_add_signed(offset)
}

/// Decode the instruction stored at an address
#[must_use]
pub fn disassemble(memory: &Memory, address: C::Address) -> Disassembled {
    let opcode = memory.read(address);
    let info = decode(opcode);
    let len = info.map_or(1, |info| usize::from(info.size));
    Disassembled {
        address,
        bytes: memory.dump(address, len),
        info,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn table_is_consistent_test() {
        for (i, a) in OPCODES.iter().enumerate() {
            for b in &OPCODES[i + 1..] {
                assert_ne!(a.opcode, b.opcode, "duplicate opcode {:#04x}", a.opcode);
                assert!(
                    a.mnemonic != b.mnemonic || a.mode != b.mode,
                    "duplicate encoding for {} {}",
                    a.mnemonic,
                    a.mode
                );
            }
        }
    }

    #[test]
    fn encode_test() {
        assert_eq!(encode(Mnemonic::Lda, Mode::Immediate).map(|i| i.opcode), Some(0x86));
        assert_eq!(encode(Mnemonic::Stx, Mode::Extended).map(|i| i.opcode), Some(0xBF));
        assert_eq!(encode(Mnemonic::Bne, Mode::Direct).map(|i| i.opcode), Some(0x26));
        assert_eq!(encode(Mnemonic::Sta, Mode::Immediate), None);
        assert_eq!(encode(Mnemonic::Inca, Mode::Direct), None);
    }

    #[test]
    fn decode_test() {
        let info = decode(0xB6).unwrap();
        assert_eq!(info.mnemonic, Mnemonic::Lda);
        assert_eq!(info.mode, Mode::Extended);
        assert_eq!(info.size, 3);

        assert_eq!(decode(0x8E).map(|i| i.size), Some(3));
        assert_eq!(decode(0x00).map(|i| i.mnemonic), Some(Mnemonic::End));
        assert_eq!(decode(0x01), None);
        assert_eq!(decode(0xFF), None);
    }

    #[test]
    fn sizes_test() {
        assert_eq!(Mode::Inherent.size(), 1);
        assert_eq!(Mode::Immediate.size(), 2);
        assert_eq!(Mode::Direct.size(), 2);
        assert_eq!(Mode::Extended.size(), 3);
    }

    #[test]
    fn mnemonic_parse_test() {
        assert_eq!("ADDA".parse::<Mnemonic>().ok(), Some(Mnemonic::Adda));
        assert_eq!("END".parse::<Mnemonic>().ok(), Some(Mnemonic::End));
        assert!("FOO".parse::<Mnemonic>().is_err());
        assert_eq!(Mnemonic::Decb.to_string(), "DECB");
        assert!(Mnemonic::Nop.is_inherent());
        assert!(!Mnemonic::End.is_inherent());
    }

    #[test]
    fn relative_target_test() {
        assert_eq!(relative_target(0x0010, 0x05), 0x0015);
        assert_eq!(relative_target(0x0010, 0xFE), 0x000E);
        assert_eq!(relative_target(0x0001, 0x80), 0xFF81);
        assert_eq!(relative_target(0xFFFF, 0x02), 0x0001);
    }

    #[test]
    fn disassemble_test() {
        let mut memory = Memory::default();
        for (address, byte) in [0x86, 0x05, 0xB7, 0x12, 0x34, 0x26, 0xFB, 0x8E, 0xBE, 0xEF, 0x42]
            .into_iter()
            .enumerate()
        {
            memory.write(address.try_into().unwrap(), byte);
        }

        let mut address = 0;
        let mut listing = Vec::new();
        for _ in 0..6 {
            let inst = disassemble(&memory, address);
            address += C::Address::try_from(inst.len()).unwrap();
            listing.push(inst.to_string());
        }

        assert_eq!(
            listing,
            vec![
                "LDA #$05",
                "STA $1234",
                "BNE $0002",
                "LDX #$BEEF",
                "FCB $42",
                "END",
            ]
        );
    }
}
