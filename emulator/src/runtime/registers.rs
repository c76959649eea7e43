use bitflags::bitflags;
use parse_display::Display;
use thiserror::Error;

use crate::constants as C;

bitflags! {
    /// The condition code register
    ///
    /// Only `NEGATIVE`, `ZERO` and `CARRY` are computed by the instruction set.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ConditionCodes: C::Byte {
        const CARRY        = 0b0000_0001;
        const OVERFLOW     = 0b0000_0010;
        const ZERO         = 0b0000_0100;
        const NEGATIVE     = 0b0000_1000;
        const IRQ_MASK     = 0b0001_0000;
        const HALF_CARRY   = 0b0010_0000;
        const FIRQ_MASK    = 0b0100_0000;
        const ENTIRE_STATE = 0b1000_0000;
    }
}

impl Default for ConditionCodes {
    fn default() -> Self {
        // On reset, only the IRQ mask is set
        ConditionCodes::from_bits_retain(C::RESET_CONDITION_CODES)
    }
}

impl ConditionCodes {
    /// Set N and Z from an 8-bit result
    pub fn update_nz(&mut self, value: C::Byte) {
        self.set(ConditionCodes::ZERO, value == 0);
        self.set(ConditionCodes::NEGATIVE, value & 0x80 != 0);
    }

    /// Set N and Z from a 16-bit result
    pub fn update_nz16(&mut self, value: C::Word) {
        self.set(ConditionCodes::ZERO, value == 0);
        self.set(ConditionCodes::NEGATIVE, value & 0x8000 != 0);
    }
}

impl std::fmt::Debug for ConditionCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010b}", self.bits())
    }
}

impl std::fmt::Display for ConditionCodes {
    /// Shows the flags as `EFHINZVC`, with a dash for cleared bits
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(ConditionCodes, char); 8] = [
            (ConditionCodes::ENTIRE_STATE, 'E'),
            (ConditionCodes::FIRQ_MASK, 'F'),
            (ConditionCodes::HALF_CARRY, 'H'),
            (ConditionCodes::IRQ_MASK, 'I'),
            (ConditionCodes::NEGATIVE, 'N'),
            (ConditionCodes::ZERO, 'Z'),
            (ConditionCodes::OVERFLOW, 'V'),
            (ConditionCodes::CARRY, 'C'),
        ];

        for (flag, name) in NAMES {
            let c = if self.contains(flag) { name } else { '-' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator, high half of `D`
    pub a: C::Byte,

    /// Accumulator, low half of `D`
    pub b: C::Byte,

    /// Direct page
    pub dp: C::Byte,

    /// Condition codes
    pub cc: ConditionCodes,

    /// Index register
    pub x: C::Word,

    /// Index register
    pub y: C::Word,

    /// System stack pointer
    pub s: C::Word,

    /// User stack pointer
    pub u: C::Word,

    /// Program counter
    pub pc: C::Address,
}

impl Registers {
    /// The 16-bit `D` register, made of `A` (high) and `B` (low)
    #[must_use]
    pub fn d(&self) -> C::Word {
        C::Word::from_be_bytes([self.a, self.b])
    }

    pub fn set_d(&mut self, value: C::Word) {
        [self.a, self.b] = value.to_be_bytes();
    }

    /// Read any register, widened to 16 bits
    #[must_use]
    pub fn get(&self, reg: Reg) -> C::Word {
        match reg {
            Reg::A => self.a.into(),
            Reg::B => self.b.into(),
            Reg::D => self.d(),
            Reg::DP => self.dp.into(),
            Reg::CC => self.cc.bits().into(),
            Reg::X => self.x,
            Reg::Y => self.y,
            Reg::S => self.s,
            Reg::U => self.u,
            Reg::PC => self.pc,
        }
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A = ${:02X} | B = ${:02X} | DP = ${:02X} | CC = {} | X = ${:04X} | Y = ${:04X} | S = ${:04X} | U = ${:04X} | PC = ${:04X}",
            self.a, self.b, self.dp, self.cc, self.x, self.y, self.s, self.u, self.pc
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "UPPERCASE")]
pub enum Reg {
    /// Accumulator
    A,

    /// Accumulator
    B,

    /// `A:B` pair
    D,

    /// Direct page
    DP,

    /// Condition codes
    CC,

    /// Index register
    X,

    /// Index register
    Y,

    /// System stack pointer
    S,

    /// User stack pointer
    U,

    /// Program counter
    PC,
}

impl Reg {
    /// Width of the register in bits
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Reg::A | Reg::B | Reg::DP | Reg::CC => 8,
            Reg::D | Reg::X | Reg::Y | Reg::S | Reg::U | Reg::PC => 16,
        }
    }
}

#[derive(Error, Debug)]
#[error("could not parse register")]
pub struct RegisterParseError;

impl std::str::FromStr for Reg {
    type Err = RegisterParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" => Ok(Reg::A),
            "b" => Ok(Reg::B),
            "d" => Ok(Reg::D),
            "dp" => Ok(Reg::DP),
            "cc" => Ok(Reg::CC),
            "x" => Ok(Reg::X),
            "y" => Ok(Reg::Y),
            "s" => Ok(Reg::S),
            "u" => Ok(Reg::U),
            "pc" => Ok(Reg::PC),
            _ => Err(RegisterParseError),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn update_nz_test() {
        let mut cc = ConditionCodes::empty();
        for value in 0..=u8::MAX {
            cc.update_nz(value);
            assert_eq!(cc.contains(ConditionCodes::ZERO), value == 0);
            assert_eq!(cc.contains(ConditionCodes::NEGATIVE), value >= 0x80);
        }
    }

    #[test]
    fn update_nz16_test() {
        let mut cc = ConditionCodes::empty();
        for value in [0x0000, 0x0001, 0x00FF, 0x7FFF, 0x8000, 0xFFFF] {
            cc.update_nz16(value);
            assert_eq!(cc.contains(ConditionCodes::ZERO), value == 0);
            assert_eq!(cc.contains(ConditionCodes::NEGATIVE), value >= 0x8000);
        }
    }

    #[test]
    fn update_nz_keeps_other_flags_test() {
        let mut cc = ConditionCodes::CARRY | ConditionCodes::IRQ_MASK;
        cc.update_nz(0);
        assert_eq!(
            cc,
            ConditionCodes::CARRY | ConditionCodes::IRQ_MASK | ConditionCodes::ZERO
        );
    }

    #[test]
    fn default_test() {
        let registers = Registers::default();
        assert_eq!(registers.cc.bits(), 0x10);
        assert_eq!(format!("{}", registers.cc), "---I----");
    }

    #[test]
    fn d_register_test() {
        let mut registers = Registers::default();
        registers.set_d(0x1234);
        assert_eq!(registers.a, 0x12);
        assert_eq!(registers.b, 0x34);
        assert_eq!(registers.d(), 0x1234);
        assert_eq!(registers.get(Reg::D), 0x1234);
    }

    #[test]
    fn parse_register_test() {
        assert_eq!("a".parse::<Reg>().ok(), Some(Reg::A));
        assert_eq!("PC".parse::<Reg>().ok(), Some(Reg::PC));
        assert_eq!("Dp".parse::<Reg>().ok(), Some(Reg::DP));
        assert!("%a".parse::<Reg>().is_err());
        assert_eq!(Reg::PC.to_string(), "PC");
    }
}
