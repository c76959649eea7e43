use std::str::FromStr;

use m6809_emulator::constants as C;
use m6809_emulator::parser::parse_literal;
use nom::combinator::all_consuming;
use nom::Finish;
use thiserror::Error;

/// A memory address typed by the user, either `$hex` or decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(pub C::Address);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("invalid address \"{0}\", expected a number like $1F or 31")]
    Invalid(String),

    #[error("address {0} is out of range")]
    OutOfRange(i32),
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, value) = all_consuming(parse_literal::<()>)(s.trim())
            .finish()
            .map_err(|()| ParseAddressError::Invalid(s.to_owned()))?;

        C::Address::try_from(value)
            .map(Address)
            .map_err(|_| ParseAddressError::OutOfRange(value))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_address_test() {
        assert_eq!("$20".parse(), Ok(Address(0x20)));
        assert_eq!("$ffFE".parse(), Ok(Address(0xFFFE)));
        assert_eq!("4096".parse(), Ok(Address(0x1000)));
        assert_eq!(
            "65536".parse::<Address>(),
            Err(ParseAddressError::OutOfRange(65536))
        );
        assert_eq!(
            "-1".parse::<Address>(),
            Err(ParseAddressError::OutOfRange(-1))
        );
        assert_eq!(
            "%a".parse::<Address>(),
            Err(ParseAddressError::Invalid("%a".into()))
        );
    }
}
