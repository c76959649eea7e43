//! Parse number literals.
//!
//! It parses base 10 (with an optional sign) and base 16 (prefixed by `$`)
//! number literals.

use std::num::ParseIntError;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, one_of},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

use super::ParseError;

/// Parse a decimal number
fn from_decimal(input: &str) -> Result<i32, ParseIntError> {
    i32::from_str(input)
}

/// Check if character is a decimal digit
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Extract a decimal literal, sign included
fn take_decimal_literal<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(pair(opt(one_of("+-")), take_while1(is_digit)))(input)
}

/// Parse a hexadecimal number
fn from_hexadecimal(input: &str) -> Result<i32, ParseIntError> {
    i32::from_str_radix(input, 16)
}

/// Check if character is a hexadecimal digit
fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Extract a hexadecimal literal
fn take_hexadecimal_literal<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    preceded(char('$'), take_while1(is_hex_digit))(input)
}

/// Parse a number literal
pub fn parse_literal<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, i32, E> {
    alt((
        map_res(take_hexadecimal_literal, from_hexadecimal),
        map_res(take_decimal_literal, from_decimal),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    type R<'a, T> = IResult<&'a str, T, ()>;

    #[test]
    fn from_decimal_test() {
        assert_eq!(from_decimal("16"), Ok(16));
        assert_eq!(from_decimal("-5"), Ok(-5));
        assert_eq!(from_decimal("+5"), Ok(5));
        assert!(from_decimal("2147483648").is_err()); // Upper boundary
        assert!(from_decimal("foo").is_err());
    }

    #[test]
    fn is_digit_test() {
        for c in '0'..='9' {
            assert!(is_digit(c));
        }

        for c in ('a'..='z').chain('A'..='Z') {
            assert!(!is_digit(c));
        }
    }

    #[test]
    fn from_hexadecimal_test() {
        assert_eq!(from_hexadecimal("4F"), Ok(0x4f));
        assert_eq!(from_hexadecimal("4f"), Ok(0x4f)); // Lower case works
        assert_eq!(from_hexadecimal("7fffffff"), Ok(i32::MAX)); // Upper boundary
        assert!(from_hexadecimal("80000000").is_err()); // Out of bounds
        assert!(from_hexadecimal("foo").is_err());
    }

    #[test]
    fn is_hex_digit_test() {
        for c in ('0'..='9').chain('a'..='f').chain('A'..='F') {
            assert!(is_hex_digit(c));
        }

        for c in ('g'..='z').chain('G'..='Z') {
            assert!(!is_hex_digit(c));
        }
    }

    #[test]
    fn take_hexadecimal_literal_test() {
        assert_eq!(take_hexadecimal_literal("$4F"), R::Ok(("", "4F")));
        assert_eq!(take_hexadecimal_literal("$ffff"), R::Ok(("", "ffff")));
        assert_eq!(take_hexadecimal_literal("$12 ;"), R::Ok((" ;", "12")));
        assert!(take_hexadecimal_literal::<()>("$invalid").is_err()); // Invalid
        assert!(take_hexadecimal_literal::<()>("ffff").is_err()); // No prefix
    }

    #[test]
    fn take_decimal_literal_test() {
        assert_eq!(take_decimal_literal("42"), R::Ok(("", "42")));
        assert_eq!(take_decimal_literal("-42"), R::Ok(("", "-42")));
        assert_eq!(take_decimal_literal("+7x"), R::Ok(("x", "+7")));
        assert!(take_decimal_literal::<()>("-").is_err());
        assert!(take_decimal_literal::<()>("$10").is_err());
    }

    #[test]
    fn parse_literal_test() {
        // Decimal
        assert_eq!(parse_literal("100"), R::Ok(("", 100)));
        assert_eq!(parse_literal("-4"), R::Ok(("", -4)));
        assert_eq!(parse_literal("65535"), R::Ok(("", 0xffff)));

        // Hexadecimal
        assert_eq!(parse_literal("$4f"), R::Ok(("", 0x4f)));
        assert_eq!(parse_literal("$FFFF"), R::Ok(("", 0xffff)));
        assert_eq!(parse_literal("$10000"), R::Ok(("", 0x10000)));

        // Invalid
        assert!(parse_literal::<()>("$").is_err());
        assert!(parse_literal::<()>("abc").is_err());
        assert!(parse_literal::<()>("$FFFFFFFFF").is_err());
    }
}
