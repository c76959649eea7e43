//! Program parsing logic
//!
//! The assembler works one line at a time, in a single pass. Each line is
//! either skipped (blank or comment), the `END` directive that terminates the
//! program, or an instruction made of a mnemonic and an optional operand.
//!
//! Literals and identifiers are parsed with the `nom` library.

use miette::SourceSpan;
use nom::bytes::complete::take_while1;
use nom::combinator::verify;
use nom::IResult;
use tracing::{debug, trace};

mod errors;
pub(crate) mod line;
pub(crate) mod literal;

pub use self::errors::{AssemblyError, LineError, LiteralError, ParseError};
pub use self::line::{Instruction, Program};
pub use self::literal::parse_literal;
pub use crate::opcodes::Operand;

/// Starts a comment, up to the end of the line
const COMMENT: char = ';';

/// Terminates the program
const END_DIRECTIVE: &str = "END";

fn is_identifier_char(c: char) -> bool {
    is_start_identifier_char(c) || c.is_ascii_digit()
}

fn is_start_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_lowercase() || c.is_ascii_uppercase()
}

/// Parse a C-like identifier
pub(crate) fn parse_identifier<'a, Error: nom::error::ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, Error> {
    verify(take_while1(is_identifier_char), |f: &str| {
        f.chars()
            .next()
            .filter(|&c| is_start_identifier_char(c))
            .is_some()
    })(input)
}

/// Remove the comment at the end of a line, if any
fn strip_comment(line: &str) -> &str {
    line.split_once(COMMENT).map_or(line, |(code, _)| code)
}

/// Assemble a program
///
/// Scanning stops at the first `END` line; anything after it is ignored.
///
/// # Errors
///
/// This function will return an error on the first line that does not parse,
/// or if the source has no `END` line. In both cases, none of the lines
/// parsed so far are returned.
#[tracing::instrument(skip(source), fields(len = source.len()))]
pub fn assemble(source: &str) -> Result<Program, AssemblyError> {
    let mut instructions = Vec::new();
    let mut offset = 0;

    for (index, raw) in source.split('\n').enumerate() {
        let line_start = offset;
        offset += raw.len() + 1;

        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT) {
            continue;
        }

        let code = strip_comment(line).trim();
        if code.eq_ignore_ascii_case(END_DIRECTIVE) {
            debug!(
                line = index + 1,
                instructions = instructions.len(),
                "Reached END directive"
            );
            return Ok(Program::new(instructions));
        }

        match line::parse_line(code) {
            Ok(instruction) => {
                trace!(line = index + 1, %instruction, "Parsed instruction");
                instructions.push(instruction);
            }
            Err(reason) => {
                let start = line_start + (raw.len() - raw.trim_start().len());
                debug!(line = index + 1, %reason, "Syntax error");
                return Err(AssemblyError::Syntax {
                    line: index + 1,
                    text: line.to_owned(),
                    reason,
                    span: SourceSpan::from((start, line.len())),
                });
            }
        }
    }

    Err(AssemblyError::MissingEnd)
}
