use std::num::ParseIntError;

use miette::SourceSpan;
use thiserror::Error;

pub trait ParseError<I>:
    nom::error::ParseError<I> + nom::error::FromExternalError<I, ParseIntError>
{
}

impl<I, E> ParseError<I> for E where
    E: nom::error::ParseError<I> + nom::error::FromExternalError<I, ParseIntError>
{
}

/// Error raised by the literal parser
///
/// Unlike the unit error, it keeps track of integer overflows, so that an
/// out-of-range literal can be told apart from a malformed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError<I> {
    Nom {
        input: I,
        kind: nom::error::ErrorKind,
    },
    ParseIntError {
        input: I,
        inner: ParseIntError,
    },
}

impl<I> nom::error::ParseError<I> for LiteralError<I> {
    fn from_error_kind(input: I, kind: nom::error::ErrorKind) -> Self {
        Self::Nom { input, kind }
    }

    fn append(_input: I, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        // An overflow is more meaningful than "the other branch did not match"
        match self {
            Self::ParseIntError { .. } => self,
            Self::Nom { .. } => other,
        }
    }
}

impl<I> nom::error::FromExternalError<I, ParseIntError> for LiteralError<I> {
    fn from_external_error(input: I, _kind: nom::error::ErrorKind, inner: ParseIntError) -> Self {
        Self::ParseIntError { input, inner }
    }
}

/// Why a single line could not be assembled
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("invalid mnemonic \"{0}\"")]
    InvalidMnemonic(String),

    #[error("{0} needs an operand")]
    MissingOperand(String),

    #[error("invalid number literal \"{0}\"")]
    InvalidLiteral(String),

    #[error("number literal \"{literal}\" is out of range")]
    LiteralOutOfRange {
        literal: String,
        source: ParseIntError,
    },

    #[error("unexpected token \"{0}\"")]
    UnexpectedToken(String),
}

/// Error returned by the assembler
///
/// Assembly is all-or-nothing: when this is returned, no instruction from
/// the source was kept.
#[allow(unused_assignments)]
#[derive(Debug, Error, miette::Diagnostic, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Syntax Error at line {line}: {text}")]
    #[diagnostic(code(assembler::syntax))]
    Syntax {
        /// 1-based line number
        line: usize,

        /// The offending line, trimmed
        text: String,

        #[source]
        reason: LineError,

        #[label("{reason}")]
        span: SourceSpan,
    },

    #[error("Program must end with 'END' directive")]
    #[diagnostic(
        code(assembler::missing_end),
        help("add a line containing only END after the last instruction")
    )]
    MissingEnd,
}

impl AssemblyError {
    /// The 1-based line number of the error, if it is tied to a line
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } => Some(*line),
            Self::MissingEnd => None,
        }
    }
}
