//! The types for parser errors.

use crate::{ast::Sort, parser::Token, utils::Range};
use std::fmt;
use thiserror::Error;

/// The error type for the parser.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The lexer encountered an unexpected character.
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),

    /// The lexer encountered a numeral with a leading zero, e.g. `0123`.
    #[error("leading zero in numeral '{0}'")]
    LeadingZero(String),

    /// The lexer encountered a numerical literal with a missing part, e.g. `1/`.
    #[error("invalid numerical literal: '{0}'")]
    InvalidNumeral(String),

    /// The lexer encountered a numerical literal that contained a division by zero, e.g. '1/0'.
    #[error("division by zero in numerical literal: '{0}'")]
    DivisionByZeroInLiteral(String),

    /// The lexer encountered a `\` character while reading a quoted symbol.
    #[error("quoted symbol contains backslash")]
    BackslashInQuotedSymbol,

    /// The lexer encountered the end of the input while reading a quoted symbol.
    #[error("unexpected EOF in quoted symbol")]
    EofInQuotedSymbol,

    /// The lexer encountered the end of the input while reading a string literal.
    #[error("unexpected EOF in string literal")]
    EofInString,

    /// The parser encountered an unexpected token.
    #[error("unexpected token: '{0}'")]
    UnexpectedToken(Token),

    /// The parser parsed an empty sequence where only non-empty sequences are allowed.
    #[error("expected non-empty sequence")]
    EmptySequence,

    /// An error in sort checking.
    #[error("sort error: {0}")]
    SortError(#[from] SortError),

    /// The parser encountered an identifier that was not defined.
    #[error("identifier '{0}' is not defined")]
    UndefinedIden(String),

    /// The parser encountered a sort that was not defined.
    #[error("sort '{0}' is not defined")]
    UndefinedSort(String),

    /// The wrong number of arguments was given to an operator.
    #[error("expected {0} arguments, got {1}")]
    WrongNumberOfArgs(Range, usize),

    /// A function with one or more arguments was declared. Only constants are supported.
    #[error("function '{0}' has arguments, but only constants are supported")]
    UnsupportedFunction(String),

    /// A constant of sort `Bool` was declared. Formulas are built only from atoms.
    #[error("Boolean constant '{0}' is not supported")]
    UnsupportedBoolConstant(String),

    /// A term was divided by something that is not a non-zero constant.
    #[error("cannot divide by '{0}'")]
    InvalidDivisor(String),

    /// The argument of `card>=` or `card<` is not a non-negative numeral.
    #[error("'{0}' is not a valid cardinality bound")]
    InvalidCardinality(String),
}

/// Returns an error if the length of `sequence` is not in the `expected` range.
pub fn assert_num_args<T, R>(sequence: &[T], range: R) -> Result<(), ParserError>
where
    R: Into<Range>,
{
    let range = range.into();
    if range.contains(sequence.len()) {
        Ok(())
    } else {
        Err(ParserError::WrongNumberOfArgs(range, sequence.len()))
    }
}

/// An error in sort checking.
#[derive(Debug, Error)]
pub struct SortError {
    /// The possible sorts that were expected.
    pub expected: Vec<Sort>,

    /// The sort we got.
    pub got: Sort,
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.expected.as_slice() {
            [] => unreachable!(),
            [p] => write!(f, "expected '{}', got '{}'", p, self.got),
            [first, middle @ .., last] => {
                write!(f, "expected '{}'", first)?;
                for p in middle {
                    write!(f, ", '{}'", p)?;
                }
                write!(f, " or '{}', got '{}'", last, self.got)
            }
        }
    }
}

impl SortError {
    /// Returns a sort error if `got` does not equal `expected`.
    pub(crate) fn assert_eq(expected: &Sort, got: &Sort) -> Result<(), Self> {
        if expected == got {
            Ok(())
        } else {
            Err(Self {
                expected: vec![expected.clone()],
                got: got.clone(),
            })
        }
    }

    /// Makes sure all sorts in `sequence` are equal to each other, otherwise returns an error.
    pub(crate) fn assert_all_eq(sequence: &[&Sort]) -> Result<(), Self> {
        for pair in sequence.windows(2) {
            Self::assert_eq(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Returns a sort error if `got` is not one of `possibilities`.
    pub(crate) fn assert_one_of(possibilities: &[Sort], got: &Sort) -> Result<(), Self> {
        if possibilities.contains(got) {
            Ok(())
        } else {
            Err(Self {
                expected: possibilities.to_vec(),
                got: got.clone(),
            })
        }
    }
}
