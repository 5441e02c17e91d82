//! A lexer for the SMT-LIB format.

use crate::{parser::ParserError, utils::is_symbol_character, Error, QeResult};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Pow, Zero};
use std::{
    io::{self, BufRead},
    str::FromStr,
};

/// A token in the SMT-LIB format.
#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    /// The `(` token.
    OpenParen,

    /// The `)` token.
    CloseParen,

    /// A symbol, that can be either simple or quoted. A simple symbol is a non-empty sequence of
    /// letters, digits, or any of these characters: `+`, `-`, `/`, `*`, `=`, `%`, `?`, `!`, `.`,
    /// `$`, `_`, `~`, `&`, `^`, `<`, `>`, or `@`. A quoted symbol is any sequence of characters
    /// that starts and ends with `|`, and does not contain `|` or `\`.
    Symbol(String),

    /// A keyword, which is a simple symbol preceded by `:`. This has the leading `:` character
    /// removed.
    Keyword(String),

    /// An integer numeral literal.
    Numeral(BigInt),

    /// A decimal numeral literal, or a rational literal such as `1/2`.
    Decimal(BigRational),

    /// A string literal.
    String(String),

    /// A reserved word.
    ReservedWord(Reserved),

    /// A signal token to indicate the end of the input.
    Eof,
}

/// A reserved word in the SMT-LIB lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    /// The `_` reserved word.
    Underscore,

    /// The `!` reserved word.
    Bang,

    /// The `exists` reserved word.
    Exists,

    /// The `forall` reserved word.
    Forall,

    /// The `declare-fun` reserved word.
    DeclareFun,

    /// The `declare-const` reserved word.
    DeclareConst,

    /// The `declare-sort` reserved word.
    DeclareSort,

    /// The `assert` reserved word.
    Assert,

    /// The `set-logic` reserved word.
    SetLogic,
}

impl_str_conversion_traits!(Reserved {
    Underscore: "_",
    Bang: "!",
    Exists: "exists",
    Forall: "forall",
    DeclareFun: "declare-fun",
    DeclareConst: "declare-const",
    DeclareSort: "declare-sort",
    Assert: "assert",
    SetLogic: "set-logic",
});

/// Represents a position (line and column numbers) in the source input.
pub type Position = (usize, usize);

/// A lexer for the SMT-LIB format.
pub struct Lexer<R> {
    input: R,
    current_line: Option<std::vec::IntoIter<char>>,
    current_char: Option<char>,
    position: Position,
}

impl<R: BufRead> Lexer<R> {
    /// Constructs a new `Lexer` from a type that implements `BufRead`.
    ///
    /// This operation can fail if there is an IO error on the first token.
    pub fn new(input: R) -> io::Result<Self> {
        let mut lexer = Lexer {
            input,
            current_line: None,
            current_char: None,
            position: (0, 0),
        };
        lexer.next_line()?;
        lexer.next_char()?;
        Ok(lexer)
    }

    /// Advances the lexer by one character, and returns the previous `current_char`.
    fn next_char(&mut self) -> io::Result<Option<char>> {
        // If there are no more characters in the current line, go to the next line
        if let Some(line) = &self.current_line {
            if line.as_slice().is_empty() {
                self.next_line()?;
            }
        }

        let new = if let Some(line) = &mut self.current_line {
            self.position.1 += 1;
            line.next()
        } else {
            None
        };
        let old = std::mem::replace(&mut self.current_char, new);
        Ok(old)
    }

    /// Advances the lexer by one line, discarding the remaining contents of the current line.
    fn next_line(&mut self) -> io::Result<()> {
        let mut buf = String::new();
        let read = self.input.read_line(&mut buf)?;
        if read == 0 {
            self.current_line = None;
        } else {
            let line = buf.chars().collect::<Vec<_>>().into_iter();
            self.current_line = Some(line);
            self.position.0 += 1;
            self.position.1 = 0;
        }
        Ok(())
    }

    /// Reads characters while the given predicate returns `true`, and stores them in a `String`.
    ///
    /// At the end, all characters in the returned string will satisfy the predicate, and
    /// `self.current_char` will be the first character that didn't satisfy the predicate.
    fn read_chars_while<P: Fn(char) -> bool>(&mut self, predicate: P) -> io::Result<String> {
        let mut result = String::new();
        while let Some(c) = self.current_char {
            if !predicate(c) {
                break;
            }
            result.push(c);
            self.next_char()?;
        }
        Ok(result)
    }

    fn drop_while_whitespace(&mut self) -> io::Result<()> {
        while let Some(c) = self.current_char {
            if !c.is_whitespace() {
                break;
            }
            self.next_char()?;
        }
        Ok(())
    }

    /// Consumes all leading whitespace and comments in the input source.
    fn consume_whitespace(&mut self) -> io::Result<()> {
        self.drop_while_whitespace()?;
        while self.current_char == Some(';') {
            self.next_line()?;
            self.next_char()?;
            self.drop_while_whitespace()?;
        }
        Ok(())
    }

    /// Reads a token from the input source.
    pub fn next_token(&mut self) -> QeResult<(Token, Position)> {
        self.consume_whitespace()?;
        let start_position = self.position;
        let token = match self.current_char {
            Some('(') => {
                self.next_char()?;
                Ok(Token::OpenParen)
            }
            Some(')') => {
                self.next_char()?;
                Ok(Token::CloseParen)
            }
            Some('"') => self.read_string(),
            Some('|') => self.read_quoted_symbol(),
            Some(':') => self.read_keyword(),
            Some('-') => {
                // A '-' followed by a digit is a negative literal (e.g. '-5'). Otherwise, this is a
                // symbol that starts with '-', like the '-' operator itself
                self.next_char()?;
                if self.current_char.as_ref().is_some_and(char::is_ascii_digit) {
                    self.read_number(true)
                } else {
                    let mut symbol = self.read_chars_while(is_symbol_character)?;
                    symbol.insert(0, '-');
                    Ok(Token::Symbol(symbol))
                }
            }
            Some(c) if c.is_ascii_digit() => self.read_number(false),
            Some(c) if is_symbol_character(c) => self.read_simple_symbol(),
            None => Ok(Token::Eof),
            Some(other) => Err(Error::Parser(
                ParserError::UnexpectedChar(other),
                self.position,
            )),
        }?;
        Ok((token, start_position))
    }

    fn read_simple_symbol(&mut self) -> QeResult<Token> {
        let symbol = self.read_chars_while(is_symbol_character)?;
        if let Ok(reserved) = Reserved::from_str(&symbol) {
            Ok(Token::ReservedWord(reserved))
        } else {
            Ok(Token::Symbol(symbol))
        }
    }

    fn read_quoted_symbol(&mut self) -> QeResult<Token> {
        self.next_char()?; // Consume `|`
        let symbol = self.read_chars_while(|c| c != '|' && c != '\\')?;
        match self.current_char {
            Some('|') => {
                self.next_char()?;
                Ok(Token::Symbol(symbol))
            }
            Some(_) => Err(Error::Parser(
                ParserError::BackslashInQuotedSymbol,
                self.position,
            )),
            None => Err(Error::Parser(ParserError::EofInQuotedSymbol, self.position)),
        }
    }

    fn read_keyword(&mut self) -> QeResult<Token> {
        self.next_char()?; // Consume `:`
        let symbol = self.read_chars_while(is_symbol_character)?;
        Ok(Token::Keyword(symbol))
    }

    fn parse_digits(&self, digits: &str) -> QeResult<BigInt> {
        BigInt::from_str(digits).map_err(|_| {
            Error::Parser(ParserError::InvalidNumeral(digits.to_owned()), self.position)
        })
    }

    /// Reads an integer, decimal or rational numerical literal.
    fn read_number(&mut self, negated: bool) -> QeResult<Token> {
        let first_part = self.read_chars_while(|c| c.is_ascii_digit())?;

        if first_part.len() > 1 && first_part.starts_with('0') {
            return Err(Error::Parser(
                ParserError::LeadingZero(first_part),
                self.position,
            ));
        }

        if let Some(delimiter @ ('/' | '.')) = self.current_char {
            self.next_char()?;
            let second_part = self.read_chars_while(|c| c.is_ascii_digit())?;
            if let Some(c @ ('/' | '.')) = self.current_char {
                // A number can have only one delimiter
                return Err(Error::Parser(ParserError::UnexpectedChar(c), self.position));
            }
            let r = if delimiter == '/' {
                let numer = self.parse_digits(&first_part)?;
                let denom = self.parse_digits(&second_part)?;
                if denom.is_zero() {
                    let e = ParserError::DivisionByZeroInLiteral(format!("{numer}/{denom}"));
                    return Err(Error::Parser(e, self.position));
                }
                BigRational::new(numer, denom)
            } else {
                let denom = BigInt::from(10u32).pow(second_part.len());
                let numer = self.parse_digits(&(first_part + &second_part))?;
                BigRational::new(numer, denom)
            };
            Ok(Token::Decimal(if negated { -r } else { r }))
        } else {
            let i = self.parse_digits(&first_part)?;
            Ok(Token::Numeral(if negated { -i } else { i }))
        }
    }

    /// Reads a string literal. These only show up as attribute values, e.g. in `set-info`, but
    /// they may contain parentheses, so they must be lexed to be skipped correctly.
    fn read_string(&mut self) -> QeResult<Token> {
        self.next_char()?; // `"`
        let mut result = String::new();
        loop {
            match self.next_char()? {
                None => return Err(Error::Parser(ParserError::EofInString, self.position)),

                // `""` is an escaped quote
                Some('"') if self.current_char == Some('"') => {
                    self.next_char()?;
                    result.push('"');
                }
                Some('"') => break,
                Some(c) => result.push(c),
            }
        }
        Ok(Token::String(result))
    }
}
