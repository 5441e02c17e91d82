//! A parser for SMT-LIB scripts with quantified arithmetic and equality formulas.

mod error;
mod lexer;

pub use error::{ParserError, SortError};
pub use lexer::{Lexer, Position, Reserved, Token};

use crate::{ast::*, utils::HashMapStack, Error, QeResult};
use ahash::AHashSet;
use error::assert_num_args;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::{io::BufRead, str::FromStr};

/// The parser configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// If `true`, `Int` and `Real` terms may be mixed in arithmetic operations and equalities.
    pub allow_int_real_subtyping: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_int_real_subtyping(mut self, value: bool) -> Self {
        self.allow_int_real_subtyping = value;
        self
    }
}

/// Parses an SMT-LIB script from any type that implements `BufRead`.
pub fn parse_problem<R: BufRead>(input: R, config: Config) -> QeResult<Problem> {
    Parser::new(config, input)?.parse_problem()
}

/// An operator that may appear at the head of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Not,
    And,
    Or,
    Implies,
    Equals,
    Distinct,
    LessThan,
    LessEq,
    GreaterThan,
    GreaterEq,
    Add,
    Sub,
    Mult,
    RealDiv,
    CardAtLeast,
    CardFewerThan,
}

impl_str_conversion_traits!(Operator {
    Not: "not",
    And: "and",
    Or: "or",
    Implies: "=>",
    Equals: "=",
    Distinct: "distinct",
    LessThan: "<",
    LessEq: "<=",
    GreaterThan: ">",
    GreaterEq: ">=",
    Add: "+",
    Sub: "-",
    Mult: "*",
    RealDiv: "/",
    CardAtLeast: "card>=",
    CardFewerThan: "card<",
});

/// The result of parsing an s-expression: either a formula, or a polynomial term together with
/// its sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expr {
    Formula(Formula),
    Term(Polynomial, Sort),
}

impl Expr {
    fn sort(&self) -> &Sort {
        match self {
            Expr::Formula(_) => &Sort::Bool,
            Expr::Term(_, sort) => sort,
        }
    }
}

/// The state of the parser, holding the constant and sort declarations.
#[derive(Default)]
struct ParserState {
    symbol_table: HashMapStack<String, Sort>,
    sort_declarations: AHashSet<String>,
}

/// A parser for SMT-LIB scripts.
pub struct Parser<R> {
    config: Config,
    lexer: Lexer<R>,
    current_token: Token,
    current_position: Position,
    state: ParserState,
    interpret_integers_as_reals: bool,
}

impl<R: BufRead> Parser<R> {
    /// Constructs a new `Parser` from a type that implements `BufRead`.
    ///
    /// This operation can fail if there is an IO or lexer error on the first token.
    pub fn new(config: Config, input: R) -> QeResult<Self> {
        let mut lexer = Lexer::new(input)?;
        let (current_token, current_position) = lexer.next_token()?;
        Ok(Parser {
            config,
            lexer,
            current_token,
            current_position,
            state: ParserState::default(),
            interpret_integers_as_reals: false,
        })
    }

    /// Resets the parser position and sets its input to `input`. This keeps the parser state,
    /// including all constant and sort declarations.
    pub fn reset(&mut self, input: R) -> QeResult<()> {
        let mut lexer = Lexer::new(input)?;
        let (current_token, current_position) = lexer.next_token()?;
        self.lexer = lexer;
        self.current_token = current_token;
        self.current_position = current_position;
        Ok(())
    }

    /// Advances the parser one token, and returns the previous `current_token`.
    fn next_token(&mut self) -> QeResult<(Token, Position)> {
        use std::mem::replace;

        let (new_token, new_position) = self.lexer.next_token()?;
        let old_token = replace(&mut self.current_token, new_token);
        let old_position = replace(&mut self.current_position, new_position);
        Ok((old_token, old_position))
    }

    /// Consumes the current token if it equals `expected`. Returns an error otherwise.
    fn expect_token(&mut self, expected: Token) -> QeResult<()> {
        let (got, pos) = self.next_token()?;
        if got == expected {
            Ok(())
        } else {
            Err(Error::Parser(ParserError::UnexpectedToken(got), pos))
        }
    }

    /// Consumes the current token if it is a symbol, and returns the inner `String`. Returns an
    /// error otherwise.
    fn expect_symbol(&mut self) -> QeResult<String> {
        match self.next_token()? {
            (Token::Symbol(s), _) => Ok(s),
            (other, pos) => Err(Error::Parser(ParserError::UnexpectedToken(other), pos)),
        }
    }

    /// Calls `parse_func` repeatedly until a closing parenthesis is reached.
    ///
    /// If `non_empty` is true, empty sequences will result in an error. This method consumes the
    /// ending `)` token.
    fn parse_sequence<T, F>(&mut self, mut parse_func: F, non_empty: bool) -> QeResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> QeResult<T>,
    {
        let mut result = Vec::new();
        while self.current_token != Token::CloseParen {
            result.push(parse_func(self)?);
        }
        if non_empty && result.is_empty() {
            Err(Error::Parser(
                ParserError::EmptySequence,
                self.current_position,
            ))
        } else {
            self.next_token()?; // Consume `)` token
            Ok(result)
        }
    }

    /// Consumes and drops tokens until the matching closing parenthesis is reached.
    fn ignore_until_close_parens(&mut self) -> QeResult<()> {
        let mut parens_depth = 1;
        while parens_depth > 0 {
            parens_depth += match self.next_token()? {
                (Token::OpenParen, _) => 1,
                (Token::CloseParen, _) => -1,
                (Token::Eof, pos) => {
                    return Err(Error::Parser(ParserError::UnexpectedToken(Token::Eof), pos))
                }
                _ => 0,
            };
        }
        Ok(())
    }

    /// Consumes and ignores attributes and their values until a closing parenthesis is reached.
    fn ignore_remaining_attributes(&mut self) -> QeResult<()> {
        while let Token::Keyword(_) = self.current_token {
            self.next_token()?;
            match self.current_token {
                Token::CloseParen | Token::Eof => break,

                // If there is no value for this attribute, we may encounter the next attribute, in
                // which case we must continue without consuming the keyword token
                Token::Keyword(_) => (),

                Token::Symbol(_)
                | Token::Numeral(_)
                | Token::Decimal(_)
                | Token::String(_)
                | Token::ReservedWord(_) => {
                    self.next_token()?;
                }

                Token::OpenParen => {
                    self.next_token()?;
                    self.ignore_until_close_parens()?;
                }
            }
        }
        Ok(())
    }

    /// Adds a constant or bound variable to the symbol table. Boolean constants are rejected,
    /// since formulas are built only from atoms.
    fn declare(&mut self, name: String, sort: Sort, pos: Position) -> QeResult<()> {
        if sort == Sort::Bool {
            return Err(Error::Parser(ParserError::UnsupportedBoolConstant(name), pos));
        }
        self.state.symbol_table.insert(name, sort);
        Ok(())
    }

    /// Reads an SMT-LIB script and parses the assertions and declarations.
    ///
    /// The following commands are parsed:
    ///
    /// - `assert`
    /// - `declare-const`
    /// - `declare-fun`, with no arguments
    /// - `declare-sort`, with arity zero
    /// - `set-logic`
    ///
    /// All other commands are ignored.
    pub fn parse_problem(&mut self) -> QeResult<Problem> {
        let mut problem = Problem::new();

        while self.current_token != Token::Eof {
            self.expect_token(Token::OpenParen)?;
            match self.next_token()?.0 {
                Token::ReservedWord(Reserved::DeclareFun) => {
                    let pos = self.current_position;
                    let (name, sort) = self.parse_declare_fun()?;
                    self.declare(name.clone(), sort.clone(), pos)?;
                    problem.declarations.push((name, sort));
                }
                Token::ReservedWord(Reserved::DeclareConst) => {
                    let pos = self.current_position;
                    let name = self.expect_symbol()?;
                    let sort = self.parse_sort()?;
                    self.expect_token(Token::CloseParen)?;
                    self.declare(name.clone(), sort.clone(), pos)?;
                    problem.declarations.push((name, sort));
                }
                Token::ReservedWord(Reserved::DeclareSort) => {
                    let name = self.parse_declare_sort()?;
                    self.state.sort_declarations.insert(name.clone());
                    problem.sort_declarations.push(name);
                }
                Token::ReservedWord(Reserved::Assert) => {
                    let formula = self.parse_formula()?;
                    self.expect_token(Token::CloseParen)?;
                    problem.assertions.push(formula);
                }
                Token::ReservedWord(Reserved::SetLogic) => {
                    let logic = self.expect_symbol()?;
                    self.expect_token(Token::CloseParen)?;

                    // When the problem's logic contains real numbers but not integers, integer
                    // literals should be parsed as reals. For instance, `1` should be interpreted
                    // as `1.0`.
                    self.interpret_integers_as_reals = logic.contains('R') && !logic.contains('I');
                    problem.logic = Some(logic);
                }
                _ => {
                    // If the command is not one of the commands we care about, we just ignore it.
                    // We do that by reading tokens until the command parenthesis is closed
                    self.ignore_until_close_parens()?;
                }
            }
        }
        Ok(problem)
    }

    /// Parses a `declare-fun` command, which must declare a constant. This method assumes that the
    /// `(` and `declare-fun` tokens were already consumed.
    fn parse_declare_fun(&mut self) -> QeResult<(String, Sort)> {
        let pos = self.current_position;
        let name = self.expect_symbol()?;
        self.expect_token(Token::OpenParen)?;
        let params = self.parse_sequence(Self::parse_sort, false)?;
        if !params.is_empty() {
            return Err(Error::Parser(ParserError::UnsupportedFunction(name), pos));
        }
        let sort = self.parse_sort()?;
        self.expect_token(Token::CloseParen)?;
        Ok((name, sort))
    }

    /// Parses a `declare-sort` command, returning the sort name. Only sorts with arity zero are
    /// supported. This method assumes that the `(` and `declare-sort` tokens were already
    /// consumed.
    fn parse_declare_sort(&mut self) -> QeResult<String> {
        let name = self.expect_symbol()?;
        match self.next_token()? {
            (Token::Numeral(n), _) if n.is_zero() => (),
            (Token::Numeral(n), pos) => {
                let got = n.to_usize().unwrap_or(usize::MAX);
                return Err(Error::Parser(ParserError::WrongNumberOfArgs(0.into(), got), pos));
            }
            (other, pos) => return Err(Error::Parser(ParserError::UnexpectedToken(other), pos)),
        }
        self.expect_token(Token::CloseParen)?;
        Ok(name)
    }

    fn parse_sorted_var(&mut self) -> QeResult<(String, Sort)> {
        self.expect_token(Token::OpenParen)?;
        let pos = self.current_position;
        let symbol = self.expect_symbol()?;
        let sort = self.parse_sort()?;
        self.expect_token(Token::CloseParen)?;
        self.declare(symbol.clone(), sort.clone(), pos)?;
        Ok((symbol, sort))
    }

    /// Parses a formula, that is, an expression of sort `Bool`.
    pub fn parse_formula(&mut self) -> QeResult<Formula> {
        let pos = self.current_position;
        match self.parse_expr()? {
            Expr::Formula(f) => Ok(f),
            Expr::Term(_, got) => {
                let e = SortError { expected: vec![Sort::Bool], got };
                Err(Error::Parser(e.into(), pos))
            }
        }
    }

    /// Parses an expression, which may be either a formula or an arithmetic term.
    pub(crate) fn parse_expr(&mut self) -> QeResult<Expr> {
        match self.next_token()? {
            (Token::Numeral(n), _) => {
                let sort = if self.interpret_integers_as_reals {
                    Sort::Real
                } else {
                    Sort::Int
                };
                Ok(Expr::Term(Polynomial::from(n), sort))
            }
            (Token::Decimal(r), _) => Ok(Expr::Term(Polynomial::from(r), Sort::Real)),
            (Token::Symbol(s), pos) => match self.state.symbol_table.get(&s) {
                Some(sort) => Ok(Expr::Term(Polynomial::var(&s), sort.clone())),
                None if s == "true" => Ok(Expr::Formula(Formula::TRUE)),
                None if s == "false" => Ok(Expr::Formula(Formula::FALSE)),
                None => Err(Error::Parser(ParserError::UndefinedIden(s), pos)),
            },
            (Token::OpenParen, _) => self.parse_application(),
            (other, pos) => Err(Error::Parser(ParserError::UnexpectedToken(other), pos)),
        }
    }

    /// Parses a quantified formula. Multiple binders are expanded into nested quantifiers, the
    /// first binder being the outermost. This method assumes that the `(` and quantifier tokens
    /// were already consumed.
    fn parse_quantifier(&mut self, quantifier: Quantifier) -> QeResult<Expr> {
        self.expect_token(Token::OpenParen)?;
        self.state.symbol_table.push_scope();
        let bindings = self.parse_sequence(Self::parse_sorted_var, true)?;
        let body = self.parse_formula()?;
        self.state.symbol_table.pop_scope();
        self.expect_token(Token::CloseParen)?;
        let formula = bindings
            .into_iter()
            .rev()
            .fold(body, |acc, (x, _)| Formula::quant(quantifier, x, acc));
        Ok(Expr::Formula(formula))
    }

    /// Parses an annotated term, ignoring its attributes. This method assumes that the `(` and `!`
    /// tokens were already consumed.
    fn parse_annotated_term(&mut self) -> QeResult<Expr> {
        let inner = self.parse_expr()?;
        self.ignore_remaining_attributes()?;
        self.expect_token(Token::CloseParen)?;
        Ok(inner)
    }

    /// Parses any expression that starts with `(`. This method assumes that the `(` token was
    /// already consumed.
    fn parse_application(&mut self) -> QeResult<Expr> {
        let head_pos = self.current_position;
        let operator = match self.next_token()? {
            (Token::ReservedWord(Reserved::Exists), _) => {
                return self.parse_quantifier(Quantifier::Exists)
            }
            (Token::ReservedWord(Reserved::Forall), _) => {
                return self.parse_quantifier(Quantifier::Forall)
            }
            (Token::ReservedWord(Reserved::Bang), _) => return self.parse_annotated_term(),
            (Token::Symbol(s), pos) => match Operator::from_str(&s) {
                Ok(op) => op,
                Err(()) if self.state.symbol_table.get(&s).is_some() => {
                    // Declared constants can't be applied to arguments
                    return Err(Error::Parser(ParserError::UnsupportedFunction(s), pos));
                }
                Err(()) => return Err(Error::Parser(ParserError::UndefinedIden(s), pos)),
            },
            (other, pos) => return Err(Error::Parser(ParserError::UnexpectedToken(other), pos)),
        };
        let args = self.parse_sequence(Self::parse_expr, true)?;
        self.make_op(operator, args)
            .map_err(|err| Error::Parser(err, head_pos))
    }

    /// Checks that every argument is numeric. Unless Int/Real subtyping is allowed, the arguments
    /// must also all have the same sort.
    fn assert_numeric(&self, sorts: &[&Sort], same_sort: bool) -> Result<(), SortError> {
        for s in sorts {
            SortError::assert_one_of(&[Sort::Int, Sort::Real], s)?;
        }
        if same_sort && !self.config.allow_int_real_subtyping {
            SortError::assert_all_eq(sorts)?;
        }
        Ok(())
    }

    /// Constructs and sort checks an operation.
    fn make_op(&self, op: Operator, args: Vec<Expr>) -> Result<Expr, ParserError> {
        let sorts: Vec<&Sort> = args.iter().map(Expr::sort).collect();
        match op {
            Operator::Not => {
                assert_num_args(&args, 1)?;
                SortError::assert_eq(&Sort::Bool, sorts[0])?;
            }
            Operator::And | Operator::Or => {
                // These operators can be called with only one argument
                assert_num_args(&args, 1..)?;
                for s in &sorts {
                    SortError::assert_eq(&Sort::Bool, s)?;
                }
            }
            Operator::Implies => {
                assert_num_args(&args, 2..)?;
                for s in &sorts {
                    SortError::assert_eq(&Sort::Bool, s)?;
                }
            }
            Operator::Equals | Operator::Distinct => {
                assert_num_args(&args, 2..)?;
                if sorts[0].is_numeric() {
                    self.assert_numeric(&sorts, true)?;
                } else {
                    SortError::assert_all_eq(&sorts)?;
                }
            }
            Operator::LessThan | Operator::LessEq | Operator::GreaterThan | Operator::GreaterEq => {
                // The arguments don't need to all have the same sort
                assert_num_args(&args, 2..)?;
                self.assert_numeric(&sorts, false)?;
            }
            Operator::Add | Operator::Mult | Operator::RealDiv => {
                assert_num_args(&args, 2..)?;
                self.assert_numeric(&sorts, true)?;
            }
            Operator::Sub => {
                // The `-` operator can be called with only one argument, in which case it means
                // negation instead of subtraction
                assert_num_args(&args, 1..)?;
                self.assert_numeric(&sorts, true)?;
            }
            Operator::CardAtLeast | Operator::CardFewerThan => {
                assert_num_args(&args, 1)?;
            }
        }

        let is_bool = *sorts[0] == Sort::Bool;
        let result_sort = if sorts.contains(&&Sort::Real) {
            Sort::Real
        } else {
            Sort::Int
        };
        let result = match op {
            Operator::Not => Expr::Formula(Formula::not(into_formulas(args).remove(0))),
            Operator::And => Expr::Formula(Formula::And(into_formulas(args))),
            Operator::Or => Expr::Formula(Formula::Or(into_formulas(args))),
            Operator::Implies => {
                // `=>` is right associative, so `(=> a b c)` means `(=> a (=> b c))`
                let mut formulas = into_formulas(args);
                let last = formulas.pop().unwrap_or(Formula::TRUE);
                let f = formulas
                    .into_iter()
                    .rev()
                    .fold(last, |acc, f| Formula::implies(f, acc));
                Expr::Formula(f)
            }
            Operator::Equals if is_bool => {
                let formulas = into_formulas(args);
                let chain = formulas
                    .windows(2)
                    .map(|w| Formula::equivalent(w[0].clone(), w[1].clone()))
                    .collect();
                Expr::Formula(Formula::conjunction(chain))
            }
            Operator::Distinct if is_bool => {
                let formulas = into_formulas(args);
                let pairs = pairs(&formulas)
                    .map(|(a, b)| Formula::not(Formula::equivalent(a.clone(), b.clone())))
                    .collect();
                Expr::Formula(Formula::conjunction(pairs))
            }
            Operator::Distinct => {
                let terms = into_terms(args);
                let pairs = pairs(&terms)
                    .map(|(a, b)| Formula::atom(Relation::Ne, a.clone(), b.clone()))
                    .collect();
                Expr::Formula(Formula::conjunction(pairs))
            }
            Operator::Equals
            | Operator::LessThan
            | Operator::LessEq
            | Operator::GreaterThan
            | Operator::GreaterEq => {
                let relation = match op {
                    Operator::Equals => Relation::Eq,
                    Operator::LessThan => Relation::Lt,
                    Operator::LessEq => Relation::Le,
                    Operator::GreaterThan => Relation::Gt,
                    _ => Relation::Ge,
                };

                // Chained relations such as `(< a b c)` mean `(and (< a b) (< b c))`
                let terms = into_terms(args);
                let chain = terms
                    .windows(2)
                    .map(|w| Formula::atom(relation, w[0].clone(), w[1].clone()))
                    .collect();
                Expr::Formula(Formula::conjunction(chain))
            }
            Operator::Add => {
                let sum = into_terms(args)
                    .into_iter()
                    .fold(Polynomial::zero(), |acc, t| acc + t);
                Expr::Term(sum, result_sort)
            }
            Operator::Sub => {
                let mut terms = into_terms(args).into_iter();
                let first = terms.next().unwrap_or_default();
                let rest: Vec<_> = terms.collect();
                let result = if rest.is_empty() {
                    -first
                } else {
                    rest.into_iter().fold(first, |acc, t| acc - t)
                };
                Expr::Term(result, result_sort)
            }
            Operator::Mult => {
                let product = into_terms(args)
                    .into_iter()
                    .fold(Polynomial::from(1), |acc, t| acc * t);
                Expr::Term(product, result_sort)
            }
            Operator::RealDiv => {
                let mut terms = into_terms(args).into_iter();
                let mut result = terms.next().unwrap_or_default();
                for divisor in terms {
                    match divisor.constant_value() {
                        Some(c) if !c.is_zero() => result = result.scale(&c.recip()),
                        _ => return Err(ParserError::InvalidDivisor(divisor.to_string())),
                    }
                }
                Expr::Term(result, Sort::Real)
            }
            Operator::CardAtLeast | Operator::CardFewerThan => {
                let k = match &args[0] {
                    Expr::Term(p, _) => p
                        .constant_value()
                        .filter(BigRational::is_integer)
                        .and_then(|c| c.to_integer().to_u64()),
                    Expr::Formula(_) => None,
                };
                let Some(k) = k else {
                    let printed = match &args[0] {
                        Expr::Term(p, _) => p.to_string(),
                        Expr::Formula(f) => f.to_string(),
                    };
                    return Err(ParserError::InvalidCardinality(printed));
                };
                let atom = if op == Operator::CardAtLeast {
                    Atom::AtLeast(k)
                } else {
                    Atom::FewerThan(k)
                };
                Expr::Formula(Formula::Atom(atom))
            }
        };
        Ok(result)
    }

    /// Parses a sort. Only `Bool`, `Int`, `Real` and declared sorts of arity zero are supported.
    fn parse_sort(&mut self) -> QeResult<Sort> {
        let (name, pos) = match self.next_token()? {
            (Token::Symbol(s), pos) => (s, pos),
            (other, pos) => return Err(Error::Parser(ParserError::UnexpectedToken(other), pos)),
        };
        match name.as_str() {
            "Bool" => Ok(Sort::Bool),
            "Int" => Ok(Sort::Int),
            "Real" => Ok(Sort::Real),
            _ if self.state.sort_declarations.contains(&name) => Ok(Sort::Atom(name)),
            _ => Err(Error::Parser(ParserError::UndefinedSort(name), pos)),
        }
    }
}

/// Extracts the formulas from a list of expressions that was already sort checked to be `Bool`.
fn into_formulas(args: Vec<Expr>) -> Vec<Formula> {
    args.into_iter()
        .filter_map(|e| match e {
            Expr::Formula(f) => Some(f),
            Expr::Term(..) => None,
        })
        .collect()
}

/// Extracts the terms from a list of expressions that was already sort checked.
fn into_terms(args: Vec<Expr>) -> Vec<Polynomial> {
    args.into_iter()
        .filter_map(|e| match e {
            Expr::Term(p, _) => Some(p),
            Expr::Formula(_) => None,
        })
        .collect()
}

/// Iterates over every unordered pair of distinct positions in `items`.
fn pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| items[i + 1..].iter().map(move |b| (a, b)))
}
