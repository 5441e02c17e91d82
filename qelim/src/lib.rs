#![deny(clippy::disallowed_methods)]
#![deny(clippy::self_named_module_files)]
#![warn(clippy::branches_sharing_code)]
#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::equatable_if_let)]
#![warn(clippy::explicit_into_iter_loop)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::from_iter_instead_of_collect)]
#![warn(clippy::get_unwrap)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::manual_assert)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::match_wildcard_for_single_variants)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::str_to_string)]
#![warn(clippy::string_to_string)]
#![warn(clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::unnecessary_wraps)]
#![warn(clippy::unnested_or_patterns)]
#![warn(clippy::unused_self)]

#[macro_use]
pub mod ast;
pub mod parser;
pub mod qe;
pub mod simplify;
pub mod theories;
mod utils;

use ast::Formula;
use parser::{ParserError, Position};
use qe::{EliminationError, QuantifierElimination};
use simplify::Simplifier;
use std::io;
use theories::Theory;
use thiserror::Error;

pub type QeResult<T> = Result<T, Error>;

fn wrap_parser_error_message(e: &ParserError, pos: &Position) -> String {
    format!("parser error: {} (on line {}, column {})", e, pos.0, pos.1)
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{}", wrap_parser_error_message(.0, .1))]
    Parser(ParserError, Position),

    #[error("elimination error: {0}")]
    Elimination(#[from] EliminationError),
}

/// Eliminates every quantifier of `formula`, returning an equivalent quantifier-free formula.
pub fn eliminate<T: Theory + ?Sized>(
    theory: &T,
    formula: &Formula,
) -> Result<Formula, EliminationError> {
    QuantifierElimination::new(theory).eliminate(formula)
}

/// Simplifies `formula` using the atom canonicalization and merge rules of `theory`.
pub fn simplify<T: Theory + ?Sized>(
    theory: &T,
    formula: &Formula,
) -> Result<Formula, EliminationError> {
    Simplifier::new(theory).simplify(formula)
}

/// Parses an SMT-LIB script and eliminates the quantifiers of the conjunction of its assertions.
pub fn eliminate_problem<R: io::BufRead, T: Theory + ?Sized>(
    input: R,
    parser_config: parser::Config,
    theory: &T,
) -> QeResult<Formula> {
    let problem = parser::parse_problem(input, parser_config)?;
    log::info!(
        "parsed {} assertion(s) over {} declared constant(s)",
        problem.assertions.len(),
        problem.declarations.len()
    );
    Ok(eliminate(theory, &problem.formula())?)
}
