//! The abstract syntax tree (AST) for first-order formulas over polynomial atoms.
//!
//! This module also contains the normal form transformations used by the elimination procedure,
//! and the printing of formulas in SMT-LIB syntax.

#[macro_use]
mod macros;
mod formula;
mod normal_form;
mod polynomial;
pub(crate) mod printer;
mod problem;
mod relation;
#[cfg(test)]
mod tests;

pub use formula::{fresh_name, Atom, Formula, Quantifier};
pub use normal_form::{Block, Prenex};
pub use polynomial::{Monomial, Polynomial, Var};
pub use problem::{Problem, Sort};
pub use relation::{Relation, Signs};
