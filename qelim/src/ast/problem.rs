use super::{Formula, Var};
use std::fmt;

/// The sort of a declared constant or bound variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sort {
    Bool,
    Int,
    Real,

    /// A user-declared uninterpreted sort, introduced by `declare-sort`.
    Atom(String),
}

impl Sort {
    /// Returns `true` for the numeric sorts `Int` and `Real`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int | Sort::Real)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
            Sort::Real => write!(f, "Real"),
            Sort::Atom(name) => write!(f, "{}", super::printer::quote_symbol(name)),
        }
    }
}

/// A problem in the SMT-LIB format.
///
/// Only the commands that matter for quantifier elimination are kept: the logic string, the
/// declarations, and the assertions.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    /// The problem's logic string, if it exists.
    pub logic: Option<String>,

    /// The names of the sorts declared with `declare-sort`.
    pub sort_declarations: Vec<String>,

    /// The declared constants, in the order they were declared.
    pub declarations: Vec<(Var, Sort)>,

    /// The formulas introduced in the `assert` commands.
    pub assertions: Vec<Formula>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conjunction of every assertion in the problem.
    pub fn formula(&self) -> Formula {
        Formula::conjunction(self.assertions.clone())
    }
}
