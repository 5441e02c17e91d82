//! The types for elimination errors.

use crate::ast::{Atom, Formula, Relation, Var};
use num_bigint::BigInt;
use thiserror::Error;

/// The error type for simplification and quantifier elimination. Every variant signals a
/// malformed input or a formula outside the fragment a theory supports, so these errors are never
/// recovered from.
#[derive(Debug, Error)]
pub enum EliminationError {
    /// A theory received an atom with a relation it doesn't support, e.g. `<` in modular
    /// arithmetic.
    #[error("theory '{theory}' does not support relation '{relation}' in atom '{atom}'")]
    UnsupportedRelation {
        theory: &'static str,
        relation: Relation,
        atom: Atom,
    },

    /// A cardinality atom reached a theory that only handles binary atoms.
    #[error("expected a binary atom, got '{0}'")]
    NotBinary(Atom),

    /// An atom whose right-hand side was not normalized to zero reached an elimination step.
    #[error("right-hand side of atom '{0}' must be zero")]
    NonZeroRhs(Atom),

    /// An atom that is not linear reached linear elimination.
    #[error("atom '{0}' is not linear")]
    NonLinear(Atom),

    /// A side of an equality atom is not a variable.
    #[error("'{0}' is not a variable")]
    NotAVariable(String),

    /// A coefficient in modular arithmetic is not an integer.
    #[error("atom '{0}' has a non-integer coefficient")]
    NonIntegerCoefficient(Atom),

    /// A variable bounded from only one side was found while unbounded removal was disabled.
    #[error("variable '{0}' is unbounded")]
    UnboundedVariable(Var),

    /// A formula that should be a conjunction of atoms is not.
    #[error("expected a conjunction of atoms, got '{0}'")]
    NotConjunctive(Formula),

    /// A standalone elimination step was applied to a formula outside its fragment.
    #[error("{0}")]
    NotApplicable(String),

    /// The modulus of modular arithmetic must be positive.
    #[error("invalid modulus: {0}")]
    InvalidModulus(BigInt),

    /// A theory received an atom kind it doesn't know about, e.g. a cardinality atom in arithmetic.
    #[error("theory '{theory}' does not support atom '{atom}'")]
    UnsupportedAtom { theory: &'static str, atom: Atom },
}
