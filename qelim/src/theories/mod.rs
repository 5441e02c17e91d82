//! The theories that quantifiers can be eliminated in.
//!
//! A theory provides two things: the hooks the simplifier uses to canonicalize, merge and order
//! atoms, and `qe1p`, which eliminates a single existential variable from a conjunction of atoms.
//! Everything else, including universal quantifiers and disjunctions, is handled generically by
//! the driver in the `qe` module.

pub mod bound;
pub mod lra;
pub mod rings;
pub mod sets;
pub mod zmod;

pub use lra::{fme, LinearArithmetic};
pub use rings::{PolynomialAtoms, Preference};
pub use sets::Equality;
pub use zmod::Modular;

use crate::{
    ast::{Atom, Formula},
    qe::EliminationError,
    simplify::{Connective, Merge},
};
use std::cmp::Ordering;

pub trait Theory {
    /// A short name for the theory, used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Returns the canonical form of an atom, which is either an equivalent atom or a truth
    /// value. Applying this to an atom it returned must give back the same atom.
    fn canonicalize_atom(&self, atom: &Atom) -> Result<Formula, EliminationError> {
        Ok(Formula::Atom(atom.clone()))
    }

    /// Tries to merge two distinct canonical atoms that are arguments of the same connective.
    /// The outcome must not depend on the order of the atoms, other than swapping `KeepLeft` and
    /// `KeepRight`.
    fn merge(&self, _connective: Connective, _a: &Atom, _b: &Atom) -> Merge {
        Merge::Unrelated
    }

    /// A total order on canonical atoms, used to sort the arguments of simplified connectives.
    /// Atoms that compare as equal are further ordered structurally.
    fn compare(&self, a: &Atom, b: &Atom) -> Ordering {
        a.cmp(b)
    }

    /// Eliminates `x` from `∃x. atoms[0] ∧ ... ∧ atoms[n]`. Every atom is canonical and
    /// mentions `x`. The result must be quantifier-free and must not mention `x`.
    fn qe1p(&self, x: &str, atoms: &[Atom]) -> Result<Formula, EliminationError>;
}
