//! The simplifier, a fixpoint normalizer parameterized by the atom hooks of a theory.
//!
//! Simplified formulas are in negation normal form: `Not`, `Implies` and `Equivalent` never
//! survive simplification, and negations are absorbed into the atoms by taking their complements.

use crate::{
    ast::{Atom, Formula},
    qe::EliminationError,
    theories::Theory,
};
use std::cmp::Ordering;

/// One of the two associative Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// The truth value that can be dropped from the arguments of this connective.
    pub fn identity(self) -> bool {
        self == Connective::And
    }

    /// The truth value that makes the whole connective equal to itself.
    pub fn absorbing(self) -> bool {
        !self.identity()
    }

    pub fn dual(self) -> Connective {
        match self {
            Connective::And => Connective::Or,
            Connective::Or => Connective::And,
        }
    }

    /// Builds a formula of this connective, without wrapping empty or single argument lists.
    pub fn build(self, args: Vec<Formula>) -> Formula {
        match self {
            Connective::And => Formula::conjunction(args),
            Connective::Or => Formula::disjunction(args),
        }
    }
}

/// The outcome of merging two atoms that are arguments of the same connective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merge {
    /// The atoms can't be merged.
    Unrelated,

    /// The left atom alone is equivalent to both atoms under the connective.
    KeepLeft,

    /// The right atom alone is equivalent to both atoms under the connective.
    KeepRight,

    /// Both atoms together are equivalent to a truth value. If it is the absorbing element of
    /// the connective, the whole connective collapses, otherwise both atoms are dropped.
    Truth(bool),

    /// Both atoms together are equivalent to a single, already canonical, atom.
    Replace(Atom),
}

pub struct Simplifier<'t, T: Theory + ?Sized> {
    theory: &'t T,
}

impl<'t, T: Theory + ?Sized> Simplifier<'t, T> {
    pub fn new(theory: &'t T) -> Self {
        Self { theory }
    }

    pub fn simplify(&self, formula: &Formula) -> Result<Formula, EliminationError> {
        match formula {
            Formula::Bool(_) => Ok(formula.clone()),
            Formula::Atom(atom) => self.theory.canonicalize_atom(atom),
            Formula::Implies(a, b) => {
                self.simplify(&Formula::Or(vec![Formula::Not(a.clone()), (**b).clone()]))
            }
            Formula::Equivalent(a, b) => self.simplify(&Formula::And(vec![
                Formula::Or(vec![Formula::Not(a.clone()), (**b).clone()]),
                Formula::Or(vec![Formula::Not(b.clone()), (**a).clone()]),
            ])),
            Formula::Quant(q, x, body) => {
                let body = self.simplify(body)?;
                if body.free_vars().contains(x) {
                    Ok(Formula::quant(*q, x.clone(), body))
                } else {
                    Ok(body)
                }
            }
            Formula::Not(inner) => {
                // The simplified argument is in NNF, so its negation only complements atoms,
                // flips quantifiers and dualizes connectives
                let inner = self.simplify(inner)?;
                self.simplify(&inner.negated_nnf())
            }
            Formula::And(args) => self.simplify_connective(Connective::And, args),
            Formula::Or(args) => self.simplify_connective(Connective::Or, args),
        }
    }

    fn simplify_connective(
        &self,
        connective: Connective,
        args: &[Formula],
    ) -> Result<Formula, EliminationError> {
        let mut atoms = Vec::new();
        let mut others = Vec::new();
        for arg in args {
            let simplified = self.simplify(arg)?;
            let flattened = match (connective, simplified) {
                (_, Formula::Bool(b)) if b == connective.absorbing() => return Ok(Formula::Bool(b)),
                (_, Formula::Bool(_)) => continue,
                (Connective::And, Formula::And(inner)) | (Connective::Or, Formula::Or(inner)) => {
                    inner
                }
                (_, other) => vec![other],
            };
            for f in flattened {
                match f {
                    Formula::Atom(a) => atoms.push(a),
                    other => others.push(other),
                }
            }
        }

        atoms.sort();
        atoms.dedup();
        let Some(mut atoms) = self.merge_atoms(connective, atoms) else {
            return Ok(Formula::Bool(connective.absorbing()));
        };
        atoms.sort_by(|a, b| self.compare_atoms(a, b));
        atoms.dedup();

        others.sort();
        others.dedup();

        let args = atoms.into_iter().map(Formula::Atom).chain(others).collect();
        Ok(connective.build(args))
    }

    /// Merges pairs of atoms until no pair can be merged anymore. Returns `None` if the atoms
    /// collapse to the absorbing element of the connective.
    fn merge_atoms(&self, connective: Connective, atoms: Vec<Atom>) -> Option<Vec<Atom>> {
        let mut slots: Vec<Option<Atom>> = atoms.into_iter().map(Some).collect();
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..slots.len() {
                for j in (i + 1)..slots.len() {
                    let outcome = match (&slots[i], &slots[j]) {
                        (Some(a), Some(b)) if a == b => Merge::KeepLeft,
                        (Some(a), Some(b)) => self.theory.merge(connective, a, b),
                        _ => continue,
                    };
                    match outcome {
                        Merge::Unrelated => continue,
                        Merge::KeepLeft => slots[j] = None,
                        Merge::KeepRight => slots[i] = None,
                        Merge::Truth(b) if b == connective.absorbing() => return None,
                        Merge::Truth(_) => {
                            slots[i] = None;
                            slots[j] = None;
                        }
                        Merge::Replace(atom) => {
                            log::trace!(
                                "merged '{:?}' and '{:?}' into '{}'",
                                slots[i],
                                slots[j],
                                atom
                            );
                            slots[i] = Some(atom);
                            slots[j] = None;
                        }
                    }
                    changed = true;
                }
            }
        }
        Some(slots.into_iter().flatten().collect())
    }

    fn compare_atoms(&self, a: &Atom, b: &Atom) -> Ordering {
        self.theory.compare(a, b).then_with(|| a.cmp(b))
    }
}
