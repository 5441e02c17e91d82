//! The theory of equality over an uninterpreted domain, with cardinality constraints.
//!
//! Besides equalities and disequalities between variables, formulas may use the atoms
//! `AtLeast(k)` and `FewerThan(k)`, which constrain the size of the domain. These are needed to
//! eliminate quantifiers: `∃x. x ≠ y` holds exactly when the domain has at least two elements.

use super::Theory;
use crate::{
    ast::{Atom, Formula, Polynomial, Relation, Var},
    qe::EliminationError,
    simplify::{Connective, Merge},
};
use itertools::Itertools;
use std::{cmp::Ordering, collections::BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Equality;

impl Equality {
    pub fn new() -> Self {
        Self
    }

    /// Checks that `atom` is an equality or disequality between two variables, returning its
    /// relation and both sides.
    fn as_equation(&self, atom: &Atom) -> Result<(Relation, Var, Var), EliminationError> {
        let Atom::Binary(relation, lhs, rhs) = atom else {
            return Err(EliminationError::NotBinary(atom.clone()));
        };
        if relation.is_order() {
            return Err(EliminationError::UnsupportedRelation {
                theory: self.name(),
                relation: *relation,
                atom: atom.clone(),
            });
        }
        let as_var = |p: &Polynomial| {
            p.as_var()
                .cloned()
                .ok_or_else(|| EliminationError::NotAVariable(p.to_string()))
        };
        Ok((*relation, as_var(lhs)?, as_var(rhs)?))
    }

    /// Builds the formula "every variable in `zs` is equal to some variable in a subset of `zs`
    /// of size `k`, whose members are pairwise distinct". In other words, the variables in `zs`
    /// take exactly `k` distinct values.
    pub fn eta(k: usize, zs: &[Var]) -> Formula {
        let cases = zs
            .iter()
            .combinations(k)
            .map(|choice| {
                let covered = zs.iter().filter(|z| !choice.contains(z)).map(|z| {
                    let options = choice.iter().map(|c| equation(Relation::Eq, z, c)).collect();
                    Formula::disjunction(options)
                });
                let distinct = choice
                    .iter()
                    .tuple_combinations()
                    .map(|(a, b)| equation(Relation::Ne, a, b));
                Formula::conjunction(covered.chain(distinct).collect())
            })
            .collect();
        Formula::disjunction(cases)
    }
}

fn equation(relation: Relation, a: &str, b: &str) -> Formula {
    Formula::atom(relation, Polynomial::var(a), Polynomial::var(b))
}

/// The variables of an atom built by `Equality`, ordered by name.
fn sides(atom: &Atom) -> Option<(&Var, &Var)> {
    match atom {
        Atom::Binary(_, lhs, rhs) => Some((lhs.as_var()?, rhs.as_var()?)),
        _ => None,
    }
}

impl Theory for Equality {
    fn name(&self) -> &'static str {
        "eq"
    }

    fn canonicalize_atom(&self, atom: &Atom) -> Result<Formula, EliminationError> {
        match atom {
            Atom::AtLeast(k) if *k <= 1 => Ok(Formula::TRUE),
            Atom::FewerThan(k) if *k <= 1 => Ok(Formula::FALSE),
            Atom::AtLeast(_) | Atom::FewerThan(_) => Ok(Formula::Atom(atom.clone())),
            Atom::Binary(..) => {
                let (relation, lhs, rhs) = self.as_equation(atom)?;
                Ok(match lhs.cmp(&rhs) {
                    Ordering::Equal => Formula::Bool(relation == Relation::Eq),
                    Ordering::Less => equation(relation, &lhs, &rhs),
                    Ordering::Greater => equation(relation, &rhs, &lhs),
                })
            }
        }
    }

    fn merge(&self, connective: Connective, a: &Atom, b: &Atom) -> Merge {
        use Connective::{And, Or};

        let keep_larger = |i: u64, j: u64| {
            if i >= j {
                Merge::KeepLeft
            } else {
                Merge::KeepRight
            }
        };
        let keep_smaller = |i: u64, j: u64| keep_larger(j, i);
        match (connective, a, b) {
            (_, Atom::Binary(..), Atom::Binary(..)) if a.complement() == *b => {
                Merge::Truth(connective == Or)
            }
            (And, Atom::AtLeast(i), Atom::AtLeast(j))
            | (Or, Atom::FewerThan(i), Atom::FewerThan(j)) => keep_larger(*i, *j),
            (Or, Atom::AtLeast(i), Atom::AtLeast(j))
            | (And, Atom::FewerThan(i), Atom::FewerThan(j)) => keep_smaller(*i, *j),
            (And, Atom::AtLeast(i), Atom::FewerThan(j))
            | (And, Atom::FewerThan(j), Atom::AtLeast(i))
                if j <= i =>
            {
                Merge::Truth(false)
            }
            (Or, Atom::AtLeast(i), Atom::FewerThan(j))
            | (Or, Atom::FewerThan(j), Atom::AtLeast(i))
                if j >= i =>
            {
                Merge::Truth(true)
            }
            _ => Merge::Unrelated,
        }
    }

    /// Cardinality atoms come first, ordered by their index. Equations are ordered by their
    /// sides, compared by name.
    fn compare(&self, a: &Atom, b: &Atom) -> Ordering {
        match (a, b) {
            (Atom::Binary(..), Atom::Binary(..)) => sides(a).cmp(&sides(b)),
            (Atom::Binary(..), _) => Ordering::Greater,
            (_, Atom::Binary(..)) => Ordering::Less,
            (Atom::AtLeast(i) | Atom::FewerThan(i), Atom::AtLeast(j) | Atom::FewerThan(j)) => {
                i.cmp(j)
            }
        }
    }

    fn qe1p(&self, x: &str, atoms: &[Atom]) -> Result<Formula, EliminationError> {
        // Variables that are equal to `x`, and variables that are different from it
        let mut ys = BTreeSet::new();
        let mut zs = BTreeSet::new();
        let mut kept = Vec::new();
        for atom in atoms {
            let (relation, lhs, rhs) = self.as_equation(atom)?;
            let other = match (lhs == x, rhs == x) {
                (true, _) => rhs,
                (_, true) => lhs,
                (false, false) => {
                    kept.push(Formula::Atom(atom.clone()));
                    continue;
                }
            };
            if relation == Relation::Eq {
                ys.insert(other);
            } else {
                zs.insert(other);
            }
        }

        let mut ys = ys.into_iter();
        if let Some(y) = ys.next() {
            // `x` is equal to `y`, so it can be replaced by it
            log::debug!("substituting '{}' for '{}'", y, x);
            kept.extend(zs.iter().map(|z| equation(Relation::Ne, &y, z)));
            kept.extend(ys.map(|other| equation(Relation::Eq, &y, &other)));
            return Ok(Formula::conjunction(kept));
        }

        if zs.is_empty() {
            return Ok(Formula::conjunction(kept));
        }

        // There must be a value different from every variable in `zs`. If the variables in `zs`
        // take `k` distinct values, that is the case exactly when the domain has at least `k + 1`
        // elements
        let zs: Vec<Var> = zs.into_iter().collect();
        let cases = (1..=zs.len())
            .map(|k| {
                let at_least = Formula::Atom(Atom::AtLeast(k as u64 + 1));
                Formula::And(vec![Self::eta(k, &zs), at_least])
            })
            .collect();
        kept.push(Formula::disjunction(cases));
        Ok(Formula::conjunction(kept))
    }
}
