//! Atom hooks shared by the theories whose atoms compare polynomials.
//!
//! Every canonical atom has the form `p REL 0`, where `p` is a primitive polynomial (integer
//! coefficients with no common divisor) that is not constant.

use crate::{
    ast::{Atom, Formula, Polynomial, Relation},
    qe::EliminationError,
    simplify::{Connective, Merge},
};
use num_rational::BigRational;
use num_traits::Zero;
use std::cmp::Ordering;

/// A preferred direction for order relations in canonical atoms. With `Lt`, atoms using `>` or
/// `>=` are rewritten to use `<` or `<=`, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preference {
    Lt,
    Gt,
}

impl_str_conversion_traits!(Preference { Lt: "lt", Gt: "gt" });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolynomialAtoms {
    prefer: Option<Preference>,
}

impl PolynomialAtoms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer(mut self, value: Option<Preference>) -> Self {
        self.prefer = value;
        self
    }

    pub fn preference(&self) -> Option<Preference> {
        self.prefer
    }

    /// Canonicalizes an atom of the theory called `theory`. Cardinality atoms are rejected.
    pub fn canonicalize(
        &self,
        theory: &'static str,
        atom: &Atom,
    ) -> Result<Formula, EliminationError> {
        match atom {
            Atom::Binary(relation, lhs, rhs) => {
                Ok(self.canonical(*relation, lhs.clone() - rhs.clone()))
            }
            _ => Err(EliminationError::UnsupportedAtom { theory, atom: atom.clone() }),
        }
    }

    /// The canonical form of `p REL 0`.
    ///
    /// Ground atoms are evaluated. Otherwise, `p` is made primitive and then oriented: with a
    /// preference, order relations are rewritten to the preferred direction; without one, and
    /// always for `=` and `distinct`, the leading coefficient is made positive.
    pub fn canonical(&self, relation: Relation, p: Polynomial) -> Formula {
        if let Some(value) = p.constant_value() {
            return Formula::Bool(relation.holds(value.cmp(&BigRational::zero())));
        }
        let p = p.primitive();
        let flip = match (self.prefer, relation) {
            (None, _) | (_, Relation::Eq | Relation::Ne) => p.is_negative(),
            (Some(Preference::Lt), Relation::Gt | Relation::Ge)
            | (Some(Preference::Gt), Relation::Lt | Relation::Le) => true,
            (Some(_), _) => false,
        };
        if flip {
            Formula::Atom(Atom::with_zero(relation.converse(), -p))
        } else {
            Formula::Atom(Atom::with_zero(relation, p))
        }
    }

    /// Merges atoms whose left-hand sides are equal or opposite, by intersecting (for `and`) or
    /// joining (for `or`) the sets of signs that satisfy them.
    pub fn merge(&self, connective: Connective, a: &Atom, b: &Atom) -> Merge {
        let (Atom::Binary(ra, pa, za), Atom::Binary(rb, pb, zb)) = (a, b) else {
            return Merge::Unrelated;
        };
        if !za.is_zero() || !zb.is_zero() {
            return Merge::Unrelated;
        }

        // `b` is rewritten to have the same left-hand side as `a`
        let rb = if pa == pb {
            *rb
        } else if *pa == -pb.clone() {
            rb.converse()
        } else {
            return Merge::Unrelated;
        };

        let signs = match connective {
            Connective::And => ra.signs() & rb.signs(),
            Connective::Or => ra.signs() | rb.signs(),
        };
        match Relation::from_signs(signs) {
            None => Merge::Truth(!signs.is_empty()),
            Some(r) if r == *ra => Merge::KeepLeft,
            Some(r) if r == rb => Merge::KeepRight,
            Some(r) => match self.canonical(r, pa.clone()) {
                Formula::Atom(merged) => Merge::Replace(merged),
                Formula::Bool(value) => Merge::Truth(value),
                _ => Merge::Unrelated,
            },
        }
    }

    /// Orders atoms by the degree of their left-hand sides, higher degrees first, then by the
    /// left-hand sides themselves, and finally by relation.
    pub fn compare(&self, a: &Atom, b: &Atom) -> Ordering {
        match (a, b) {
            (Atom::Binary(ra, pa, _), Atom::Binary(rb, pb, _)) => {
                pa.cmp_by_degree(pb).then_with(|| ra.cmp(rb))
            }
            _ => a.cmp(b),
        }
    }
}
