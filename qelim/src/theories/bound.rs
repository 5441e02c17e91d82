//! Classification of linear rows as lower or upper bounds on a variable.

use crate::ast::{Atom, Relation, Var};
use ahash::AHashSet;
use bitflags::bitflags;
use num_traits::{Signed, Zero};

bitflags! {
    /// How an atom bounds a variable. An equality bounds it from both sides, and an atom that
    /// doesn't mention the variable doesn't bound it at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Bound: u8 {
        const NONE = 0;
        const LOWER = 1 << 0;
        const UPPER = 1 << 1;
    }
}

/// Classifies the row `p REL 0` with respect to `x`. Rows using `distinct`, and atoms that are
/// not binary, don't bound any variable.
pub fn bound(atom: &Atom, x: &str) -> Bound {
    let Atom::Binary(relation, lhs, _) = atom else {
        return Bound::NONE;
    };
    let a = lhs.coefficient(x);
    if a.is_zero() {
        return Bound::NONE;
    }
    match relation {
        Relation::Eq => Bound::all(),
        Relation::Ne => Bound::NONE,
        Relation::Lt | Relation::Le if a.is_positive() => Bound::UPPER,
        Relation::Gt | Relation::Ge if a.is_negative() => Bound::UPPER,
        _ => Bound::LOWER,
    }
}

/// Drops every row that mentions a variable which is not bounded from both sides by the rows.
pub fn remove_unbounded(rows: &[Atom]) -> Vec<Atom> {
    let mut lower: AHashSet<Var> = AHashSet::new();
    let mut upper: AHashSet<Var> = AHashSet::new();
    for row in rows {
        for x in row.vars() {
            let b = bound(row, &x);
            if b.contains(Bound::LOWER) {
                lower.insert(x.clone());
            }
            if b.contains(Bound::UPPER) {
                upper.insert(x);
            }
        }
    }
    log::debug!("variables bounded from below: {:?}", lower);
    log::debug!("variables bounded from above: {:?}", upper);

    rows.iter()
        .filter(|row| row.vars().iter().all(|x| lower.contains(x) && upper.contains(x)))
        .cloned()
        .collect()
}
