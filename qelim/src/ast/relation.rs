use bitflags::bitflags;
use std::cmp::Ordering;

/// A binary relation between two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    /// The `=` relation.
    Eq,

    /// The `distinct` relation, which is binary when it appears in an atom.
    Ne,

    /// The `<` relation.
    Lt,

    /// The `<=` relation.
    Le,

    /// The `>` relation.
    Gt,

    /// The `>=` relation.
    Ge,
}

impl_str_conversion_traits!(Relation {
    Eq: "=",
    Ne: "distinct",
    Lt: "<",
    Le: "<=",
    Gt: ">",
    Ge: ">=",
});

bitflags! {
    /// The possible signs of `lhs - rhs` that make an atom `lhs REL rhs` hold. Intersecting two
    /// sign sets gives the conjunction of the atoms, and their union gives the disjunction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Signs: u8 {
        const NEGATIVE = 1 << 0;
        const ZERO = 1 << 1;
        const POSITIVE = 1 << 2;
    }
}

impl Relation {
    /// Every relation, in declaration order.
    pub const ALL: [Relation; 6] = [Self::Eq, Self::Ne, Self::Lt, Self::Le, Self::Gt, Self::Ge];

    /// The relation that holds exactly when `self` doesn't, e.g. `<` and `>=`.
    pub const fn complement(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }

    /// The relation obtained by swapping the sides of an atom, e.g. `a < b` becomes `b > a`.
    pub const fn converse(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }

    /// Returns `true` for the strict order relations `<` and `>`.
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Lt | Self::Gt)
    }

    /// Returns `true` if the relation only makes sense over an ordered domain.
    pub const fn is_order(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }

    /// Decides `a REL b`, given the result of comparing `a` with `b`.
    pub fn holds(self, ordering: Ordering) -> bool {
        self.signs().contains(Signs::from(ordering))
    }

    pub fn signs(self) -> Signs {
        match self {
            Self::Eq => Signs::ZERO,
            Self::Ne => Signs::NEGATIVE | Signs::POSITIVE,
            Self::Lt => Signs::NEGATIVE,
            Self::Le => Signs::NEGATIVE | Signs::ZERO,
            Self::Gt => Signs::POSITIVE,
            Self::Ge => Signs::ZERO | Signs::POSITIVE,
        }
    }

    /// The relation whose sign set is `signs`. Returns `None` for the empty and the full sign
    /// sets, which correspond to `false` and `true`.
    pub fn from_signs(signs: Signs) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.signs() == signs)
    }
}

impl From<Ordering> for Signs {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Signs::NEGATIVE,
            Ordering::Equal => Signs::ZERO,
            Ordering::Greater => Signs::POSITIVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_complement_and_converse_are_involutions() {
        for r in Relation::ALL {
            assert_eq!(r, r.complement().complement());
            assert_eq!(r, r.converse().converse());
            assert_eq!(Signs::all(), r.signs() | r.complement().signs());
            assert!((r.signs() & r.complement().signs()).is_empty());
        }
        assert_eq!(Relation::Ge, Relation::Lt.complement());
        assert_eq!(Relation::Gt, Relation::Lt.converse());
    }

    #[test]
    fn test_sign_algebra() {
        let join = |a: Relation, b: Relation| Relation::from_signs(a.signs() | b.signs());
        let meet = |a: Relation, b: Relation| Relation::from_signs(a.signs() & b.signs());

        assert_eq!(Some(Relation::Le), join(Relation::Lt, Relation::Eq));
        assert_eq!(Some(Relation::Ne), join(Relation::Lt, Relation::Gt));
        assert_eq!(None, join(Relation::Ge, Relation::Le));
        assert_eq!(Some(Relation::Eq), meet(Relation::Ge, Relation::Le));
        assert_eq!(Some(Relation::Gt), meet(Relation::Ge, Relation::Ne));
        assert_eq!(None, meet(Relation::Lt, Relation::Gt));
    }

    #[test]
    fn test_holds() {
        assert!(Relation::Le.holds(Ordering::Equal));
        assert!(!Relation::Lt.holds(Ordering::Equal));
        assert!(Relation::Ne.holds(Ordering::Greater));

        let strict: Vec<_> = Relation::ALL.into_iter().filter(|r| r.is_strict()).collect();
        assert_eq!(vec![Relation::Lt, Relation::Gt], strict);
    }

    #[test]
    fn test_str_conversion() {
        for r in Relation::ALL {
            assert_eq!(Ok(r), Relation::from_str(&r.to_string()));
        }
        assert_eq!(Err(()), Relation::from_str("=="));
    }
}
