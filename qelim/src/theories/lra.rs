//! Linear real arithmetic, with Fourier-Motzkin elimination.

use super::{
    bound::{self, Bound},
    rings::{PolynomialAtoms, Preference},
    Theory,
};
use crate::{
    ast::{Atom, Formula, Polynomial, Quantifier, Relation},
    qe::EliminationError,
    simplify::{Connective, Merge, Simplifier},
};
use itertools::Itertools;
use num_traits::Signed;
use std::cmp::Ordering;

/// A row `p REL 0`, where `REL` is one of `=`, `<` or `<=`.
type Row = (Relation, Polynomial);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearArithmetic {
    rings: PolynomialAtoms,
    remove_unbounded: bool,
}

impl Default for LinearArithmetic {
    fn default() -> Self {
        Self {
            rings: PolynomialAtoms::new(),
            remove_unbounded: true,
        }
    }
}

impl LinearArithmetic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the preferred direction of order relations in canonical atoms.
    pub fn prefer(mut self, value: Preference) -> Self {
        self.rings = self.rings.prefer(Some(value));
        self
    }

    /// If `true` (the default), a variable that is bounded from only one side is eliminated by
    /// dropping its bounds. Otherwise, finding such a variable is an error.
    pub fn remove_unbounded(mut self, value: bool) -> Self {
        self.remove_unbounded = value;
        self
    }

    /// Checks that `atom` is a linear row `p REL 0`, returning its relation and polynomial.
    fn as_row(atom: &Atom) -> Result<(Relation, &Polynomial), EliminationError> {
        match atom {
            Atom::Binary(_, _, rhs) if !rhs.is_zero() => {
                Err(EliminationError::NonZeroRhs(atom.clone()))
            }
            Atom::Binary(_, lhs, _) if !lhs.is_linear() => {
                Err(EliminationError::NonLinear(atom.clone()))
            }
            Atom::Binary(relation, lhs, _) => Ok((*relation, lhs)),
            _ => Err(EliminationError::NotBinary(atom.clone())),
        }
    }

    fn eliminate_rows(&self, x: &str, rows: Vec<Row>) -> Result<Vec<Row>, EliminationError> {
        let mut untouched = Vec::new();
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        let mut equalities = Vec::new();
        for (relation, p) in rows {
            let b = bound::bound(&Atom::with_zero(relation, p.clone()), x);
            log::trace!("'{} {} 0' is {:?} for '{}'", p, relation, b, x);
            if b.is_empty() {
                untouched.push((relation, p));
            } else if b == Bound::all() {
                equalities.push(p);
            } else if b == Bound::UPPER {
                upper.push((relation, p));
            } else {
                lower.push((relation, p));
            }
        }

        if let Some((e, others)) = equalities.split_first() {
            // Solve `a * x + r = 0` for `x` and substitute it into every other row. Rows are
            // scaled by `|a|`, so their relations are kept.
            let a = e.coefficient(x);
            let r = e.without(x);
            let sign = a.signum();
            let others = others.iter().map(|p| (Relation::Eq, p.clone()));
            for (relation, p) in lower.into_iter().chain(upper).chain(others) {
                let b = p.coefficient(x);
                let substituted = p.without(x).scale(&a.abs()) - r.scale(&(&b * &sign));
                untouched.push((relation, substituted));
            }
            return Ok(untouched);
        }

        if lower.is_empty() || upper.is_empty() {
            if !self.remove_unbounded {
                return Err(EliminationError::UnboundedVariable(x.to_owned()));
            }
            log::debug!("'{}' is unbounded, dropping its bounds", x);
            return Ok(untouched);
        }

        log::debug!(
            "combining {} lower and {} upper bound(s) on '{}'",
            lower.len(),
            upper.len(),
            x
        );
        for ((lo, lp), (uo, up)) in lower.iter().cartesian_product(&upper) {
            let combined = lp.scale(&up.coefficient(x)) + up.scale(&lp.coefficient(x).abs());
            untouched.push((combine(*lo, *uo), combined));
        }
        Ok(untouched)
    }
}

/// The relation of the row obtained by combining a lower and an upper bound.
fn combine(lower: Relation, upper: Relation) -> Relation {
    match (lower, upper) {
        (Relation::Eq, other) | (other, Relation::Eq) => other,
        (l, u) if l.is_strict() || u.is_strict() => Relation::Lt,
        _ => Relation::Le,
    }
}

impl Theory for LinearArithmetic {
    fn name(&self) -> &'static str {
        "lra"
    }

    fn canonicalize_atom(&self, atom: &Atom) -> Result<Formula, EliminationError> {
        self.rings.canonicalize(self.name(), atom)
    }

    fn merge(&self, connective: Connective, a: &Atom, b: &Atom) -> Merge {
        self.rings.merge(connective, a, b)
    }

    fn compare(&self, a: &Atom, b: &Atom) -> Ordering {
        self.rings.compare(a, b)
    }

    fn qe1p(&self, x: &str, atoms: &[Atom]) -> Result<Formula, EliminationError> {
        let rows = atoms
            .iter()
            .map(Self::as_row)
            .collect::<Result<Vec<_>, _>>()?;

        // A disequality `p != 0` on `x` is split into `p < 0 or p > 0`, and each case is
        // eliminated separately
        let split = rows
            .iter()
            .position(|(r, p)| *r == Relation::Ne && p.contains_var(x));
        if let Some(i) = split {
            log::debug!("splitting disequality '{}'", atoms[i]);
            let mut cases = Vec::with_capacity(2);
            for relation in [Relation::Lt, Relation::Gt] {
                let mut atoms = atoms.to_vec();
                atoms[i] = Atom::with_zero(relation, rows[i].1.clone());
                cases.push(self.qe1p(x, &atoms)?);
            }
            return Ok(Formula::Or(cases));
        }

        let mut kept = Vec::new();
        let mut normalized = Vec::with_capacity(rows.len());
        for (relation, p) in rows {
            match relation {
                Relation::Ne => kept.push(Formula::Atom(Atom::with_zero(relation, p.clone()))),
                Relation::Eq | Relation::Lt | Relation::Le => {
                    normalized.push((relation, p.clone()));
                }
                Relation::Gt | Relation::Ge => normalized.push((relation.converse(), -p.clone())),
            }
        }

        let eliminated = self.eliminate_rows(x, normalized)?;
        kept.extend(
            eliminated
                .into_iter()
                .map(|(relation, p)| Formula::Atom(Atom::with_zero(relation, p))),
        );
        Ok(Formula::conjunction(kept))
    }
}

/// Applies one step of Fourier-Motzkin elimination to `formula`, eliminating `x`.
///
/// The formula must be in prenex form, with only existential quantifiers and a conjunction of
/// atoms as its matrix. If `x` is not quantified, the formula is returned unchanged. If
/// `eliminate_unbounded` is `true`, rows mentioning variables that are not bounded from both
/// sides are dropped, both before and after the step; otherwise, an unbounded `x` is an error.
/// The result is existentially closed and simplified, preferring `<` in its atoms.
pub fn fme(
    formula: &Formula,
    x: &str,
    eliminate_unbounded: bool,
) -> Result<Formula, EliminationError> {
    let prefix = formula.prefix_vars(Quantifier::Exists).ok_or_else(|| {
        EliminationError::NotApplicable(format!(
            "Fourier-Motzkin elimination needs an existential prefix, got '{}'",
            formula
        ))
    })?;
    if !prefix.iter().any(|y| y == x) {
        return Ok(formula.clone());
    }

    let theory = LinearArithmetic::new()
        .prefer(Preference::Lt)
        .remove_unbounded(false);
    let simplifier = Simplifier::new(&theory);
    let matrix = formula.matrix();
    if !matrix.is_quantifier_free() {
        return Err(EliminationError::NotConjunctive(matrix.clone()));
    }
    let rows = conjunctive_rows(&simplifier.simplify(matrix)?)?;
    let Some(rows) = rows else {
        // The matrix simplified to `false`
        return Ok(Formula::FALSE);
    };

    let rows = if eliminate_unbounded {
        bound::remove_unbounded(&rows)
    } else {
        rows
    };
    let (relevant, rest): (Vec<_>, Vec<_>) = rows.into_iter().partition(|row| row.contains_var(x));
    let mut args: Vec<_> = rest.into_iter().map(Formula::Atom).collect();
    if !relevant.is_empty() {
        args.push(theory.qe1p(x, &relevant)?);
    }
    let mut result = simplifier.simplify(&Formula::And(args))?;

    if eliminate_unbounded {
        if let Ok(Some(rows)) = conjunctive_rows(&result) {
            result = Formula::conjunction(
                bound::remove_unbounded(&rows)
                    .into_iter()
                    .map(Formula::Atom)
                    .collect(),
            );
        }
    }
    simplifier.simplify(&result.closure(Quantifier::Exists))
}

/// Splits a simplified conjunction into its atoms. Returns `None` if the formula is `false`.
fn conjunctive_rows(formula: &Formula) -> Result<Option<Vec<Atom>>, EliminationError> {
    if formula.is_bool_false() {
        return Ok(None);
    }
    if formula.is_bool_true() {
        return Ok(Some(Vec::new()));
    }
    formula
        .conjuncts()
        .iter()
        .map(|f| f.as_atom().cloned())
        .collect::<Option<Vec<_>>>()
        .map(Some)
        .ok_or_else(|| EliminationError::NotConjunctive(formula.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::tests::parse_formula, qe::QuantifierElimination};

    const DEFINITIONS: &str = "
        (set-logic LRA)
        (declare-fun x () Real)
        (declare-fun y () Real)
        (declare-fun z () Real)
        (declare-fun a () Real)
    ";

    fn parse(input: &str) -> Formula {
        parse_formula(DEFINITIONS, input)
    }

    fn atoms(theory: &LinearArithmetic, input: &str) -> Vec<Atom> {
        let f = Simplifier::new(theory).simplify(&parse(input)).unwrap();
        f.conjuncts().iter().map(|f| f.as_atom().unwrap().clone()).collect()
    }

    fn assert_qe1p(x: &str, input: &str, expected: &str) {
        let theory = LinearArithmetic::new();
        let simplifier = Simplifier::new(&theory);
        let got = theory.qe1p(x, &atoms(&theory, input)).unwrap();
        assert_eq!(
            simplifier.simplify(&parse(expected)).unwrap(),
            simplifier.simplify(&got).unwrap(),
            "{}",
            input
        );
    }

    #[test]
    fn test_fourier_motzkin() {
        assert_qe1p("x", "(and (< y x) (< x z))", "(< y z)");
        assert_qe1p("x", "(and (<= y x) (<= x z))", "(<= y z)");
        assert_qe1p("x", "(and (<= y x) (< x z))", "(< y z)");
        assert_qe1p(
            "x",
            "(and (<= y x) (<= a x) (<= x z) (< x 1))",
            "(and (<= y z) (< y 1) (<= a z) (< a 1))",
        );
        assert_qe1p("x", "(and (<= (* 2 x) y) (>= (* 3 x) z))", "(<= (* 2 z) (* 3 y))");
    }

    #[test]
    fn test_equality_substitution() {
        assert_qe1p("x", "(and (= x 1) (= y x))", "(= y 1)");
        assert_qe1p("x", "(and (= (- x) y) (< x z))", "(< (- y) z)");
        assert_qe1p(
            "x",
            "(and (= (* 2 x) y) (<= x 1) (= x z))",
            "(and (<= z 1) (= y (* 2 z)))",
        );
        assert_qe1p("x", "(and (= x 1) (= x 2))", "false");
    }

    #[test]
    fn test_unbounded() {
        assert_qe1p("x", "(and (< y x) (< z x))", "true");

        let strict = LinearArithmetic::new().remove_unbounded(false);
        let err = strict.qe1p("x", &atoms(&strict, "(< y x)")).unwrap_err();
        assert!(matches!(err, EliminationError::UnboundedVariable(x) if x == "x"));
    }

    #[test]
    fn test_disequalities() {
        assert_qe1p("x", "(and (distinct x y) (< x z))", "true");
        assert_qe1p(
            "x",
            "(and (distinct x y) (<= z x) (<= x a))",
            "(or (and (< z y) (<= z a)) (and (< y a) (<= z a)))",
        );
    }

    #[test]
    fn test_invalid_rows() {
        let theory = LinearArithmetic::new();
        let x = Polynomial::var("x");
        let cases = [
            Atom::new(Relation::Lt, x.clone(), Polynomial::from(1)),
            Atom::with_zero(Relation::Lt, x.clone() * x),
            Atom::AtLeast(2),
        ];
        for atom in cases {
            assert!(theory.qe1p("x", &[atom]).is_err());
        }
    }

    #[test]
    fn test_scenarios() {
        let theory = LinearArithmetic::new();
        let qe = QuantifierElimination::new(&theory);
        let cases = [
            (
                "(exists ((x Real) (y Real) (z Real))
                    (and (>= (- (+ x y) (* 2 z)) 2)
                        (>= (+ (- x) (* (- 3) y) z) 0)
                        (>= (+ y z) 1)))",
                Formula::TRUE,
            ),
            (
                "(exists ((x Real) (y Real) (z Real)) (and
                    (>= (+ x y (* 2 z)) 1) (>= (+ (- x) y z) 2)
                    (>= (+ (- x y) z) 1) (>= (- (- y) (* 3 z)) 0)))",
                Formula::FALSE,
            ),
            ("(exists ((x Real) (y Real)) (and (>= x 1) (< y 0) (> y 0)))", Formula::FALSE),
            ("(exists ((x Real) (y Real)) (and (= x 1) (= y x)))", Formula::TRUE),
            ("(exists ((x Real) (y Real)) (and (= x 1) (= y x) (= y 2)))", Formula::FALSE),
        ];
        for (input, expected) in cases {
            assert_eq!(expected, qe.eliminate(&parse(input)).unwrap(), "{}", input);
        }
    }

    #[test]
    fn test_fme() {
        let f = parse("(exists ((x Real) (y Real)) (and (< y x) (< x 1) (< 0 y)))");
        let got = fme(&f, "x", false).unwrap();
        let expected = parse("(exists ((y Real)) (and (< y 1) (< 0 y)))");
        let lt = LinearArithmetic::new().prefer(Preference::Lt);
        let simplifier = Simplifier::new(&lt);
        assert_eq!(simplifier.simplify(&expected).unwrap(), got);

        // `z` is not quantified
        assert_eq!(f, fme(&f, "z", true).unwrap());

        // `x` is only bounded from below
        let f = parse("(exists ((x Real) (y Real)) (and (< y x) (< y 1)))");
        assert!(matches!(
            fme(&f, "x", false),
            Err(EliminationError::UnboundedVariable(_))
        ));
        let got = fme(&f, "x", true).unwrap();
        assert_eq!(Formula::TRUE, got);

        let f = parse("(exists ((x Real)) (forall ((y Real)) (< x y)))");
        assert!(matches!(fme(&f, "x", true), Err(EliminationError::NotApplicable(_))));
        let f = parse("(exists ((x Real)) (or (< x y) (< x z)))");
        assert!(matches!(fme(&f, "x", true), Err(EliminationError::NotConjunctive(_))));
    }
}
