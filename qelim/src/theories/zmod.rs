//! Arithmetic modulo a fixed positive integer.
//!
//! Since the domain is finite, quantifiers are eliminated by grounding: `∃x. φ` becomes the
//! disjunction of `φ[x := i]` for every residue `i`.

use super::{rings::PolynomialAtoms, Theory};
use crate::{
    ast::{Atom, Formula, Polynomial, Quantifier, Relation},
    qe::EliminationError,
    simplify::{Connective, Merge, Simplifier},
};
use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modular {
    modulus: BigInt,
}

impl Modular {
    pub fn new(modulus: impl Into<BigInt>) -> Result<Self, EliminationError> {
        let modulus = modulus.into();
        if modulus < BigInt::one() {
            return Err(EliminationError::InvalidModulus(modulus));
        }
        Ok(Self { modulus })
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    /// Iterates over the residues `0, 1, ..., m - 1`.
    pub fn residues(&self) -> impl Iterator<Item = BigInt> + '_ {
        itertools::iterate(BigInt::zero(), |i| i + 1u32).take_while(|i| *i < self.modulus)
    }

    /// The finite disjunction or conjunction of `body[x := i]` over every residue `i`.
    fn expand(&self, quantifier: Quantifier, x: &str, body: &Formula) -> Formula {
        let cases = self
            .residues()
            .map(|i| body.substitute(x, &Polynomial::from(i)))
            .collect();
        match quantifier {
            Quantifier::Exists => Formula::Or(cases),
            Quantifier::Forall => Formula::And(cases),
        }
    }

    /// Eliminates every quantifier of `formula` by grounding, without going through the
    /// block-wise driver. Nested quantifiers are expanded from the inside out.
    pub fn ground(&self, formula: &Formula) -> Result<Formula, EliminationError> {
        let simplifier = Simplifier::new(self);
        let grounded = self.ground_inner(&simplifier, formula)?;
        simplifier.simplify(&grounded)
    }

    fn ground_inner(
        &self,
        simplifier: &Simplifier<Self>,
        formula: &Formula,
    ) -> Result<Formula, EliminationError> {
        let ground_box = |f: &Formula| -> Result<Box<Formula>, EliminationError> {
            Ok(Box::new(self.ground_inner(simplifier, f)?))
        };
        Ok(match formula {
            Formula::Bool(_) | Formula::Atom(_) => formula.clone(),
            Formula::Not(f) => Formula::Not(ground_box(f)?),
            Formula::And(args) => Formula::And(
                args.iter()
                    .map(|a| self.ground_inner(simplifier, a))
                    .collect::<Result<_, _>>()?,
            ),
            Formula::Or(args) => Formula::Or(
                args.iter()
                    .map(|a| self.ground_inner(simplifier, a))
                    .collect::<Result<_, _>>()?,
            ),
            Formula::Implies(a, b) => Formula::Implies(ground_box(a)?, ground_box(b)?),
            Formula::Equivalent(a, b) => Formula::Equivalent(ground_box(a)?, ground_box(b)?),
            Formula::Quant(q, x, body) => {
                let body = self.ground_inner(simplifier, body)?;
                simplifier.simplify(&self.expand(*q, x, &body))?
            }
        })
    }
}

impl Theory for Modular {
    fn name(&self) -> &'static str {
        "zmod"
    }

    /// Atoms are rewritten to `p = 0` or `p != 0`, with every coefficient of `p` reduced into
    /// `[0, m)`. Constant atoms are evaluated.
    fn canonicalize_atom(&self, atom: &Atom) -> Result<Formula, EliminationError> {
        let Atom::Binary(relation, lhs, rhs) = atom else {
            return Err(EliminationError::UnsupportedAtom {
                theory: self.name(),
                atom: atom.clone(),
            });
        };
        if relation.is_order() {
            return Err(EliminationError::UnsupportedRelation {
                theory: self.name(),
                relation: *relation,
                atom: atom.clone(),
            });
        }
        let p = (lhs.clone() - rhs.clone())
            .reduce_mod(&self.modulus)
            .ok_or_else(|| EliminationError::NonIntegerCoefficient(atom.clone()))?;
        Ok(if p.is_zero() {
            Formula::Bool(*relation == Relation::Eq)
        } else if p.constant_value().is_some() {
            Formula::Bool(*relation == Relation::Ne)
        } else {
            Formula::Atom(Atom::with_zero(*relation, p))
        })
    }

    fn merge(&self, connective: Connective, a: &Atom, b: &Atom) -> Merge {
        if a.complement() == *b {
            Merge::Truth(connective == Connective::Or)
        } else {
            Merge::Unrelated
        }
    }

    fn compare(&self, a: &Atom, b: &Atom) -> Ordering {
        PolynomialAtoms::new().compare(a, b)
    }

    fn qe1p(&self, x: &str, atoms: &[Atom]) -> Result<Formula, EliminationError> {
        log::debug!("grounding '{}' over {} residues", x, self.modulus);
        let conjunction = Formula::conjunction(atoms.iter().cloned().map(Formula::Atom).collect());
        Simplifier::new(self).simplify(&self.expand(Quantifier::Exists, x, &conjunction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::tests::parse_formula, qe::QuantifierElimination};

    const DEFINITIONS: &str = "
        (set-logic QF_NIA)
        (declare-fun a () Int)
        (declare-fun b () Int)
    ";

    fn parse(input: &str) -> Formula {
        parse_formula(DEFINITIONS, input)
    }

    fn eliminate(modulus: u32, input: &str) -> Formula {
        let theory = Modular::new(modulus).unwrap();
        QuantifierElimination::new(&theory).eliminate(&parse(input)).unwrap()
    }

    #[test]
    fn test_canonical_atoms() {
        let theory = Modular::new(3).unwrap();
        let simplifier = Simplifier::new(&theory);
        let s = |input| simplifier.simplify(&parse(input)).unwrap();

        assert_eq!(atom!(= (Polynomial::var("a") + Polynomial::from(1)) 0), s("(= a 2)"));
        assert_eq!(s("(= (* 2 a) b)"), s("(= (- (* 5 a) (* 4 b)) 3)"));
        assert_eq!(Formula::TRUE, s("(= 3 0)"));
        assert_eq!(Formula::FALSE, s("(= 4 0)"));
        assert_eq!(Formula::TRUE, s("(distinct 4 0)"));
        assert_eq!(Formula::FALSE, s("(and (= a 0) (distinct a 0))"));

        let err = theory
            .canonicalize_atom(&Atom::with_zero(Relation::Lt, Polynomial::var("a")))
            .unwrap_err();
        assert!(matches!(err, EliminationError::UnsupportedRelation { theory: "zmod", .. }));
        assert!(matches!(
            Modular::new(0),
            Err(EliminationError::InvalidModulus(_))
        ));
    }

    #[test]
    fn test_sum() {
        let f = "(forall ((x Int) (y Int)) (exists ((z Int)) (= (+ x y) z)))";
        assert_eq!(Formula::TRUE, eliminate(2, f));
    }

    #[test]
    fn test_inverse() {
        let theory = Modular::new(6).unwrap();
        let simplifier = Simplifier::new(&theory);
        let got = QuantifierElimination::new(&theory)
            .eliminate(&parse("(exists ((x Int)) (= (* a x) 1))"))
            .unwrap();
        let expected = parse(
            "(or (= (+ a 5) 0) (= (+ (* 2 a) 5) 0) (= (+ (* 3 a) 5) 0)
                (= (+ (* 4 a) 5) 0) (= (+ (* 5 a) 5) 0))",
        );
        assert_eq!(simplifier.simplify(&expected).unwrap(), got);

        let f = "(forall ((a Int)) (=> (distinct a 0) (exists ((x Int)) (= (* a x) 1))))";
        assert_eq!(Formula::TRUE, eliminate(3, f));
        assert_eq!(Formula::FALSE, eliminate(4, f));
    }

    #[test]
    fn test_mod_two() {
        let cases = [
            "(forall ((x Int) (y Int)) (= (= (* x y) 1) (and (= x 1) (= y 1))))",
            "(forall ((x Int) (y Int)) (= (= (+ x y) 1) (not (= (= x 1) (= y 1)))))",
        ];
        for f in cases {
            assert_eq!(Formula::TRUE, eliminate(2, f), "{}", f);
        }
    }

    #[test]
    fn test_ground() {
        let theory = Modular::new(5).unwrap();
        let simplifier = Simplifier::new(&theory);
        let qe = QuantifierElimination::new(&theory);

        // Both results must agree on every assignment of the free variables
        let evaluate = |f: &Formula, a: &BigInt, b: &BigInt| {
            let f = f
                .substitute("a", &Polynomial::from(a.clone()))
                .substitute("b", &Polynomial::from(b.clone()));
            simplifier.simplify(&f).unwrap()
        };
        let cases = [
            "(forall ((x Int)) (exists ((y Int)) (= (* x y) a)))",
            "(exists ((x Int)) (and (= (* x x) a) (distinct x 0)))",
            "(forall ((x Int)) (or (= (* a x) b) (distinct x 1)))",
        ];
        for f in cases {
            let f = parse(f);
            let eliminated = qe.eliminate(&f).unwrap();
            let grounded = theory.ground(&f).unwrap();
            assert!(eliminated.is_quantifier_free() && grounded.is_quantifier_free());
            for a in theory.residues() {
                for b in theory.residues() {
                    let expected = evaluate(&grounded, &a, &b);
                    assert!(expected.as_bool().is_some());
                    assert_eq!(expected, evaluate(&eliminated, &a, &b), "{} at {} {}", f, a, b);
                }
            }
        }
    }

    #[test]
    fn test_residues() {
        let theory = Modular::new(3).unwrap();
        let got: Vec<_> = theory.residues().collect();
        assert_eq!(vec![BigInt::from(0), BigInt::from(1), BigInt::from(2)], got);
        assert_eq!(1, Modular::new(1).unwrap().residues().count());
    }
}
