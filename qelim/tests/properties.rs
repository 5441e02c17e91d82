//! Property-based tests for the simplifier and the elimination driver.

use num_rational::BigRational;
use num_traits::{One, Zero};
use proptest::prelude::*;
use qelim::{
    ast::{Atom, Formula, Polynomial, Quantifier, Relation},
    qe::QuantifierElimination,
    simplify::Simplifier,
    theories::{Equality, LinearArithmetic, Modular, Theory},
};

// ============================================================================
// Strategies
// ============================================================================

/// A polynomial `c + c_1 * t_1 + ... + c_n * t_n` with small integer coefficients.
fn polynomial(terms: Vec<Polynomial>) -> impl Strategy<Value = Polynomial> {
    prop::collection::vec(-3i64..=3, terms.len() + 1).prop_map(move |coefficients| {
        terms
            .iter()
            .zip(&coefficients[1..])
            .fold(Polynomial::from(coefficients[0]), |acc, (t, c)| {
                acc + Polynomial::from(*c) * t.clone()
            })
    })
}

fn linear_atom() -> impl Strategy<Value = Formula> {
    let relations = vec![
        Relation::Eq,
        Relation::Ne,
        Relation::Lt,
        Relation::Le,
        Relation::Gt,
        Relation::Ge,
    ];
    let vars = ["x", "y", "z"].map(Polynomial::var).to_vec();
    (prop::sample::select(relations), polynomial(vars.clone()), polynomial(vars))
        .prop_map(|(r, lhs, rhs)| Formula::atom(r, lhs, rhs))
}

fn equality_atom(vars: &[&'static str]) -> impl Strategy<Value = Formula> {
    let vars = vars.to_vec();
    let var = move || prop::sample::select(vars.clone()).prop_map(Polynomial::var);
    prop_oneof![
        4 => (prop::sample::select(vec![Relation::Eq, Relation::Ne]), var(), var())
            .prop_map(|(r, lhs, rhs)| Formula::atom(r, lhs, rhs)),
        1 => (0u64..5).prop_map(|k| Formula::Atom(Atom::AtLeast(k))),
        1 => (0u64..5).prop_map(|k| Formula::Atom(Atom::FewerThan(k))),
    ]
}

/// An atom of arithmetic modulo `m` over the free variable `a` and the variables `x` and `y`.
fn modular_atom() -> impl Strategy<Value = Formula> {
    let [a, x, y] = ["a", "x", "y"].map(Polynomial::var);
    let terms = vec![a, x.clone(), y.clone(), x * y];
    (prop::sample::select(vec![Relation::Eq, Relation::Ne]), polynomial(terms))
        .prop_map(|(r, p)| Formula::atom(r, p, Polynomial::zero()))
}

/// A quantifier-free formula with at most `depth` levels of connectives and about `size` nodes.
fn formula<S>(atom: S, depth: u32, size: u32) -> impl Strategy<Value = Formula>
where
    S: Strategy<Value = Formula> + 'static,
{
    let leaf = prop_oneof![
        6 => atom,
        1 => any::<bool>().prop_map(Formula::Bool),
    ];
    leaf.prop_recursive(depth, size, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Formula::And),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Formula::Or),
            inner.clone().prop_map(Formula::not),
            (inner.clone(), inner).prop_map(|(a, b)| Formula::implies(a, b)),
        ]
    })
}

/// Wraps `body` in a single block of quantifiers over some of the given variables.
fn quantified<S>(body: S, vars: Vec<&'static str>) -> impl Strategy<Value = Formula>
where
    S: Strategy<Value = Formula>,
{
    let n = vars.len();
    let block = prop::sample::subsequence(vars, 0..=n);
    (any::<bool>(), block, body).prop_map(|(exists, block, body)| {
        block.into_iter().rev().fold(body, |acc, x| {
            if exists {
                Formula::exists(x, acc)
            } else {
                Formula::forall(x, acc)
            }
        })
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn simplify<T: Theory>(theory: &T, f: &Formula) -> Formula {
    Simplifier::new(theory).simplify(f).unwrap()
}

/// Evaluates a quantifier-free formula of modular arithmetic under an assignment.
fn evaluate(theory: &Modular, f: &Formula, assignment: &[(&str, i64)]) -> Option<bool> {
    let ground = assignment
        .iter()
        .fold(f.clone(), |acc, (x, v)| acc.substitute(x, &Polynomial::from(*v)));
    Simplifier::new(theory).simplify(&ground).ok()?.as_bool()
}

/// Replaces each variable of `point` by its value.
fn assign(f: &Formula, point: &[(&str, BigRational)]) -> Formula {
    point
        .iter()
        .fold(f.clone(), |acc, (x, v)| acc.substitute(x, &Polynomial::constant(v.clone())))
}

fn collect_atoms<'a>(f: &'a Formula, acc: &mut Vec<&'a Atom>) {
    match f {
        Formula::Bool(_) => (),
        Formula::Atom(a) => acc.push(a),
        Formula::Not(f) | Formula::Quant(_, _, f) => collect_atoms(f, acc),
        Formula::And(args) | Formula::Or(args) => {
            for a in args {
                collect_atoms(a, acc);
            }
        }
        Formula::Implies(a, b) | Formula::Equivalent(a, b) => {
            collect_atoms(a, acc);
            collect_atoms(b, acc);
        }
    }
}

/// Points that cover every region of the real line in which a quantifier-free formula over `x`
/// alone has constant truth value: the roots of its atoms, the midpoints between consecutive
/// roots, and one point past each root on both sides.
fn sample_points(f: &Formula) -> Vec<BigRational> {
    let mut atoms = Vec::new();
    collect_atoms(f, &mut atoms);
    let mut roots: Vec<BigRational> = atoms
        .into_iter()
        .filter_map(|atom| {
            let Atom::Binary(_, lhs, rhs) = atom else {
                return None;
            };
            let p = lhs.clone() - rhs.clone();
            let a = p.coefficient("x");
            if a.is_zero() {
                return None;
            }
            Some(-p.without("x").constant_value()? / a)
        })
        .collect();
    roots.sort();
    roots.dedup();

    let one = BigRational::one();
    let two = BigRational::from_integer(2.into());
    let mut points = vec![BigRational::zero()];
    for (i, r) in roots.iter().enumerate() {
        points.extend([r - &one, r.clone(), r + &one]);
        if let Some(next) = roots.get(i + 1) {
            points.push((r + next) / &two);
        }
    }
    points
}

/// Evaluates a formula of the equality theory in the domain `{0, ..., size - 1}`. The innermost
/// binding of a variable in `env` gives its value.
fn holds(f: &Formula, size: usize, env: &mut Vec<(String, usize)>) -> bool {
    let value = |env: &[(String, usize)], p: &Polynomial| {
        let x = p.as_var().expect("expected a variable");
        env.iter()
            .rev()
            .find(|(y, _)| y == x)
            .map(|(_, v)| *v)
            .expect("unassigned variable")
    };
    match f {
        Formula::Bool(b) => *b,
        Formula::Atom(Atom::Binary(r, lhs, rhs)) => {
            let (a, b) = (value(env.as_slice(), lhs), value(env.as_slice(), rhs));
            match r {
                Relation::Eq => a == b,
                Relation::Ne => a != b,
                other => panic!("unexpected relation '{}'", other),
            }
        }
        Formula::Atom(Atom::AtLeast(k)) => size as u64 >= *k,
        Formula::Atom(Atom::FewerThan(k)) => (size as u64) < *k,
        Formula::Not(f) => !holds(f, size, env),
        Formula::And(args) => args.iter().all(|a| holds(a, size, env)),
        Formula::Or(args) => args.iter().any(|a| holds(a, size, env)),
        Formula::Implies(a, b) => !holds(a, size, env) || holds(b, size, env),
        Formula::Equivalent(a, b) => holds(a, size, env) == holds(b, size, env),
        Formula::Quant(q, x, body) => {
            let mut results = (0..size).map(|v| {
                env.push((x.clone(), v));
                let result = holds(body, size, env);
                env.pop();
                result
            });
            match q {
                Quantifier::Exists => results.any(|b| b),
                Quantifier::Forall => results.all(|b| b),
            }
        }
    }
}

// ============================================================================
// Simplifier properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_linear_idempotence(f in quantified(formula(linear_atom(), 3, 24), vec!["x", "y"])) {
        let theory = LinearArithmetic::new();
        let once = simplify(&theory, &f);
        prop_assert_eq!(&once, &simplify(&theory, &once));
    }

    #[test]
    fn prop_equality_idempotence(
        f in quantified(formula(equality_atom(&["a", "b", "c"]), 3, 24), vec!["a", "b"]),
    ) {
        let once = simplify(&Equality, &f);
        prop_assert_eq!(&once, &simplify(&Equality, &once));
    }

    #[test]
    fn prop_order_stability(
        (args, shuffled) in prop::collection::vec(formula(linear_atom(), 2, 8), 1..6)
            .prop_flat_map(|args| (Just(args.clone()), Just(args).prop_shuffle())),
        conjunction in any::<bool>(),
    ) {
        let theory = LinearArithmetic::new();
        let build: fn(Vec<Formula>) -> Formula =
            if conjunction { Formula::And } else { Formula::Or };
        let expected = simplify(&theory, &build(args));
        let got = simplify(&theory, &build(shuffled));
        prop_assert_eq!(expected.to_string(), got.to_string());
    }

    #[test]
    fn prop_output_is_nnf(f in formula(linear_atom(), 3, 24)) {
        fn has_no_negations(f: &Formula) -> bool {
            match f {
                Formula::Bool(_) | Formula::Atom(_) => true,
                Formula::And(args) | Formula::Or(args) => args.iter().all(has_no_negations),
                Formula::Quant(_, _, body) => has_no_negations(body),
                Formula::Not(_) | Formula::Implies(..) | Formula::Equivalent(..) => false,
            }
        }
        prop_assert!(has_no_negations(&simplify(&LinearArithmetic::new(), &f)));
    }
}

// ============================================================================
// Elimination properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_modular_soundness(f in quantified(formula(modular_atom(), 2, 10), vec!["x", "y"])) {
        let theory = Modular::new(3).unwrap();
        let eliminated = QuantifierElimination::new(&theory).eliminate(&f).unwrap();
        let grounded = theory.ground(&f).unwrap();
        prop_assert!(eliminated.is_quantifier_free());

        // Variables that are not bound by the prefix stay free in both results
        for a in 0..3 {
            for x in 0..3 {
                for y in 0..3 {
                    let assignment = [("a", a), ("x", x), ("y", y)];
                    let expected = evaluate(&theory, &grounded, &assignment);
                    prop_assert!(expected.is_some());
                    prop_assert_eq!(expected, evaluate(&theory, &eliminated, &assignment));
                }
            }
        }
    }

    #[test]
    fn prop_elimination_is_quantifier_free(
        f in quantified(formula(linear_atom(), 2, 10), vec!["x", "y", "z"]),
    ) {
        let theory = LinearArithmetic::new();
        let eliminated = QuantifierElimination::new(&theory).eliminate(&f).unwrap();
        prop_assert!(eliminated.is_quantifier_free());
        prop_assert_eq!(&eliminated, &simplify(&theory, &eliminated));
    }
    #[test]
    fn prop_linear_soundness(body in formula(linear_atom(), 2, 8), exists in any::<bool>()) {
        let theory = LinearArithmetic::new();
        let f = if exists {
            Formula::exists("x", body.clone())
        } else {
            Formula::forall("x", body.clone())
        };
        let eliminated = QuantifierElimination::new(&theory).eliminate(&f).unwrap();
        prop_assert!(!eliminated.free_vars().contains("x"));

        let int = |n: i64| BigRational::from_integer(n.into());
        for y in -2..=2 {
            for z in -2..=2 {
                let point = [("y", int(y)), ("z", int(z))];
                let instance = assign(&body, &point);
                let values = sample_points(&instance)
                    .into_iter()
                    .map(|c| simplify(&theory, &assign(&instance, &[("x", c)])).as_bool())
                    .collect::<Option<Vec<bool>>>();
                prop_assert!(values.is_some());
                let values = values.unwrap();
                let expected = if exists {
                    values.iter().any(|b| *b)
                } else {
                    values.iter().all(|b| *b)
                };

                let got = simplify(&theory, &assign(&eliminated, &point)).as_bool();
                prop_assert_eq!(Some(expected), got, "y = {}, z = {}", y, z);
            }
        }
    }

    #[test]
    fn prop_equality_soundness(
        f in quantified(
            quantified(formula(equality_atom(&["a", "x", "y"]), 2, 8), vec!["y"]),
            vec!["x"],
        ),
    ) {
        let eliminated = QuantifierElimination::new(&Equality).eliminate(&f).unwrap();
        prop_assert!(eliminated.is_quantifier_free());

        // Variables that are not bound by a quantifier are assigned as well
        for size in 1..=5 {
            for a in 0..size {
                for x in 0..size {
                    for y in 0..size {
                        let env = [("a", a), ("x", x), ("y", y)].map(|(v, n)| (v.to_owned(), n));
                        prop_assert_eq!(
                            holds(&f, size, &mut env.to_vec()),
                            holds(&eliminated, size, &mut env.to_vec()),
                            "domain size {}",
                            size
                        );
                    }
                }
            }
        }
    }
}
