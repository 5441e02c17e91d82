use crate::{ast::*, parser::tests::parse_formula};
use std::collections::BTreeSet;

const DEFINITIONS: &str = "
    (set-logic LRA)
    (declare-fun a () Real)
    (declare-fun b () Real)
    (declare-fun c () Real)
";

fn vars(names: &[&str]) -> BTreeSet<Var> {
    names.iter().map(|&s| s.to_owned()).collect()
}

#[test]
fn test_free_vars() {
    let cases: &[(&str, &[&str])] = &[
        ("(and (< a 0) (< b c))", &["a", "b", "c"]),
        ("(= b b)", &["b"]),
        ("(forall ((a Real) (b Real)) (= a b))", &[]),
        ("(forall ((a Real)) (= a b))", &["b"]),
        ("(and (forall ((a Real)) (= a 0)) (= a 0))", &["a"]),
        ("(card>= 2)", &[]),
    ];
    for &(input, expected) in cases {
        let f = parse_formula(DEFINITIONS, input);
        assert_eq!(vars(expected), f.free_vars(), "{}", input);
    }
}

#[test]
fn test_occurrences() {
    let f = parse_formula(
        DEFINITIONS,
        "(and (< a b) (or (= a 0) (< b 0)) (exists ((a Real)) (< a 0)))",
    );
    assert_eq!(2, f.occurrences("a"));
    assert_eq!(2, f.occurrences("b"));
    assert_eq!(0, f.occurrences("c"));
}

#[test]
fn test_substitute() {
    let f = parse_formula(DEFINITIONS, "(exists ((b Real)) (< a b))");

    // `b` is not free, so nothing changes
    assert_eq!(f, f.substitute("b", &Polynomial::from(1)));

    // Substituting `a` by `b` must not capture the new `b`
    let got = f.substitute("a", &Polynomial::var("b"));
    let expected = Formula::exists("b'", atom!(< b (Polynomial::var("b'"))));
    assert_eq!(expected, got);
}

#[test]
fn test_nnf() {
    let cases = [
        ("(not (and (< a 0) (= b 0)))", "(or (>= a 0) (distinct b 0))"),
        ("(=> (< a 0) (< b 0))", "(or (>= a 0) (< b 0))"),
        ("(not (forall ((c Real)) (< a c)))", "(exists ((c Real)) (>= a c))"),
        ("(not (not (card>= 2)))", "(card>= 2)"),
        ("(not (card>= 2))", "(card< 2)"),
    ];
    for (input, expected) in cases {
        let f = parse_formula(DEFINITIONS, input);
        assert_eq!(parse_formula(DEFINITIONS, expected), f.to_nnf(), "{}", input);
    }

    let f = parse_formula(DEFINITIONS, "(= (< a 0) (< b 0))");
    let nnf = f.to_nnf();
    let expected = parse_formula(
        DEFINITIONS,
        "(and (or (>= a 0) (< b 0)) (or (>= b 0) (< a 0)))",
    );
    assert_eq!(expected, nnf);
}

#[test]
fn test_pnf() {
    let f = parse_formula(
        DEFINITIONS,
        "(forall ((x Real)) (and (exists ((y Real)) (< x y)) (exists ((y Real)) (< y a))))",
    );
    let pnf = f.to_pnf();
    let expected_blocks = vec![
        Block {
            quantifier: Quantifier::Forall,
            vars: vec!["x".to_owned()],
        },
        Block {
            quantifier: Quantifier::Exists,
            vars: vec!["y".to_owned(), "y'".to_owned()],
        },
    ];
    assert_eq!(expected_blocks, pnf.blocks);
    assert!(pnf.matrix.is_quantifier_free());
    assert_eq!(vars(&["a", "x", "y", "y'"]), pnf.matrix.free_vars());
    assert_eq!(f.free_vars(), pnf.to_formula().free_vars());
    assert_eq!("forall x", pnf.blocks[0].to_string());

    // Bound variables that clash with free variables are renamed
    let f = parse_formula(DEFINITIONS, "(and (< a 0) (exists ((a Real)) (< a b)))");
    let pnf = f.to_pnf();
    assert_eq!(vec!["a'".to_owned()], pnf.blocks[0].vars);
    assert_eq!(parse_formula(DEFINITIONS, "(< a 0)"), pnf.matrix.conjuncts()[0]);
}

#[test]
fn test_dnf() {
    let f = parse_formula(
        DEFINITIONS,
        "(and (or (< a 0) (< b 0)) (or (< c 0) false) true)",
    );
    let clauses = f.dnf_clauses();
    assert_eq!(2, clauses.len());
    assert_eq!(
        parse_formula(DEFINITIONS, "(or (and (< a 0) (< c 0)) (and (< b 0) (< c 0)))"),
        f.to_dnf()
    );

    assert_eq!(Formula::FALSE, Formula::Or(Vec::new()).to_dnf());
    assert_eq!(Formula::TRUE, Formula::And(Vec::new()).to_dnf());
}

#[test]
fn test_closure_and_prefix() {
    let f = parse_formula(DEFINITIONS, "(< (+ a b) c)");
    let closed = f.closure(Quantifier::Exists);
    assert!(closed.free_vars().is_empty());
    assert_eq!(
        Some(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]),
        closed.prefix_vars(Quantifier::Exists)
    );
    assert_eq!(None, closed.prefix_vars(Quantifier::Forall));
    assert_eq!(&f, closed.matrix());
}

#[test]
fn test_evaluate() {
    let f = parse_formula(DEFINITIONS, "(=> (< a 0) (or (< b 0) (= c 0)))");
    let eval = |assignment: [bool; 3]| {
        f.evaluate(&|atom: &Atom| {
            let vars = atom.vars();
            let index = ["a", "b", "c"].iter().position(|x| vars.contains(*x))?;
            Some(assignment[index])
        })
    };
    assert_eq!(Some(true), eval([false, false, false]));
    assert_eq!(Some(false), eval([true, false, false]));
    assert_eq!(Some(true), eval([true, false, true]));
    assert_eq!(None, Formula::exists("a", Formula::TRUE).evaluate(&|_: &Atom| Some(true)));
}
