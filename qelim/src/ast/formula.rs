use super::{Polynomial, Relation, Var};
use std::collections::BTreeSet;

/// A quantifier, either `forall` or `exists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantifier {
    Forall,
    Exists,
}

impl_str_conversion_traits!(Quantifier { Forall: "forall", Exists: "exists" });

impl std::ops::Not for Quantifier {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Quantifier::Forall => Quantifier::Exists,
            Quantifier::Exists => Quantifier::Forall,
        }
    }
}

/// An atomic formula.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    /// A relation between two terms. For the arithmetic theories, canonical atoms always have
    /// `0` as their right-hand side; in the equality theory, both sides are variables.
    Binary(Relation, Polynomial, Polynomial),

    /// The universe has at least `k` elements.
    AtLeast(u64),

    /// The universe has fewer than `k` elements.
    FewerThan(u64),
}

impl Atom {
    pub fn new(relation: Relation, lhs: Polynomial, rhs: Polynomial) -> Self {
        Self::Binary(relation, lhs, rhs)
    }

    /// Constructs the atom `lhs REL 0`.
    pub fn with_zero(relation: Relation, lhs: Polynomial) -> Self {
        Self::Binary(relation, lhs, Polynomial::zero())
    }

    /// The atom that holds exactly when `self` doesn't.
    pub fn complement(&self) -> Self {
        match self {
            Atom::Binary(r, lhs, rhs) => Atom::Binary(r.complement(), lhs.clone(), rhs.clone()),
            Atom::AtLeast(k) => Atom::FewerThan(*k),
            Atom::FewerThan(k) => Atom::AtLeast(*k),
        }
    }

    /// The same atom with its sides swapped.
    pub fn converse(&self) -> Self {
        match self {
            Atom::Binary(r, lhs, rhs) => Atom::Binary(r.converse(), rhs.clone(), lhs.clone()),
            other => other.clone(),
        }
    }

    pub fn vars(&self) -> BTreeSet<Var> {
        match self {
            Atom::Binary(_, lhs, rhs) => {
                let mut vars = lhs.vars();
                vars.extend(rhs.vars());
                vars
            }
            Atom::AtLeast(_) | Atom::FewerThan(_) => BTreeSet::new(),
        }
    }

    pub fn contains_var(&self, x: &str) -> bool {
        match self {
            Atom::Binary(_, lhs, rhs) => lhs.contains_var(x) || rhs.contains_var(x),
            Atom::AtLeast(_) | Atom::FewerThan(_) => false,
        }
    }

    pub fn substitute(&self, x: &str, value: &Polynomial) -> Self {
        match self {
            Atom::Binary(r, lhs, rhs) => {
                Atom::Binary(*r, lhs.substitute(x, value), rhs.substitute(x, value))
            }
            other => other.clone(),
        }
    }
}

/// A first-order formula.
///
/// The derived order is structural, and places truth constants first, then atoms, then every
/// other kind of formula.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Formula {
    Bool(bool),
    Atom(Atom),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Equivalent(Box<Formula>, Box<Formula>),
    Quant(Quantifier, Var, Box<Formula>),
}

impl From<Atom> for Formula {
    fn from(atom: Atom) -> Self {
        Formula::Atom(atom)
    }
}

impl From<bool> for Formula {
    fn from(value: bool) -> Self {
        Formula::Bool(value)
    }
}

impl Formula {
    pub const TRUE: Formula = Formula::Bool(true);
    pub const FALSE: Formula = Formula::Bool(false);

    pub fn atom(relation: Relation, lhs: Polynomial, rhs: Polynomial) -> Self {
        Formula::Atom(Atom::Binary(relation, lhs, rhs))
    }

    // This is not `std::ops::Not` because it builds the syntactic negation, instead of computing
    // a negated formula
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Formula) -> Self {
        Formula::Not(Box::new(inner))
    }

    pub fn implies(lhs: Formula, rhs: Formula) -> Self {
        Formula::Implies(Box::new(lhs), Box::new(rhs))
    }

    pub fn equivalent(lhs: Formula, rhs: Formula) -> Self {
        Formula::Equivalent(Box::new(lhs), Box::new(rhs))
    }

    pub fn quant(quantifier: Quantifier, var: impl Into<Var>, body: Formula) -> Self {
        Formula::Quant(quantifier, var.into(), Box::new(body))
    }

    pub fn exists(var: impl Into<Var>, body: Formula) -> Self {
        Self::quant(Quantifier::Exists, var, body)
    }

    pub fn forall(var: impl Into<Var>, body: Formula) -> Self {
        Self::quant(Quantifier::Forall, var, body)
    }

    /// Builds the conjunction of `args`, without wrapping empty or single argument lists.
    pub fn conjunction(mut args: Vec<Formula>) -> Self {
        match args.len() {
            0 => Formula::TRUE,
            1 => args.pop().unwrap_or(Formula::TRUE),
            _ => Formula::And(args),
        }
    }

    /// Builds the disjunction of `args`, without wrapping empty or single argument lists.
    pub fn disjunction(mut args: Vec<Formula>) -> Self {
        match args.len() {
            0 => Formula::FALSE,
            1 => args.pop().unwrap_or(Formula::FALSE),
            _ => Formula::Or(args),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Formula::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_bool_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    pub fn is_bool_false(&self) -> bool {
        self.as_bool() == Some(false)
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Formula::Atom(_))
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Formula::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_quantifier_free(&self) -> bool {
        match self {
            Formula::Bool(_) | Formula::Atom(_) => true,
            Formula::Not(f) => f.is_quantifier_free(),
            Formula::And(args) | Formula::Or(args) => args.iter().all(Formula::is_quantifier_free),
            Formula::Implies(a, b) | Formula::Equivalent(a, b) => {
                a.is_quantifier_free() && b.is_quantifier_free()
            }
            Formula::Quant(..) => false,
        }
    }

    /// If this is a conjunction, returns its arguments. Otherwise, returns the formula itself as
    /// the only conjunct.
    pub fn conjuncts(&self) -> &[Formula] {
        match self {
            Formula::And(args) => args,
            other => std::slice::from_ref(other),
        }
    }

    pub fn free_vars(&self) -> BTreeSet<Var> {
        let mut acc = BTreeSet::new();
        self.collect_free_vars(&mut acc);
        acc
    }

    fn collect_free_vars(&self, acc: &mut BTreeSet<Var>) {
        match self {
            Formula::Bool(_) => (),
            Formula::Atom(a) => acc.extend(a.vars()),
            Formula::Not(f) => f.collect_free_vars(acc),
            Formula::And(args) | Formula::Or(args) => {
                for a in args {
                    a.collect_free_vars(acc);
                }
            }
            Formula::Implies(a, b) | Formula::Equivalent(a, b) => {
                a.collect_free_vars(acc);
                b.collect_free_vars(acc);
            }
            Formula::Quant(_, x, body) => {
                let mut inner = body.free_vars();
                inner.remove(x);
                acc.extend(inner);
            }
        }
    }

    /// Every variable that occurs in the formula, free or bound, including binder names.
    pub fn all_vars(&self) -> BTreeSet<Var> {
        match self {
            Formula::Bool(_) => BTreeSet::new(),
            Formula::Atom(a) => a.vars(),
            Formula::Not(f) => f.all_vars(),
            Formula::And(args) | Formula::Or(args) => {
                args.iter().flat_map(Formula::all_vars).collect()
            }
            Formula::Implies(a, b) | Formula::Equivalent(a, b) => {
                let mut vars = a.all_vars();
                vars.extend(b.all_vars());
                vars
            }
            Formula::Quant(_, x, body) => {
                let mut vars = body.all_vars();
                vars.insert(x.clone());
                vars
            }
        }
    }

    /// Counts the atoms in which `x` occurs free.
    pub fn occurrences(&self, x: &str) -> usize {
        match self {
            Formula::Bool(_) => 0,
            Formula::Atom(a) => usize::from(a.contains_var(x)),
            Formula::Not(f) => f.occurrences(x),
            Formula::And(args) | Formula::Or(args) => args.iter().map(|a| a.occurrences(x)).sum(),
            Formula::Implies(a, b) | Formula::Equivalent(a, b) => {
                a.occurrences(x) + b.occurrences(x)
            }
            Formula::Quant(_, y, _) if y == x => 0,
            Formula::Quant(_, _, body) => body.occurrences(x),
        }
    }

    /// Replaces the free occurrences of `x` by `value`. Bound variables that would capture a
    /// variable of `value` are renamed.
    pub fn substitute(&self, x: &str, value: &Polynomial) -> Formula {
        let map_box = |f: &Formula| Box::new(f.substitute(x, value));
        match self {
            Formula::Bool(_) => self.clone(),
            Formula::Atom(a) => Formula::Atom(a.substitute(x, value)),
            Formula::Not(f) => Formula::Not(map_box(f)),
            Formula::And(args) => {
                Formula::And(args.iter().map(|a| a.substitute(x, value)).collect())
            }
            Formula::Or(args) => Formula::Or(args.iter().map(|a| a.substitute(x, value)).collect()),
            Formula::Implies(a, b) => Formula::Implies(map_box(a), map_box(b)),
            Formula::Equivalent(a, b) => Formula::Equivalent(map_box(a), map_box(b)),
            Formula::Quant(_, y, _) if y == x => self.clone(),
            Formula::Quant(q, y, body) => {
                if !body.free_vars().contains(x) {
                    return self.clone();
                }
                if value.contains_var(y) {
                    let mut used = body.all_vars();
                    used.extend(value.vars());
                    used.insert(x.to_owned());
                    let fresh = fresh_name(y, &used);
                    let renamed = body.substitute(y, &Polynomial::var(&fresh));
                    Formula::Quant(*q, fresh, Box::new(renamed.substitute(x, value)))
                } else {
                    Formula::Quant(*q, y.clone(), map_box(body))
                }
            }
        }
    }

    /// Evaluates a quantifier-free formula, deciding each atom with `eval_atom`. Returns `None` if
    /// the formula has a quantifier, or if `eval_atom` returns `None` for some atom.
    pub fn evaluate<F>(&self, eval_atom: &F) -> Option<bool>
    where
        F: Fn(&Atom) -> Option<bool>,
    {
        match self {
            Formula::Bool(b) => Some(*b),
            Formula::Atom(a) => eval_atom(a),
            Formula::Not(f) => f.evaluate(eval_atom).map(|b| !b),
            Formula::And(args) => {
                let values: Option<Vec<bool>> =
                    args.iter().map(|a| a.evaluate(eval_atom)).collect();
                values.map(|v| v.into_iter().all(|b| b))
            }
            Formula::Or(args) => {
                let values: Option<Vec<bool>> =
                    args.iter().map(|a| a.evaluate(eval_atom)).collect();
                values.map(|v| v.into_iter().any(|b| b))
            }
            Formula::Implies(a, b) => Some(!a.evaluate(eval_atom)? || b.evaluate(eval_atom)?),
            Formula::Equivalent(a, b) => Some(a.evaluate(eval_atom)? == b.evaluate(eval_atom)?),
            Formula::Quant(..) => None,
        }
    }
}

/// Finds a variant of `name` that is not in `used`, by appending `'` characters to it.
pub fn fresh_name(name: &str, used: &BTreeSet<Var>) -> Var {
    let mut candidate = format!("{}'", name);
    while used.contains(&candidate) {
        candidate.push('\'');
    }
    candidate
}
