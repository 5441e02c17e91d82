//! Negation, prenex and disjunctive normal forms.

use super::{fresh_name, Formula, Polynomial, Quantifier, Var};
use std::{collections::BTreeSet, fmt};

/// A maximal run of quantifiers of the same kind in a prenex prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub quantifier: Quantifier,
    pub vars: Vec<Var>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.quantifier, self.vars.join(" "))
    }
}

/// A formula in prenex normal form, split into its quantifier blocks and its quantifier-free
/// matrix. The blocks are ordered from the outermost to the innermost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prenex {
    pub blocks: Vec<Block>,
    pub matrix: Formula,
}

impl Prenex {
    fn new(prefix: Vec<(Quantifier, Var)>, matrix: Formula) -> Self {
        let mut blocks: Vec<Block> = Vec::new();
        for (quantifier, var) in prefix {
            match blocks.last_mut() {
                Some(last) if last.quantifier == quantifier => last.vars.push(var),
                _ => blocks.push(Block { quantifier, vars: vec![var] }),
            }
        }
        Self { blocks, matrix }
    }

    /// Rebuilds the prenex formula from the blocks and the matrix.
    pub fn to_formula(&self) -> Formula {
        self.blocks.iter().rev().fold(self.matrix.clone(), |acc, block| {
            block
                .vars
                .iter()
                .rev()
                .fold(acc, |acc, x| Formula::quant(block.quantifier, x.clone(), acc))
        })
    }
}

impl Formula {
    /// Converts the formula to negation normal form. Implications and equivalences are expanded,
    /// and negations are pushed down to the atoms, where they are replaced by the complement
    /// atom. The result has no `Not` nodes.
    pub fn to_nnf(&self) -> Formula {
        self.nnf(false)
    }

    /// The negation normal form of the negation of `self`.
    pub fn negated_nnf(&self) -> Formula {
        self.nnf(true)
    }

    fn nnf(&self, negated: bool) -> Formula {
        match self {
            Formula::Bool(b) => Formula::Bool(*b != negated),
            Formula::Atom(a) if negated => Formula::Atom(a.complement()),
            Formula::Atom(_) => self.clone(),
            Formula::Not(f) => f.nnf(!negated),
            Formula::And(args) | Formula::Or(args) => {
                let args = args.iter().map(|a| a.nnf(negated)).collect();
                if matches!(self, Formula::And(_)) != negated {
                    Formula::And(args)
                } else {
                    Formula::Or(args)
                }
            }
            Formula::Implies(a, b) => {
                Formula::Or(vec![Formula::Not(a.clone()), (**b).clone()]).nnf(negated)
            }
            Formula::Equivalent(a, b) => Formula::And(vec![
                Formula::Implies(a.clone(), b.clone()),
                Formula::Implies(b.clone(), a.clone()),
            ])
            .nnf(negated),
            Formula::Quant(q, x, body) => {
                let q = if negated { !*q } else { *q };
                Formula::quant(q, x.clone(), body.nnf(negated))
            }
        }
    }

    /// Converts the formula to prenex normal form.
    ///
    /// Bound variables are first renamed apart, so that every binder has a distinct name that
    /// doesn't occur free anywhere in the formula. After that, quantifiers can be hoisted out of
    /// conjunctions and disjunctions in order.
    pub fn to_pnf(&self) -> Prenex {
        let mut used = self.free_vars();
        let renamed = self.to_nnf().rename_apart(&mut used);
        let mut prefix = Vec::new();
        let matrix = renamed.hoist(&mut prefix);
        Prenex::new(prefix, matrix)
    }

    fn rename_apart(&self, used: &mut BTreeSet<Var>) -> Formula {
        match self {
            Formula::And(args) => Formula::And(args.iter().map(|a| a.rename_apart(used)).collect()),
            Formula::Or(args) => Formula::Or(args.iter().map(|a| a.rename_apart(used)).collect()),
            Formula::Not(f) => Formula::not(f.rename_apart(used)),
            Formula::Quant(q, x, body) => {
                let (name, body) = if used.contains(x) {
                    let mut taken = used.clone();
                    taken.extend(body.all_vars());
                    let fresh = fresh_name(x, &taken);
                    let body = body.substitute(x, &Polynomial::var(&fresh));
                    (fresh, body)
                } else {
                    (x.clone(), (**body).clone())
                };
                used.insert(name.clone());
                Formula::quant(*q, name, body.rename_apart(used))
            }
            other => other.clone(),
        }
    }

    fn hoist(self, prefix: &mut Vec<(Quantifier, Var)>) -> Formula {
        match self {
            Formula::Quant(q, x, body) => {
                prefix.push((q, x));
                body.hoist(prefix)
            }
            Formula::And(args) => {
                Formula::And(args.into_iter().map(|a| a.hoist(prefix)).collect())
            }
            Formula::Or(args) => Formula::Or(args.into_iter().map(|a| a.hoist(prefix)).collect()),
            other => other,
        }
    }

    /// Returns the clauses of the disjunctive normal form of a quantifier-free formula. Each
    /// clause is a list of literals, and the empty clause stands for `true`. An empty list of
    /// clauses means `false`.
    pub fn dnf_clauses(&self) -> Vec<Vec<Formula>> {
        match self {
            Formula::Bool(true) => vec![Vec::new()],
            Formula::Bool(false) => Vec::new(),
            Formula::Or(args) => args.iter().flat_map(Formula::dnf_clauses).collect(),
            Formula::And(args) => args.iter().fold(vec![Vec::new()], |acc, arg| {
                let clauses = arg.dnf_clauses();
                let mut product = Vec::with_capacity(acc.len() * clauses.len());
                for left in &acc {
                    for right in &clauses {
                        let mut clause = left.clone();
                        clause.extend(right.iter().cloned());
                        product.push(clause);
                    }
                }
                product
            }),
            Formula::Not(_) | Formula::Implies(..) | Formula::Equivalent(..) => {
                self.to_nnf().dnf_clauses()
            }
            Formula::Atom(_) | Formula::Quant(..) => vec![vec![self.clone()]],
        }
    }

    pub fn to_dnf(&self) -> Formula {
        let clauses = self
            .dnf_clauses()
            .into_iter()
            .map(Formula::conjunction)
            .collect();
        Formula::disjunction(clauses)
    }

    /// Quantifies every free variable of the formula with `quantifier`. The free variables are
    /// bound in alphabetical order, the first one being the outermost.
    pub fn closure(&self, quantifier: Quantifier) -> Formula {
        self.free_vars()
            .into_iter()
            .rev()
            .fold(self.clone(), |acc, x| Formula::quant(quantifier, x, acc))
    }

    /// Strips the leading quantifiers of a prenex formula.
    pub fn matrix(&self) -> &Formula {
        match self {
            Formula::Quant(_, _, body) => body.matrix(),
            other => other,
        }
    }

    /// Returns the variables bound in the quantifier prefix, from the outermost to the
    /// innermost, if they are all bound by `quantifier`. Returns `None` if the prefix has an
    /// alternation.
    pub fn prefix_vars(&self, quantifier: Quantifier) -> Option<Vec<Var>> {
        let mut current = self;
        let mut vars = Vec::new();
        while let Formula::Quant(q, x, body) = current {
            if *q != quantifier {
                return None;
            }
            vars.push(x.clone());
            current = body;
        }
        Some(vars)
    }
}
