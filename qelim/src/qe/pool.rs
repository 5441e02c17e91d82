use super::EliminationError;
use crate::{
    ast::{Formula, Var},
    simplify::Simplifier,
    theories::Theory,
};
use std::fmt;

/// Whether the elimination of a quantifier block should go on, or has found that the block is
/// equivalent to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    FoundTrue,
}

/// A pending unit of work: a simplified conjunction of atoms, and the variables that still have
/// to be eliminated from it. The variables are never empty, and all occur in the formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub vars: Vec<Var>,
    pub formula: Formula,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "([{}], {})", self.vars.join(" "), self.formula)
    }
}

/// The jobs of the quantifier block being eliminated, together with the results of the jobs
/// that are done.
///
/// The only way to add a job is through `JobPool::push`, which splits formulas into their
/// disjuncts and filters them, so every job in the pool is a conjunction of atoms that is neither
/// `true` nor `false`.
#[derive(Debug, Default)]
pub struct JobPool {
    jobs: Vec<Job>,
    finished: Vec<Formula>,
}

impl JobPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one job for each disjunct of the DNF of `formula`, to eliminate `vars` from it.
    ///
    /// Disjuncts that simplify to `false` are dropped, and variables that don't occur in a
    /// disjunct are not eliminated from it. Disjuncts with no variables left go straight to the
    /// finished list. If any disjunct simplifies to `true`, the whole block is `true`, and
    /// `Progress::FoundTrue` is returned.
    pub fn push<T: Theory + ?Sized>(
        &mut self,
        simplifier: &Simplifier<T>,
        vars: &[Var],
        formula: &Formula,
    ) -> Result<Progress, EliminationError> {
        for clause in formula.dnf_clauses() {
            let conjunction = simplifier.simplify(&Formula::conjunction(clause))?;
            match conjunction {
                Formula::Bool(true) => return Ok(Progress::FoundTrue),
                Formula::Bool(false) => continue,
                formula => {
                    let free = formula.free_vars();
                    let vars: Vec<Var> =
                        vars.iter().filter(|x| free.contains(*x)).cloned().collect();
                    if vars.is_empty() {
                        self.finished.push(formula);
                    } else {
                        self.jobs.push(Job { vars, formula });
                    }
                }
            }
        }
        Ok(Progress::Continue)
    }

    /// Takes the most recently pushed job.
    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn finished(&self) -> &[Formula] {
        &self.finished
    }

    /// Empties the pool, returning the finished formulas.
    pub fn drain(&mut self) -> Vec<Formula> {
        self.jobs.clear();
        std::mem::take(&mut self.finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::tests::parse_formula, theories::LinearArithmetic};

    const DEFINITIONS: &str = "
        (set-logic LRA)
        (declare-fun x () Real)
        (declare-fun y () Real)
        (declare-fun z () Real)
    ";

    fn vars(names: &[&str]) -> Vec<Var> {
        names.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_push() {
        let theory = LinearArithmetic::new();
        let simplifier = Simplifier::new(&theory);
        let mut pool = JobPool::new();

        let f = parse_formula(
            DEFINITIONS,
            "(and (< x y) (or (< y 0) (< z 0) (and (< x 0) (> x 0))))",
        );
        let progress = pool.push(&simplifier, &vars(&["x", "y"]), &f).unwrap();
        assert_eq!(Progress::Continue, progress);

        // The contradictory disjunct is dropped, and `y` is not eliminated from the second one
        assert_eq!(2, pool.jobs().len());
        assert_eq!(vars(&["x", "y"]), pool.jobs()[0].vars);
        assert_eq!(vars(&["x", "y"]), pool.jobs()[1].vars);
        assert!(pool.finished().is_empty());

        let job = pool.pop().unwrap();
        assert_eq!(
            simplifier
                .simplify(&parse_formula(DEFINITIONS, "(and (< x y) (< z 0))"))
                .unwrap(),
            job.formula
        );

        let f = parse_formula(DEFINITIONS, "(or (< z 0) false)");
        let progress = pool.push(&simplifier, &vars(&["x"]), &f).unwrap();
        assert_eq!(Progress::Continue, progress);
        assert_eq!(1, pool.finished().len());

        let f = parse_formula(DEFINITIONS, "(or (< x 0) (>= 1 0))");
        let progress = pool.push(&simplifier, &vars(&["x"]), &f).unwrap();
        assert_eq!(Progress::FoundTrue, progress);

        assert_eq!(1, pool.drain().len());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_display() {
        let job = Job {
            vars: vars(&["x", "y"]),
            formula: parse_formula(DEFINITIONS, "(< x y)"),
        };
        assert_eq!("([x y], (< x y))", job.to_string());
    }
}
