//! The block-wise quantifier elimination driver.
//!
//! The input is simplified and put in prenex normal form. Quantifier blocks are then eliminated
//! from the innermost to the outermost. For an existential block, the matrix is split into its
//! disjuncts, and each disjunct becomes a job in a `JobPool`. A job is worked on by picking one of
//! its variables, handing the conjuncts that mention it to the theory's `qe1p`, and pushing the
//! simplified result back into the pool. A universal block `∀X. φ` is handled as `¬∃X. ¬φ`.

mod error;
mod pool;

pub use error::EliminationError;
pub use pool::{Job, JobPool, Progress};

use crate::{
    ast::{Atom, Block, Formula, Prenex, Quantifier, Var},
    simplify::Simplifier,
    theories::Theory,
};
use std::fmt;

pub struct QuantifierElimination<'t, T: Theory + ?Sized> {
    theory: &'t T,
    simplifier: Simplifier<'t, T>,
}

/// The state of an elimination run: the blocks still to be eliminated, the current matrix, and
/// the job pool of the block being eliminated.
struct State {
    blocks: Vec<Block>,
    matrix: Formula,
    negated: bool,
    pool: JobPool,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let blocks: Vec<String> = self.blocks.iter().map(Block::to_string).collect();
        writeln!(f, "blocks:   [{}]", blocks.join(", "))?;
        writeln!(f, "matrix:   {}", self.matrix)?;
        writeln!(f, "negated:  {}", self.negated)?;
        writeln!(f, "jobs:")?;
        for job in self.pool.jobs() {
            writeln!(f, "    {}", job)?;
        }
        write!(f, "finished:")?;
        for formula in self.pool.finished() {
            write!(f, "\n    {}", formula)?;
        }
        Ok(())
    }
}

impl<'t, T: Theory + ?Sized> QuantifierElimination<'t, T> {
    pub fn new(theory: &'t T) -> Self {
        Self { theory, simplifier: Simplifier::new(theory) }
    }

    /// Returns a quantifier-free formula equivalent to `formula`, in disjunctive normal form.
    pub fn eliminate(&self, formula: &Formula) -> Result<Formula, EliminationError> {
        let Prenex { blocks, matrix } = self.simplifier.simplify(formula)?.to_pnf();
        log::info!(
            "eliminating {} quantifier block(s) in theory '{}'",
            blocks.len(),
            self.theory.name()
        );
        let mut state = State {
            blocks,
            matrix,
            negated: false,
            pool: JobPool::new(),
        };

        while let Some(block) = state.blocks.pop() {
            log::debug!("eliminating block '{}'", block);
            state.negated = block.quantifier == Quantifier::Forall;
            let matrix = if state.negated {
                state.matrix.negated_nnf()
            } else {
                state.matrix.clone()
            };
            let matrix = self.simplifier.simplify(&matrix)?;

            let mut progress = state.pool.push(&self.simplifier, &block.vars, &matrix)?;
            if progress == Progress::Continue {
                progress = self.run_jobs(&mut state)?;
            }
            let finished = state.pool.drain();
            let result = match progress {
                Progress::FoundTrue => Formula::TRUE,
                Progress::Continue => Formula::disjunction(finished),
            };

            let result = if state.negated {
                result.negated_nnf()
            } else {
                result
            };
            state.matrix = self.simplifier.simplify(&result)?;
            state.negated = false;
            log::trace!("after block '{}':\n{}", block, state);
        }

        let result = self.simplifier.simplify(&state.matrix)?.to_dnf();
        self.simplifier.simplify(&result)
    }

    /// Works on the jobs in the pool until it is empty, or until some job is found to be `true`.
    fn run_jobs(&self, state: &mut State) -> Result<Progress, EliminationError> {
        while let Some(Job { mut vars, formula }) = state.pool.pop() {
            let x = vars.remove(choose_var(&vars, &formula));

            let mut relevant: Vec<Atom> = Vec::new();
            let mut rest: Vec<Formula> = Vec::new();
            for conjunct in formula.conjuncts() {
                match conjunct {
                    Formula::Atom(a) if a.contains_var(&x) => relevant.push(a.clone()),
                    Formula::Atom(_) => rest.push(conjunct.clone()),
                    _ => return Err(EliminationError::NotConjunctive(formula.clone())),
                }
            }
            log::debug!("eliminating '{}' from {} atom(s)", x, relevant.len());

            rest.push(self.theory.qe1p(&x, &relevant)?);
            let result = self.simplifier.simplify(&Formula::And(rest))?;
            if state.pool.push(&self.simplifier, &vars, &result)? == Progress::FoundTrue {
                return Ok(Progress::FoundTrue);
            }
            log::trace!("after eliminating '{}':\n{}", x, state);
        }
        Ok(Progress::Continue)
    }
}

/// Picks the variable with the most occurrences in `formula`. Ties are broken by taking the
/// earliest variable in `vars`.
fn choose_var(vars: &[Var], formula: &Formula) -> usize {
    let (index, _) = vars
        .iter()
        .enumerate()
        .fold((0, 0), |(best, most), (i, x)| {
            let count = formula.occurrences(x);
            if count > most {
                (i, count)
            } else {
                (best, most)
            }
        });
    index
}
