#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A small boolean modelling layer on top of the `varisat` SAT solver.
//!
//! Puzzles describe their rules as clauses, cardinality constraints and bounded
//! linear sums over boolean indicators. The [`Model`] records every clause (so it
//! can be exported as DIMACS) and hands it to the solver lazily before each solve.
//!
//! Solving follows the usual enumerate-and-block loop: every accepted assignment
//! is reported to a [`SolutionCallback`] and then excluded with a blocking clause
//! over a projection of the decision variables. A callback may also reject an
//! assignment by returning a cut clause, which is how rules that are cheaper to
//! check than to encode (connectivity) are enforced.

mod cardinality;
mod dimacs;
mod sum;

pub use sum::{SumOutputs, Term};

use anyhow::{anyhow, Result};
use log::{debug, trace};
use std::time::{Duration, Instant};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver};

/// How many solutions [`Model::collect`] should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchLimit {
    /// Stop after the first accepted solution.
    #[default]
    First,
    /// Enumerate every solution.
    All,
    /// Stop after this many accepted solutions.
    AtMost(usize),
}

impl SearchLimit {
    /// Returns `First` or `All` depending on the flag.
    #[must_use]
    pub const fn from_find_all(find_all: bool) -> Self {
        if find_all { Self::All } else { Self::First }
    }

    /// Whether `found` solutions satisfy the limit.
    #[must_use]
    pub const fn reached(self, found: usize) -> bool {
        match self {
            Self::First => found >= 1,
            Self::All => false,
            Self::AtMost(n) => found >= n,
        }
    }

    /// The limit left for a further search after `found` solutions.
    #[must_use]
    pub const fn remaining(self, found: usize) -> Self {
        match self {
            Self::AtMost(n) => Self::AtMost(n.saturating_sub(found)),
            other => other,
        }
    }
}

/// A complete truth assignment returned by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<bool>);

impl Assignment {
    fn from_model(model: &[Lit], var_count: usize) -> Self {
        let mut values = vec![false; var_count.max(model.len())];
        for lit in model {
            values[lit.var().index()] = lit.is_positive();
        }
        Self(values)
    }

    /// Truth value of a literal. Variables the solver never saw are false.
    #[must_use]
    pub fn value(&self, lit: Lit) -> bool {
        let var = self.0.get(lit.var().index()).copied().unwrap_or(false);
        var == lit.is_positive()
    }

    /// Index of the first true literal, used to decode one-hot groups.
    #[must_use]
    pub fn first_true(&self, lits: &[Lit]) -> Option<usize> {
        lits.iter().position(|&lit| self.value(lit))
    }
}

/// Receives assignments found while collecting solutions.
pub trait SolutionCallback {
    /// Decoded solution type.
    type Solution;

    /// Returns a clause falsified by `assignment` when the assignment breaks a rule
    /// that is not part of the model. The clause is added and the search continues.
    fn check(&mut self, _assignment: &Assignment) -> Option<Vec<Lit>> {
        None
    }

    /// Decodes an accepted assignment.
    fn on_solution(&mut self, assignment: &Assignment) -> Self::Solution;
}

/// Counters gathered across every solver call on one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveStats {
    /// Variables of the model.
    pub variables: usize,
    /// Clauses of the model, cuts included.
    pub clauses: usize,
    /// Calls into the SAT solver.
    pub solve_calls: usize,
    /// Clauses added by [`SolutionCallback::check`].
    pub cuts: usize,
    /// Accepted solutions.
    pub solutions: usize,
    /// Time spent solving.
    pub elapsed: Duration,
}

impl SolveStats {
    /// Adds another model's counters to this one.
    pub fn absorb(&mut self, other: &Self) {
        self.variables += other.variables;
        self.clauses += other.clauses;
        self.solve_calls += other.solve_calls;
        self.cuts += other.cuts;
        self.solutions += other.solutions;
        self.elapsed += other.elapsed;
    }
}

/// Solutions of a puzzle together with the counters of every model built for it.
#[derive(Debug, Clone)]
pub struct Solved<S> {
    /// Accepted solutions, in the order they were found.
    pub solutions: Vec<S>,
    /// Counters over every model built.
    pub stats: SolveStats,
}

impl<S> Default for Solved<S> {
    fn default() -> Self {
        Self {
            solutions: Vec::new(),
            stats: SolveStats::default(),
        }
    }
}

impl<S> Solved<S> {
    /// Appends the solutions and counters of one model.
    pub fn extend(&mut self, solutions: impl IntoIterator<Item = S>, stats: &SolveStats) {
        self.solutions.extend(solutions);
        self.stats.absorb(stats);
    }

    /// The first solution, if any.
    #[must_use]
    pub fn first(&self) -> Option<&S> {
        self.solutions.first()
    }
}

/// A boolean model backed by a `varisat` solver.
pub struct Model {
    solver: Solver<'static>,
    formula: CnfFormula,
    flushed: usize,
    true_lit: Lit,
    stats: SolveStats,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("variables", &self.formula.var_count())
            .field("clauses", &self.formula.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Creates an empty model containing only the constant `true` literal.
    #[must_use]
    pub fn new() -> Self {
        let mut formula = CnfFormula::new();
        let true_lit = formula.new_lit();
        formula.add_clause(&[true_lit]);
        Self {
            solver: Solver::new(),
            formula,
            flushed: 0,
            true_lit,
            stats: SolveStats::default(),
        }
    }

    /// Allocates a fresh boolean variable and returns its positive literal.
    pub fn new_bool(&mut self) -> Lit {
        self.formula.new_lit()
    }

    /// `n` fresh variables.
    pub fn new_bools(&mut self, n: usize) -> Vec<Lit> {
        (0..n).map(|_| self.new_bool()).collect()
    }

    /// A literal fixed to `value`.
    #[must_use]
    pub fn constant(&self, value: bool) -> Lit {
        if value { self.true_lit } else { !self.true_lit }
    }

    /// Adds the disjunction of `lits`.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        self.formula.add_clause(lits);
    }

    /// Adds `lits` as a clause, weakened by `!guard` when a guard is given.
    pub(crate) fn add_guarded(&mut self, guard: Option<Lit>, lits: &[Lit]) {
        match guard {
            Some(guard) => {
                let mut clause = Vec::with_capacity(lits.len() + 1);
                clause.push(!guard);
                clause.extend_from_slice(lits);
                self.add_clause(&clause);
            }
            None if lits.is_empty() => {
                let falsum = self.constant(false);
                self.add_clause(&[falsum]);
            }
            None => self.add_clause(lits),
        }
    }

    /// `a -> b`
    pub fn implies(&mut self, a: Lit, b: Lit) {
        self.add_clause(&[!a, b]);
    }

    /// Forces `lit` to be true.
    pub fn fix(&mut self, lit: Lit) {
        self.add_clause(&[lit]);
    }

    /// Variables created so far.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.formula.var_count()
    }

    /// Clauses added so far.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.formula.len()
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> SolveStats {
        SolveStats {
            variables: self.num_vars(),
            clauses: self.num_clauses(),
            ..self.stats
        }
    }

    fn flush(&mut self) {
        for clause in self.formula.iter().skip(self.flushed) {
            self.solver.add_clause(clause);
        }
        self.flushed = self.formula.len();
    }

    /// Runs the solver once on everything added so far.
    ///
    /// # Errors
    ///
    /// If the solver fails internally.
    pub fn solve(&mut self) -> Result<Option<Assignment>> {
        self.flush();
        let start = Instant::now();
        let satisfiable = self.solver.solve()?;
        self.stats.solve_calls += 1;
        self.stats.elapsed += start.elapsed();

        if !satisfiable {
            return Ok(None);
        }
        let model = self
            .solver
            .model()
            .ok_or_else(|| anyhow!("solver reported SAT without a model"))?;
        Ok(Some(Assignment::from_model(&model, self.num_vars())))
    }

    /// Enumerates solutions, blocking each accepted one over `projection`.
    ///
    /// With an empty projection the search stops after the first accepted solution.
    ///
    /// # Errors
    ///
    /// If the solver fails, or a callback returns a cut the assignment satisfies.
    pub fn collect<C: SolutionCallback>(
        &mut self,
        projection: &[Lit],
        limit: SearchLimit,
        callback: &mut C,
    ) -> Result<Vec<C::Solution>> {
        let mut solutions = Vec::new();

        while !limit.reached(solutions.len()) {
            let Some(assignment) = self.solve()? else {
                break;
            };

            if let Some(cut) = callback.check(&assignment) {
                self.add_cut(&assignment, &cut)?;
                continue;
            }

            solutions.push(callback.on_solution(&assignment));
            self.stats.solutions += 1;

            if projection.is_empty() {
                break;
            }
            let blocking: Vec<Lit> = projection
                .iter()
                .map(|&lit| if assignment.value(lit) { !lit } else { lit })
                .collect();
            self.add_clause(&blocking);
        }

        debug!(
            "collected {} solution(s) after {} solver call(s), {} cut(s)",
            solutions.len(),
            self.stats.solve_calls,
            self.stats.cuts
        );
        Ok(solutions)
    }

    /// Minimises the total of `objective`, returning the optimal total and solution.
    ///
    /// # Errors
    ///
    /// If the solver fails, or a callback returns a cut the assignment satisfies.
    pub fn minimize<C: SolutionCallback>(
        &mut self,
        objective: &SumOutputs,
        callback: &mut C,
    ) -> Result<Option<(u32, C::Solution)>> {
        let mut best = None;

        while let Some(assignment) = self.solve()? {
            if let Some(cut) = callback.check(&assignment) {
                self.add_cut(&assignment, &cut)?;
                continue;
            }

            let total = objective.evaluate(&assignment);
            debug!("incumbent objective {total}");
            best = Some((total, callback.on_solution(&assignment)));
            self.stats.solutions += 1;

            for lit in objective.at_least(total) {
                self.add_clause(&[!lit]);
            }
        }

        Ok(best)
    }

    fn add_cut(&mut self, assignment: &Assignment, cut: &[Lit]) -> Result<()> {
        if cut.iter().any(|&lit| assignment.value(lit)) {
            return Err(anyhow!("cut clause does not exclude the current assignment"));
        }
        trace!("adding cut of {} literal(s)", cut.len());
        self.stats.cuts += 1;
        self.add_clause(cut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collect(Vec<Lit>);

    impl SolutionCallback for Collect {
        type Solution = Vec<bool>;

        fn on_solution(&mut self, assignment: &Assignment) -> Vec<bool> {
            self.0.iter().map(|&l| assignment.value(l)).collect()
        }
    }

    #[test]
    fn test_enumerates_all_models_of_a_clause() {
        let mut model = Model::new();
        let xs = model.new_bools(2);
        model.add_clause(&xs);

        let mut callback = Collect(xs.clone());
        let mut solutions = model.collect(&xs, SearchLimit::All, &mut callback).unwrap();
        solutions.sort();
        assert_eq!(
            solutions,
            vec![vec![false, true], vec![true, false], vec![true, true]]
        );
    }

    #[test]
    fn test_first_limit_stops_early() {
        let mut model = Model::new();
        let xs = model.new_bools(3);
        let mut callback = Collect(xs.clone());
        let solutions = model.collect(&xs, SearchLimit::First, &mut callback).unwrap();
        assert_eq!(solutions.len(), 1);

        let mut model = Model::new();
        let xs = model.new_bools(3);
        let mut callback = Collect(xs.clone());
        let solutions = model
            .collect(&xs, SearchLimit::AtMost(5), &mut callback)
            .unwrap();
        assert_eq!(solutions.len(), 5);
    }

    #[test]
    fn test_unsat_yields_no_solutions() {
        let mut model = Model::new();
        let x = model.new_bool();
        model.fix(x);
        model.fix(!x);
        let mut callback = Collect(vec![x]);
        assert!(model.collect(&[x], SearchLimit::All, &mut callback).unwrap().is_empty());
    }

    struct RejectFirstTrue(Vec<Lit>);

    impl SolutionCallback for RejectFirstTrue {
        type Solution = usize;

        fn check(&mut self, assignment: &Assignment) -> Option<Vec<Lit>> {
            assignment.value(self.0[0]).then(|| vec![!self.0[0]])
        }

        fn on_solution(&mut self, assignment: &Assignment) -> usize {
            assignment.first_true(&self.0).unwrap_or(usize::MAX)
        }
    }

    #[test]
    fn test_cuts_reject_assignments() {
        let mut model = Model::new();
        let xs = model.new_bools(3);
        model.exactly_one(&xs);
        let mut callback = RejectFirstTrue(xs.clone());
        let mut solutions = model.collect(&xs, SearchLimit::All, &mut callback).unwrap();
        solutions.sort_unstable();
        assert_eq!(solutions, vec![1, 2]);
    }

    #[test]
    fn test_constants() {
        let mut model = Model::new();
        let t = model.constant(true);
        let f = model.constant(false);
        let assignment = model.solve().unwrap().unwrap();
        assert!(assignment.value(t));
        assert!(!assignment.value(f));
    }
}
