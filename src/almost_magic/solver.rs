use super::{AlmostMagic, CELL_COUNT, LINES, SQUARES};
use crate::model::{Assignment, Model, SolutionCallback, SumOutputs, Term};
use anyhow::Result;
use log::debug;
use varisat::Lit;

/// `cells[i][k]`: cell `i + 1` holds `k + 1`.
pub(crate) struct Decode(Vec<Vec<Lit>>);

impl SolutionCallback for Decode {
    type Solution = Vec<usize>;

    fn on_solution(&mut self, assignment: &Assignment) -> Vec<usize> {
        self.0
            .iter()
            .map(|lits| assignment.first_true(lits).map_or(0, |k| k + 1))
            .collect()
    }
}

/// Builds the model with every value in `1..=bound` and the total at most `cap`.
///
/// Returns `None` when the bound leaves too few values or is below a given.
pub(crate) fn build(
    puzzle: &AlmostMagic,
    bound: usize,
    cap: Option<usize>,
) -> Result<Option<(Model, Decode, SumOutputs)>> {
    if bound < CELL_COUNT || puzzle.givens.iter().any(|e| e.value > bound) {
        return Ok(None);
    }
    let mut model = Model::new();

    let cells: Vec<Vec<Lit>> = (0..CELL_COUNT).map(|_| model.new_bools(bound)).collect();
    for lits in &cells {
        model.exactly_one(lits);
    }

    // used[k]: some cell holds k + 1
    let mut used = Vec::with_capacity(bound);
    for k in 0..bound {
        let holders: Vec<Lit> = cells.iter().map(|lits| lits[k]).collect();
        model.at_most_one(&holders);
        let lit = model.new_bool();
        for &holder in &holders {
            model.implies(holder, lit);
        }
        let mut clause = holders;
        clause.push(!lit);
        model.add_clause(&clause);
        used.push(lit);
    }

    let line_max = 3 * u32::try_from(bound)?;
    for square in &SQUARES {
        // base[t]: every line of this square sums to t or t + 1
        let base = model.new_bools(line_max as usize + 1);
        model.exactly_one(&base);

        for line in &LINES {
            let terms: Vec<Term> = line
                .iter()
                .map(|&i| Term::one_hot(&cells[square[i] - 1], |k| k as u32 + 1))
                .collect();
            let sum = model.sum(&terms, 0..=line_max);
            for (t, out) in sum.outputs() {
                let t = t as usize;
                let mut clause = vec![!out, base[t]];
                if t > 0 {
                    clause.push(base[t - 1]);
                }
                model.add_clause(&clause);
            }
        }
    }

    for entry in &puzzle.givens {
        model.fix(cells[entry.cell - 1][entry.value - 1]);
    }

    let largest: usize = (bound + 1 - CELL_COUNT..=bound).sum();
    let hi = u32::try_from(cap.unwrap_or(largest).min(largest))?;
    let terms: Vec<Term> = used
        .iter()
        .enumerate()
        .map(|(k, &lit)| Term::single(lit, k as u32 + 1))
        .collect();
    let objective = model.sum(&terms, 0..=hi);

    debug!(
        "almost magic model, values up to {bound}: {} variables, {} clauses",
        model.num_vars(),
        model.num_clauses()
    );

    Ok(Some((model, Decode(cells), objective)))
}
