use super::{Candidate, Knights};
use crate::grid::Grid;
use crate::model::{Assignment, Model, SearchLimit, SolutionCallback, SolveStats, Term};
use anyhow::Result;
use varisat::Lit;

pub(crate) struct Decode(Grid<Vec<Lit>>);

impl SolutionCallback for Decode {
    type Solution = Grid<usize>;

    fn on_solution(&mut self, assignment: &Assignment) -> Grid<usize> {
        self.0.map(|lits| assignment.first_true(lits).unwrap_or_default())
    }
}

pub(crate) fn build(puzzle: &Knights, candidate: Candidate) -> (Model, Decode, Vec<Lit>) {
    let Candidate { largest: n, target } = candidate;
    let labels = puzzle.regions.labels();
    let (rows, cols) = (labels.rows(), labels.cols());
    let mut model = Model::new();

    // x[cell][v]: the cell holds v, 0 = empty
    let x = labels.map(|_| model.new_bools(n + 1));
    for (_, lits) in x.iter() {
        model.exactly_one(lits);
    }
    for v in 1..=n {
        let holders: Vec<Lit> = x.values().map(|lits| lits[v]).collect();
        model.exactly_one(&holders);
    }

    for (cell, lits) in x.iter() {
        let neighbours: Vec<_> = cell.knight_neighbours(rows, cols).collect();
        for v in 1..=n {
            let mut steps = Vec::with_capacity(2);
            if v > 1 {
                steps.push(v - 1);
            }
            if v < n {
                steps.push(v + 1);
            }
            for step in steps {
                let mut clause: Vec<Lit> = neighbours.iter().map(|&d| x[d][step]).collect();
                clause.push(!lits[v]);
                model.add_clause(&clause);
            }
        }
    }

    for given in &puzzle.givens {
        model.fix(x[given.cell()][given.value]);
    }

    for (_, cells) in puzzle.regions.iter() {
        let terms: Vec<Term> = cells
            .iter()
            .map(|&c| Term::one_hot(&x[c], |v| v as u32))
            .collect();
        model.sum(&terms, target..=target);
    }

    let projection: Vec<Lit> = x.values().flatten().copied().collect();
    (model, Decode(x), projection)
}

/// Places `1..=n` for one candidate `n` with every region summing to its target.
pub(crate) fn solve_candidate(
    puzzle: &Knights,
    candidate: Candidate,
    limit: SearchLimit,
) -> Result<(Vec<Grid<usize>>, SolveStats)> {
    let (mut model, mut decode, projection) = build(puzzle, candidate);
    let solutions = model.collect(&projection, limit, &mut decode)?;
    Ok((solutions, model.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn test_consecutive_values_are_knights_moves() {
        let puzzle = Knights::example();
        let candidate = Candidate {
            largest: 9,
            target: 15,
        };
        let (solutions, _) = solve_candidate(&puzzle, candidate, SearchLimit::All).unwrap();
        assert_eq!(solutions.len(), 1);

        let grid = &solutions[0];
        let position = |v: usize| -> Cell {
            grid.iter()
                .find(|&(_, &value)| value == v)
                .map(|(cell, _)| cell)
                .unwrap()
        };
        for v in 1..9 {
            assert!(position(v).is_knights_move(position(v + 1)), "{v} -> {}", v + 1);
        }
        assert_eq!(grid.values().filter(|&&v| v > 0).count(), 9);
    }

    #[test]
    fn test_infeasible_candidate() {
        let puzzle = Knights::example();
        let candidate = Candidate {
            largest: 6,
            target: 7,
        };
        let (solutions, stats) = solve_candidate(&puzzle, candidate, SearchLimit::All).unwrap();
        assert!(solutions.is_empty());
        assert_eq!(stats.solve_calls, 1);
    }
}
