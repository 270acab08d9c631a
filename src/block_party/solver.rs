use super::BlockParty;
use crate::grid::Grid;
use crate::model::{Assignment, Model, SearchLimit, SolutionCallback, SolveStats};
use anyhow::Result;
use log::debug;
use varisat::Lit;

/// `lits[i]` stands for the value `i + 1`.
pub(crate) struct Decode(Grid<Vec<Lit>>);

impl SolutionCallback for Decode {
    type Solution = Grid<usize>;

    fn on_solution(&mut self, assignment: &Assignment) -> Grid<usize> {
        self.0
            .map(|lits| assignment.first_true(lits).map_or(0, |i| i + 1))
    }
}

pub(crate) fn build(puzzle: &BlockParty) -> (Model, Decode, Vec<Lit>) {
    let labels = puzzle.regions.labels();
    let max_value = puzzle.max_value();
    let mut model = Model::new();

    let x = labels.map(|_| model.new_bools(max_value));
    for (_, lits) in x.iter() {
        model.exactly_one(lits);
    }

    for (_, cells) in puzzle.regions.iter() {
        for v in 0..max_value {
            let holders: Vec<Lit> = cells.iter().map(|&c| x[c][v]).collect();
            if v < cells.len() {
                model.exactly_one(&holders);
            } else {
                for lit in holders {
                    model.fix(!lit);
                }
            }
        }
    }

    let cells: Vec<_> = x.positions().collect();
    for (i, &cell) in cells.iter().enumerate() {
        for v in 1..=max_value {
            let at_distance: Vec<Lit> = cells
                .iter()
                .filter(|&&other| cell.taxicab(other) == v)
                .map(|&other| x[other][v - 1])
                .collect();
            let mut clause = at_distance;
            clause.push(!x[cell][v - 1]);
            model.add_clause(&clause);

            for &other in &cells[i + 1..] {
                if cell.taxicab(other) < v {
                    model.add_clause(&[!x[cell][v - 1], !x[other][v - 1]]);
                }
            }
        }
    }

    for given in &puzzle.givens {
        model.fix(x[given.cell()][given.value - 1]);
    }

    debug!(
        "block party model: {} variables, {} clauses",
        model.num_vars(),
        model.num_clauses()
    );

    let projection: Vec<Lit> = x.values().flatten().copied().collect();
    (model, Decode(x), projection)
}

pub(crate) fn solve(
    puzzle: &BlockParty,
    limit: SearchLimit,
) -> Result<(Vec<Grid<usize>>, SolveStats)> {
    let (mut model, mut decode, projection) = build(puzzle);
    let solutions = model.collect(&projection, limit, &mut decode)?;
    Ok((solutions, model.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Regions;

    #[test]
    fn test_tiny_boards() {
        // two one-cell regions both hold 1, one step apart
        let puzzle = BlockParty {
            regions: Regions::from_rows(vec![vec![1, 2]]).unwrap(),
            givens: Vec::new(),
        };
        let (solutions, _) = solve(&puzzle, SearchLimit::All).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].to_rows(), vec![vec![1, 1]]);

        // [1, 1, 2] leaves the 2 alone, [1, 2, 1] leaves the 1s two apart
        let puzzle = BlockParty {
            regions: Regions::from_rows(vec![vec![1, 2, 2]]).unwrap(),
            givens: Vec::new(),
        };
        let (solutions, _) = solve(&puzzle, SearchLimit::All).unwrap();
        assert!(solutions.is_empty());
    }
}
