use super::Hooks;
use crate::grid::{Cell, FilledCells, Grid};
use crate::model::{Assignment, Model, SearchLimit, SolutionCallback, SolveStats, Term};
use anyhow::Result;
use log::debug;
use varisat::Lit;

/// Decision variables of a number placement for one fixed hook layout.
pub(crate) struct Placement {
    /// `values[cell][v]`: the cell holds `v` (0 = empty).
    values: Grid<Vec<Lit>>,
    filled: FilledCells,
}

impl SolutionCallback for Placement {
    type Solution = Grid<usize>;

    fn check(&mut self, assignment: &Assignment) -> Option<Vec<Lit>> {
        self.filled.cut(assignment)
    }

    fn on_solution(&mut self, assignment: &Assignment) -> Grid<usize> {
        self.values
            .map(|lits| assignment.first_true(lits).unwrap_or_default())
    }
}

/// Builds the placement model for a fixed hook layout.
///
/// Hook labels map one-to-one onto the values `1..=N`; the hook mapped to `v` holds
/// exactly `v` copies of `v` and nothing else. Every 2x2 window keeps an empty cell
/// and every region sums to `target`. Connectivity of the filled cells is left to
/// the returned callback.
pub(crate) fn build(
    puzzle: &Hooks,
    layout: &Grid<usize>,
    target: u32,
) -> Result<(Model, Placement, Vec<Lit>)> {
    let n = puzzle.size();
    let mut model = Model::new();

    let values = layout.map(|_| model.new_bools(n + 1));
    for (_, lits) in values.iter() {
        model.exactly_one(lits);
    }

    // mapping[h - 1][v - 1]: hook h holds the value v
    let mapping: Vec<Vec<Lit>> = (0..n).map(|_| model.new_bools(n)).collect();
    for row in &mapping {
        model.exactly_one(row);
    }
    for v in 0..n {
        let column: Vec<Lit> = mapping.iter().map(|row| row[v]).collect();
        model.exactly_one(&column);
    }

    for row in 0..n.saturating_sub(1) {
        for col in 0..n - 1 {
            let window = [(0, 0), (0, 1), (1, 0), (1, 1)]
                .map(|(dr, dc)| values[Cell::new(row + dr, col + dc)][0]);
            model.at_least_one(&window);
        }
    }

    for hook in 1..=n {
        let cells: Vec<Cell> = layout
            .iter()
            .filter(|&(_, &h)| h == hook)
            .map(|(cell, _)| cell)
            .collect();
        for v in 1..=n {
            let holds = mapping[hook - 1][v - 1];
            let lits: Vec<Lit> = cells.iter().map(|&c| values[c][v]).collect();
            for &lit in &lits {
                model.implies(lit, holds);
            }
            let count: Vec<Term> = lits.iter().map(|&lit| Term::single(lit, 1)).collect();
            let v = u32::try_from(v)?;
            model.sum_if(Some(holds), &count, v..=v);
        }
    }

    for given in &puzzle.givens {
        model.fix(values[given.cell()][given.value]);
    }

    for (_, cells) in puzzle.regions.iter() {
        let terms: Vec<Term> = cells
            .iter()
            .map(|&c| Term::one_hot(&values[c], |v| v as u32))
            .collect();
        model.sum(&terms, target..=target);
    }

    let projection: Vec<Lit> = values.values().flatten().copied().collect();
    let filled = FilledCells::new(values.map(|lits| !lits[0]));
    Ok((model, Placement { values, filled }, projection))
}

/// Places numbers into a fixed hook layout with connected filled cells.
pub(crate) fn place_numbers(
    puzzle: &Hooks,
    layout: &Grid<usize>,
    target: u32,
    limit: SearchLimit,
) -> Result<(Vec<Grid<usize>>, SolveStats)> {
    let (mut model, mut placement, projection) = build(puzzle, layout, target)?;
    let solutions = model.collect(&projection, limit, &mut placement)?;

    debug!(
        "{} placement(s) with {} variables and {} clauses",
        solutions.len(),
        model.num_vars(),
        model.num_clauses()
    );
    Ok((solutions, model.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hooks;

    #[test]
    fn test_known_layout_has_one_connected_placement() {
        let puzzle = Hooks::example();
        let layout = Grid::from_rows(vec![
            vec![5, 3, 3, 3, 4],
            vec![5, 1, 2, 3, 4],
            vec![5, 2, 2, 3, 4],
            vec![5, 4, 4, 4, 4],
            vec![5, 5, 5, 5, 5],
        ])
        .unwrap();
        let target = puzzle.region_target().unwrap();
        assert_eq!(target, 11);

        let (solutions, stats) = place_numbers(&puzzle, &layout, target, SearchLimit::All).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].to_rows(), super::super::tests::example_values());
        assert!(stats.cuts > 0);
    }
}
