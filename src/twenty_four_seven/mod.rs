#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! 24/7: a 7x7 grid holding one 1, two 2s, … up to seven 7s.
//!
//! Every row and column has exactly four numbers summing to 20, every 2x2 window
//! has an empty cell and the numbers form one orthogonally connected group.
//! Clues around the border give the first number seen from that side.

mod solver;

use crate::grid::{validate_givens, Cell, Given, Grid};
use crate::model::{Model, SearchLimit, SolveStats, Solved};
use anyhow::{ensure, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the grid.
pub const SIZE: usize = 7;
/// Numbers in every row and column.
pub const LINE_COUNT: usize = 4;
/// Sum of every row and column.
pub const LINE_SUM: usize = 20;

/// The border a view clue is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Read each column downwards.
    Top,
    /// Read each column upwards.
    Bottom,
    /// Read each row left to right.
    Left,
    /// Read each row right to left.
    Right,
}

impl Side {
    /// Cells of line `index` in the order they are seen from this side.
    #[must_use]
    pub fn line(self, index: usize) -> Vec<Cell> {
        let mut cells: Vec<Cell> = (0..SIZE)
            .map(|k| match self {
                Self::Top | Self::Bottom => Cell::new(k, index),
                Self::Left | Self::Right => Cell::new(index, k),
            })
            .collect();
        if matches!(self, Self::Bottom | Self::Right) {
            cells.reverse();
        }
        cells
    }
}

/// The first number seen in row/column `index` from `side` is `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct View {
    /// The border the line is read from.
    pub side: Side,
    /// Row or column, counted from the top or left.
    pub index: usize,
    /// The first number seen.
    pub value: usize,
}

impl View {
    /// The first number seen in line `index` from `side` is `value`.
    #[must_use]
    pub const fn new(side: Side, index: usize, value: usize) -> Self {
        Self { side, index, value }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} view {} = {}", self.side, self.index, self.value)
    }
}

/// A 24/7 instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwentyFourSeven {
    /// Prescribed values; 0 marks a cell that must stay empty.
    #[serde(default)]
    pub givens: Vec<Given>,
    /// Border clues.
    #[serde(default)]
    pub views: Vec<View>,
}

impl TwentyFourSeven {
    /// # Errors
    ///
    /// If a given or view lies off the board or names a value outside `1..=7`.
    pub fn new(givens: Vec<Given>, views: Vec<View>) -> Result<Self> {
        validate_givens(&givens, SIZE, SIZE, 0..=SIZE)?;
        for view in &views {
            ensure!(view.index < SIZE, "{view}: no such line");
            ensure!((1..=SIZE).contains(&view.value), "{view}: value out of range");
        }
        Ok(Self { givens, views })
    }
}

/// Several grids, each with its own clues, whose solutions are added cell by cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwentyFourSevenSet {
    /// The grids, solved independently.
    pub grids: Vec<TwentyFourSeven>,
}

impl TwentyFourSevenSet {
    /// # Errors
    ///
    /// If there are no grids or one of them is invalid (see [`TwentyFourSeven::new`]).
    pub fn new(grids: Vec<TwentyFourSeven>) -> Result<Self> {
        ensure!(!grids.is_empty(), "a set needs at least one grid");
        let grids = grids
            .into_iter()
            .map(|grid| TwentyFourSeven::new(grid.givens, grid.views))
            .collect::<Result<_>>()?;
        Ok(Self { grids })
    }
}

/// The outcome of [`solve_set`].
#[derive(Debug, Clone, Default)]
pub struct SolvedSet {
    /// First solution of each grid, in order; `None` where a grid has none.
    pub grids: Vec<Option<Grid<usize>>>,
    /// The element-wise sum and its sum of squares, when every grid was solved.
    pub combined: Option<(Grid<usize>, u64)>,
    /// Counters over every grid.
    pub stats: SolveStats,
}

/// Solves each grid of the set for its first solution and combines them.
///
/// # Errors
///
/// If the solver fails.
pub fn solve_set(set: &TwentyFourSevenSet) -> Result<SolvedSet> {
    let mut solved = SolvedSet::default();
    for (i, grid) in set.grids.iter().enumerate() {
        let found = find_solutions(grid, SearchLimit::First)?;
        solved.stats.absorb(&found.stats);
        if found.solutions.is_empty() {
            warn!("grid {} of the set has no solution", i + 1);
        }
        solved.grids.push(found.solutions.into_iter().next());
    }

    let firsts: Option<Vec<Grid<usize>>> = solved.grids.iter().cloned().collect();
    if let Some(firsts) = firsts {
        solved.combined = Some(combine(&firsts)?);
    }
    Ok(solved)
}

/// Views a finished grid does not show.
#[must_use]
pub fn check_views(values: &Grid<usize>, views: &[View]) -> Vec<View> {
    views
        .iter()
        .filter(|view| {
            let first = view
                .side
                .line(view.index)
                .into_iter()
                .map(|cell| values[cell])
                .find(|&v| v != 0);
            first != Some(view.value)
        })
        .copied()
        .collect()
}

/// Number of orthogonally adjacent pairs of filled cells.
#[must_use]
pub fn edge_count(values: &Grid<usize>) -> usize {
    values
        .iter()
        .filter(|&(_, &v)| v != 0)
        .map(|(cell, _)| {
            [Cell::new(cell.row + 1, cell.col), Cell::new(cell.row, cell.col + 1)]
                .into_iter()
                .filter(|&n| values.get(n).is_some_and(|&v| v != 0))
                .count()
        })
        .sum()
}

/// Adds grids element-wise and returns the sum with the total of its squared entries.
///
/// # Errors
///
/// If there are no grids or their shapes differ.
pub fn combine(grids: &[Grid<usize>]) -> Result<(Grid<usize>, u64)> {
    let Some(first) = grids.first() else {
        anyhow::bail!("nothing to combine");
    };
    let mut total = first.clone();
    for grid in &grids[1..] {
        ensure!(
            (grid.rows(), grid.cols()) == (total.rows(), total.cols()),
            "cannot add a {}x{} grid to a {}x{} grid",
            grid.rows(),
            grid.cols(),
            total.rows(),
            total.cols()
        );
        for (cell, &v) in grid.iter() {
            total[cell] += v;
        }
    }
    let squares = total.values().map(|&v| (v as u64).pow(2)).sum();
    Ok((total, squares))
}

/// # Errors
///
/// If the solver fails.
pub fn find_solutions(
    puzzle: &TwentyFourSeven,
    limit: SearchLimit,
) -> Result<Solved<Grid<usize>>> {
    let (solutions, stats) = solver::solve(puzzle, limit)?;
    if solutions.is_empty() {
        info!("NO SOLUTION FOUND");
    } else {
        info!("{} potential configuration(s) found", solutions.len());
    }

    for solution in &solutions {
        for view in check_views(solution, &puzzle.views) {
            warn!("checking {view} failed");
        }
    }

    let mut solved = Solved::default();
    solved.extend(solutions, &stats);
    Ok(solved)
}

/// The full model, connectivity cuts aside.
///
/// # Errors
///
/// If the model cannot be built.
pub fn build_model(puzzle: &TwentyFourSeven) -> Result<Model> {
    solver::build(puzzle).map(|(model, ..)| model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::connected_components;

    fn assert_rules(values: &Grid<usize>) {
        for v in 1..=SIZE {
            assert_eq!(values.values().filter(|&&x| x == v).count(), v, "count of {v}");
        }
        for i in 0..SIZE {
            let row = values.row(i);
            let col = values.column(i);
            for line in [row, col.as_slice()] {
                assert_eq!(line.iter().filter(|&&v| v != 0).count(), LINE_COUNT);
                assert_eq!(line.iter().sum::<usize>(), LINE_SUM);
            }
        }
        for r in 0..SIZE - 1 {
            for c in 0..SIZE - 1 {
                let window = [(0, 0), (0, 1), (1, 0), (1, 1)]
                    .map(|(dr, dc)| values[Cell::new(r + dr, c + dc)]);
                assert!(window.contains(&0), "full 2x2 at ({r}, {c})");
            }
        }
        assert_eq!(connected_components(&values.map(|&v| v != 0)).len(), 1);
        assert!(edge_count(values) >= 27);
    }

    #[test]
    fn test_unclued_grid_follows_rules() {
        let solved = find_solutions(&TwentyFourSeven::default(), SearchLimit::First).unwrap();
        assert_eq!(solved.solutions.len(), 1);
        assert_rules(&solved.solutions[0]);
    }

    #[test]
    fn test_views_are_respected() {
        let unclued = find_solutions(&TwentyFourSeven::default(), SearchLimit::First).unwrap();
        let reference = &unclued.solutions[0];

        // read a few clues off a valid grid; it still satisfies them
        let seen = |side: Side, index: usize| {
            let value = side
                .line(index)
                .into_iter()
                .map(|c| reference[c])
                .find(|&v| v != 0)
                .unwrap();
            View::new(side, index, value)
        };
        let views = vec![
            seen(Side::Left, 0),
            seen(Side::Right, 3),
            seen(Side::Top, 2),
            seen(Side::Bottom, 6),
        ];
        assert!(check_views(reference, &views).is_empty());

        let puzzle = TwentyFourSeven::new(Vec::new(), views.clone()).unwrap();
        let solved = find_solutions(&puzzle, SearchLimit::AtMost(3)).unwrap();
        assert!(!solved.solutions.is_empty());
        for solution in &solved.solutions {
            assert_rules(solution);
            assert!(check_views(solution, &views).is_empty());
        }
    }

    #[test]
    fn test_check_views_on_lines() {
        let mut values = Grid::filled(SIZE, SIZE, 0);
        values[Cell::new(0, 2)] = 5;
        values[Cell::new(0, 6)] = 3;
        values[Cell::new(4, 2)] = 7;

        let good = [
            View::new(Side::Left, 0, 5),
            View::new(Side::Right, 0, 3),
            View::new(Side::Top, 2, 5),
            View::new(Side::Bottom, 2, 7),
        ];
        assert!(check_views(&values, &good).is_empty());

        let bad = [View::new(Side::Left, 0, 3), View::new(Side::Top, 1, 1)];
        assert_eq!(check_views(&values, &bad), bad.to_vec());
    }

    #[test]
    fn test_combine() {
        let a = Grid::from_rows(vec![vec![1, 0], vec![2, 3]]).unwrap();
        let b = Grid::from_rows(vec![vec![0, 4], vec![1, 1]]).unwrap();
        let (sum, squares) = combine(&[a, b.clone()]).unwrap();
        assert_eq!(sum.to_rows(), vec![vec![1, 4], vec![3, 4]]);
        assert_eq!(squares, 1 + 16 + 9 + 16);

        let c = Grid::filled(1, 2, 1);
        assert!(combine(&[b, c]).is_err());
        assert!(combine(&[]).is_err());
    }

    #[test]
    fn test_set_combines_first_solutions() {
        let set = TwentyFourSevenSet::new(vec![TwentyFourSeven::default(); 2]).unwrap();
        let solved = solve_set(&set).unwrap();
        assert_eq!(solved.grids.len(), 2);
        let firsts: Vec<Grid<usize>> = solved.grids.iter().flatten().cloned().collect();
        assert_eq!(firsts.len(), 2);
        for grid in &firsts {
            assert_rules(grid);
        }
        let (sum, squares) = solved.combined.unwrap();
        assert_eq!((sum.clone(), squares), combine(&firsts).unwrap());
        // each grid holds v copies of every value v
        assert_eq!(sum.values().sum::<usize>(), 2 * (1..=SIZE).map(|v| v * v).sum::<usize>());
    }

    #[test]
    fn test_set_with_unsolvable_grid_is_not_combined() {
        let clash = TwentyFourSeven::new(
            vec![Given::new((0, 0), 1), Given::new((0, 1), 1)],
            Vec::new(),
        )
        .unwrap();
        let set = TwentyFourSevenSet::new(vec![clash]).unwrap();
        let solved = solve_set(&set).unwrap();
        assert_eq!(solved.grids, vec![None]);
        assert!(solved.combined.is_none());

        assert!(TwentyFourSevenSet::new(Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_bad_views() {
        assert!(TwentyFourSeven::new(Vec::new(), vec![View::new(Side::Top, 7, 1)]).is_err());
        assert!(TwentyFourSeven::new(Vec::new(), vec![View::new(Side::Top, 0, 0)]).is_err());
    }
}
