#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Block Party: a region of `g` cells holds `1..=g` once each, and the nearest other
//! copy of a value `v` lies exactly `v` steps away in taxicab distance.

mod solver;

use crate::grid::{validate_givens, Cell, Given, Grid, Regions};
use crate::model::{Model, SearchLimit, Solved};
use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Block Party instance: regions plus prescribed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockParty {
    /// Regions; a region of `g` cells holds `1..=g`.
    pub regions: Regions,
    /// Prescribed values.
    #[serde(default)]
    pub givens: Vec<Given>,
}

impl BlockParty {
    /// # Errors
    ///
    /// If a given lies outside the grid or its value is larger than the largest region.
    pub fn new(regions: Regions, givens: Vec<Given>) -> Result<Self> {
        let labels = regions.labels();
        validate_givens(&givens, labels.rows(), labels.cols(), 1..=regions.largest())?;
        Ok(Self { regions, givens })
    }

    /// Largest value any cell can hold.
    #[must_use]
    pub fn max_value(&self) -> usize {
        self.regions.largest()
    }

    /// 5x5 reference instance.
    #[must_use]
    pub fn example() -> Self {
        Self {
            regions: Regions::from_rows(vec![
                vec![1, 1, 2, 2, 2],
                vec![3, 1, 1, 4, 2],
                vec![3, 5, 1, 6, 2],
                vec![3, 7, 7, 6, 6],
                vec![3, 3, 7, 8, 6],
            ])
            .unwrap_or_else(|e| unreachable!("{e}")),
            givens: vec![
                Given::new((2, 2), 4),
                Given::new((1, 4), 2),
                Given::new((3, 0), 3),
            ],
        }
    }

    /// 10x10 instance.
    #[must_use]
    pub fn puzzle() -> Self {
        Self {
            regions: Regions::from_rows(vec![
                vec![1, 2, 2, 2, 3, 3, 3, 3, 3, 3],
                vec![1, 1, 2, 2, 2, 3, 4, 4, 3, 3],
                vec![1, 1, 5, 5, 6, 6, 7, 4, 8, 8],
                vec![1, 1, 9, 5, 10, 7, 7, 7, 8, 8],
                vec![1, 9, 9, 10, 10, 11, 12, 7, 7, 8],
                vec![1, 13, 9, 14, 15, 11, 16, 16, 8, 8],
                vec![1, 17, 18, 14, 14, 14, 16, 19, 19, 19],
                vec![17, 17, 18, 20, 14, 21, 22, 23, 23, 22],
                vec![17, 17, 17, 20, 20, 22, 22, 23, 23, 22],
                vec![17, 17, 17, 17, 20, 20, 22, 22, 22, 22],
            ])
            .unwrap_or_else(|e| unreachable!("{e}")),
            givens: vec![
                Given::new((0, 1), 3),
                Given::new((0, 5), 7),
                Given::new((1, 3), 4),
                Given::new((2, 8), 2),
                Given::new((3, 3), 1),
                Given::new((4, 0), 6),
                Given::new((4, 2), 1),
                Given::new((5, 7), 3),
                Given::new((5, 9), 6),
                Given::new((6, 6), 2),
                Given::new((7, 1), 2),
                Given::new((8, 6), 6),
                Given::new((9, 4), 5),
                Given::new((9, 8), 2),
            ],
        }
    }
}

/// A cell breaking the distance rule in a finished grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxicabIssue {
    /// Another copy of the value is nearer than the value itself.
    Closer {
        /// The offending cell.
        cell: Cell,
        /// Its value.
        value: usize,
    },
    /// No other copy of the value lies at exactly that distance.
    NoNeighbour {
        /// The offending cell.
        cell: Cell,
        /// Its value.
        value: usize,
    },
}

impl fmt::Display for TaxicabIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closer { cell, value } => {
                write!(f, "{value} at {},{} has a closer neighbour", cell.row, cell.col)
            }
            Self::NoNeighbour { cell, value } => {
                write!(f, "{value} at {},{} has no correct neighbour", cell.row, cell.col)
            }
        }
    }
}

/// Re-checks the distance rule on a finished grid.
#[must_use]
pub fn check_taxicab(values: &Grid<usize>) -> Vec<TaxicabIssue> {
    let mut issues = Vec::new();
    for (cell, &value) in values.iter() {
        let distances: Vec<usize> = values
            .iter()
            .filter(|&(other, &v)| other != cell && v == value)
            .map(|(other, _)| cell.taxicab(other))
            .collect();
        if distances.iter().any(|&d| d < value) {
            issues.push(TaxicabIssue::Closer { cell, value });
        }
        if !distances.contains(&value) {
            issues.push(TaxicabIssue::NoNeighbour { cell, value });
        }
    }
    issues
}

/// Sum over the rows of the product of each row.
#[must_use]
pub fn row_product_sum(values: &Grid<usize>) -> u64 {
    (0..values.rows())
        .map(|r| values.row(r).iter().map(|&v| v as u64).product::<u64>())
        .sum()
}

/// # Errors
///
/// If the solver fails.
pub fn find_solutions(puzzle: &BlockParty, limit: SearchLimit) -> Result<Solved<Grid<usize>>> {
    let (solutions, stats) = solver::solve(puzzle, limit)?;
    info!("{} potential configuration(s) found", solutions.len());

    for solution in &solutions {
        for issue in check_taxicab(solution) {
            warn!("{issue}");
        }
    }

    let mut solved = Solved::default();
    solved.extend(solutions, &stats);
    Ok(solved)
}

/// The full Block Party model.
#[must_use]
pub fn build_model(puzzle: &BlockParty) -> Model {
    solver::build(puzzle).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> Grid<usize> {
        Grid::from_rows(vec![
            vec![5, 2, 1, 3, 4],
            vec![2, 3, 1, 1, 2],
            vec![1, 1, 4, 2, 5],
            vec![3, 1, 2, 1, 3],
            vec![4, 5, 3, 1, 4],
        ])
        .unwrap()
    }

    #[test]
    fn test_find_solution() {
        let solved = find_solutions(&BlockParty::example(), SearchLimit::All).unwrap();
        assert_eq!(solved.solutions, vec![expected()]);
        assert_eq!(row_product_sum(&solved.solutions[0]), 430);
    }

    #[test]
    fn test_check_taxicab() {
        let values = expected();
        assert!(check_taxicab(&values).is_empty());

        // a second 2 right next to the one at (1, 0)
        let mut broken = values;
        broken[Cell::new(0, 1)] = 1;
        broken[Cell::new(1, 1)] = 2;
        let issues = check_taxicab(&broken);
        assert!(!issues.is_empty());
        assert!(issues.contains(&TaxicabIssue::Closer {
            cell: Cell::new(1, 0),
            value: 2,
        }));
    }

    #[test]
    fn test_max_value() {
        assert_eq!(BlockParty::example().max_value(), 5);
        assert!(BlockParty::new(BlockParty::example().regions, vec![Given::new((0, 0), 6)]).is_err());
    }
}
