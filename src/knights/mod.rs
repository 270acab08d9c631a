#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Knight's Move: place `1..=n` on a grid so each value is a knight's move from the
//! previous one and every outlined region has the same sum.
//!
//! `n` is unknown. Since the regions share `1 + … + n` evenly, only a few totals are
//! possible; each is tried in increasing order with its own model.

mod solver;

use crate::grid::{validate_givens, Given, Grid, Regions};
use crate::model::{Model, SearchLimit, Solved};
use anyhow::{ensure, Result};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A Knight's Move instance: regions plus prescribed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knights {
    /// Regions that must share one sum.
    pub regions: Regions,
    /// Prescribed values.
    #[serde(default)]
    pub givens: Vec<Given>,
}

/// A largest value `n` and the common region sum it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The values used are `1..=largest`.
    pub largest: usize,
    /// Sum of every region.
    pub target: u32,
}

impl Knights {
    /// # Errors
    ///
    /// If a given lies outside the grid or its value exceeds the cell count.
    pub fn new(regions: Regions, givens: Vec<Given>) -> Result<Self> {
        let labels = regions.labels();
        let (rows, cols) = (labels.rows(), labels.cols());
        validate_givens(&givens, rows, cols, 1..=rows * cols)?;
        ensure!(
            givens.iter().map(|g| g.value).all_unique(),
            "a value is given more than once"
        );
        Ok(Self { regions, givens })
    }

    /// Candidate totals in increasing order of `n`.
    ///
    /// `n` starts at the largest given (and at least one value per region), the regions
    /// must split `n(n+1)/2` evenly, and a target the smallest region cannot reach even
    /// with the largest values is skipped.
    #[must_use]
    pub fn candidates(&self) -> Vec<Candidate> {
        let labels = self.regions.labels();
        let cells = labels.rows() * labels.cols();
        let regions = self.regions.count();
        let smallest = self.regions.smallest();
        let first = self
            .givens
            .iter()
            .map(|g| g.value)
            .max()
            .unwrap_or(1)
            .max(regions);

        (first..=cells)
            .filter_map(|n| {
                let total = n * (n + 1) / 2;
                if total % regions != 0 {
                    return None;
                }
                let target = total / regions;
                let reachable: usize = (n.saturating_sub(smallest) + 1..=n).sum();
                if target > reachable {
                    debug!("n = {n}: target {target} out of reach for a region of {smallest}");
                    return None;
                }
                Some(Candidate {
                    largest: n,
                    target: u32::try_from(target).ok()?,
                })
            })
            .collect()
    }

    /// 5x5 reference instance.
    #[must_use]
    pub fn example() -> Self {
        Self {
            regions: Regions::from_rows(vec![
                vec![1, 1, 1, 1, 1],
                vec![1, 1, 1, 1, 1],
                vec![1, 2, 1, 1, 1],
                vec![2, 2, 2, 2, 1],
                vec![2, 3, 3, 1, 1],
            ])
            .unwrap_or_else(|e| unreachable!("{e}")),
            givens: vec![
                Given::new((0, 0), 1),
                Given::new((1, 4), 4),
                Given::new((4, 1), 6),
            ],
        }
    }

    /// 10x10 instance.
    #[must_use]
    pub fn puzzle() -> Self {
        Self {
            regions: Regions::from_rows(vec![
                vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
                vec![1, 1, 1, 2, 1, 1, 1, 1, 3, 1],
                vec![1, 1, 1, 2, 1, 1, 1, 1, 3, 1],
                vec![1, 1, 2, 2, 2, 2, 4, 3, 3, 3],
                vec![5, 1, 2, 1, 1, 6, 4, 4, 4, 4],
                vec![5, 1, 1, 1, 6, 6, 6, 7, 7, 4],
                vec![5, 8, 8, 9, 6, 10, 10, 7, 7, 11],
                vec![5, 12, 8, 9, 9, 13, 13, 13, 7, 11],
                vec![5, 12, 14, 9, 15, 15, 15, 16, 16, 11],
                vec![12, 12, 14, 17, 17, 17, 17, 17, 16, 11],
            ])
            .unwrap_or_else(|e| unreachable!("{e}")),
            givens: vec![
                Given::new((0, 0), 12),
                Given::new((1, 6), 5),
                Given::new((1, 8), 23),
                Given::new((2, 6), 8),
                Given::new((3, 3), 14),
                Given::new((5, 1), 2),
                Given::new((6, 4), 20),
                Given::new((7, 4), 33),
                Given::new((9, 9), 28),
            ],
        }
    }
}

/// Sum of the squares of each row's largest value, with the squares.
#[must_use]
pub fn row_max_squares(values: &Grid<usize>) -> (usize, Vec<usize>) {
    let squares: Vec<usize> = (0..values.rows())
        .map(|r| values.row(r).iter().max().copied().unwrap_or(0).pow(2))
        .collect();
    (squares.iter().sum(), squares)
}

/// Tries every candidate total until `limit` solutions are found.
///
/// # Errors
///
/// If the solver fails.
pub fn find_solutions(puzzle: &Knights, limit: SearchLimit) -> Result<Solved<Grid<usize>>> {
    let mut solved = Solved::default();

    for candidate in puzzle.candidates() {
        let remaining = limit.remaining(solved.solutions.len());
        let (solutions, stats) = solver::solve_candidate(puzzle, candidate, remaining)?;
        debug!(
            "n = {}, region sum {}: {} solution(s) in {:.2?}",
            candidate.largest,
            candidate.target,
            solutions.len(),
            stats.elapsed
        );
        solved.extend(solutions, &stats);

        if limit.reached(solved.solutions.len()) {
            break;
        }
    }

    info!("{} solution(s)", solved.solutions.len());
    Ok(solved)
}

/// The model of the smallest candidate total.
#[must_use]
pub fn build_model(puzzle: &Knights) -> Option<Model> {
    let candidate = *puzzle.candidates().first()?;
    Some(solver::build(puzzle, candidate).0)
}
