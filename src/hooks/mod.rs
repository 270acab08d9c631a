#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Hooks: an N x N grid split into nested L-shaped hooks.
//!
//! Each hook holds copies of a single value: one hook holds one 1, another two 2s, and
//! so on up to N copies of N. Filled cells are connected, every 2x2 window has an
//! empty cell and each outlined region has the same sum. The answer is the product
//! of the areas of the connected empty groups.
//!
//! Solving enumerates every hook layout and places numbers into each with a SAT model.

pub mod layout;
mod solver;

use crate::grid::{empty_area_product, validate_givens, Given, Grid, Regions};
use crate::model::{Model, SearchLimit, Solved};
use anyhow::{ensure, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// A Hooks instance: region outlines plus prescribed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hooks {
    /// Outlined regions; each sums to [`Hooks::region_target`].
    pub regions: Regions,
    /// Prescribed values; 0 marks a cell that must stay empty.
    #[serde(default)]
    pub givens: Vec<Given>,
}

/// A hook layout and the numbers placed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSolution {
    /// The hook number (size) of each cell.
    pub layout: Grid<usize>,
    /// Placed numbers, 0 for empty cells.
    pub values: Grid<usize>,
}

impl HookSolution {
    /// Product of the areas of the connected empty groups, with the areas.
    #[must_use]
    pub fn score(&self) -> (u64, Vec<usize>) {
        empty_area_product(&self.values)
    }
}

impl Hooks {
    /// # Errors
    ///
    /// If the grid is not square or a given is out of range.
    pub fn new(regions: Regions, givens: Vec<Given>) -> Result<Self> {
        let labels = regions.labels();
        ensure!(labels.is_square(), "hooks grid must be square");
        validate_givens(&givens, labels.rows(), labels.cols(), 0..=labels.rows())?;
        Ok(Self { regions, givens })
    }

    /// Side length `N` of the grid.
    #[must_use]
    pub fn size(&self) -> usize {
        self.regions.labels().rows()
    }

    /// The common region sum: `1² + 2² + … + N²` split evenly over the regions.
    #[must_use]
    pub fn region_target(&self) -> Option<u32> {
        let n = self.size();
        let total = n * (n + 1) * (2 * n + 1) / 6;
        let regions = self.regions.count();
        (total % regions == 0)
            .then(|| u32::try_from(total / regions).ok())
            .flatten()
    }

    /// 5x5 reference instance.
    #[must_use]
    pub fn example() -> Self {
        Self {
            regions: Regions::from_rows(vec![
                vec![1, 1, 1, 2, 2],
                vec![3, 3, 1, 2, 4],
                vec![3, 4, 4, 4, 4],
                vec![3, 5, 5, 5, 4],
                vec![3, 5, 4, 4, 4],
            ])
            .unwrap_or_else(|e| unreachable!("{e}")),
            givens: vec![
                Given::new((0, 1), 4),
                Given::new((0, 4), 3),
                Given::new((4, 0), 5),
                Given::new((4, 3), 5),
            ],
        }
    }

    /// 9x9 instance.
    #[must_use]
    pub fn puzzle() -> Self {
        Self {
            regions: Regions::from_rows(vec![
                vec![1, 2, 2, 2, 3, 4, 4, 5, 5],
                vec![1, 2, 6, 6, 3, 7, 4, 5, 8],
                vec![1, 9, 9, 6, 6, 7, 7, 8, 8],
                vec![1, 9, 10, 10, 6, 7, 11, 12, 12],
                vec![1, 10, 10, 13, 13, 13, 11, 14, 14],
                vec![1, 15, 10, 10, 10, 13, 11, 11, 14],
                vec![1, 15, 15, 16, 17, 13, 18, 18, 19],
                vec![1, 1, 16, 16, 17, 13, 18, 18, 19],
                vec![1, 16, 16, 17, 17, 13, 13, 19, 19],
            ])
            .unwrap_or_else(|e| unreachable!("{e}")),
            givens: vec![Given::new((0, 2), 8)],
        }
    }
}

/// Searches every hook layout for number placements.
///
/// # Errors
///
/// If the solver fails.
pub fn find_solutions(puzzle: &Hooks, limit: SearchLimit) -> Result<Solved<HookSolution>> {
    let mut solved = Solved::default();
    let Some(target) = puzzle.region_target() else {
        warn!(
            "{} regions cannot share the sum of squares up to {}",
            puzzle.regions.count(),
            puzzle.size()
        );
        return Ok(solved);
    };

    let mut skipped = 0usize;
    for (code, layout) in layout::layouts(puzzle.size()).enumerate() {
        if !layout::admits_givens(&layout, &puzzle.givens) {
            skipped += 1;
            continue;
        }

        let remaining = limit.remaining(solved.solutions.len());
        let (placements, stats) = solver::place_numbers(puzzle, &layout, target, remaining)?;
        if !placements.is_empty() {
            info!("layout {code}: {} potential configuration(s)", placements.len());
        }
        let solutions = placements.into_iter().map(|values| HookSolution {
            layout: layout.clone(),
            values,
        });
        solved.extend(solutions, &stats);

        if limit.reached(solved.solutions.len()) {
            break;
        }
    }

    info!(
        "{} solution(s); {skipped} layout(s) ruled out by the givens",
        solved.solutions.len()
    );
    Ok(solved)
}

/// The placement model of the first layout the givens admit, connectivity aside.
///
/// # Errors
///
/// If the model cannot be built.
pub fn build_model(puzzle: &Hooks) -> Result<Option<Model>> {
    let Some(target) = puzzle.region_target() else {
        return Ok(None);
    };
    layout::layouts(puzzle.size())
        .find(|layout| layout::admits_givens(layout, &puzzle.givens))
        .map(|layout| solver::build(puzzle, &layout, target).map(|(model, ..)| model))
        .transpose()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn example_values() -> Vec<Vec<usize>> {
        vec![
            vec![5, 4, 0, 4, 3],
            vec![0, 1, 2, 4, 0],
            vec![5, 2, 0, 4, 0],
            vec![0, 3, 0, 3, 0],
            vec![5, 5, 0, 5, 0],
        ]
    }

    #[test]
    fn test_score() {
        let solution = HookSolution {
            layout: Grid::filled(5, 5, 0),
            values: Grid::from_rows(example_values()).unwrap(),
        };
        let (product, mut areas) = solution.score();
        areas.sort_unstable();
        assert_eq!(product, 12);
        assert_eq!(areas, vec![1, 1, 1, 3, 4]);
    }

    #[test]
    fn test_find_solution() {
        let solved = find_solutions(&Hooks::example(), SearchLimit::All).unwrap();
        assert_eq!(solved.solutions.len(), 1);

        let solution = &solved.solutions[0];
        assert_eq!(
            solution.layout.to_rows(),
            vec![
                vec![5, 3, 3, 3, 4],
                vec![5, 1, 2, 3, 4],
                vec![5, 2, 2, 3, 4],
                vec![5, 4, 4, 4, 4],
                vec![5, 5, 5, 5, 5],
            ]
        );
        assert_eq!(solution.values.to_rows(), example_values());
        assert_eq!(solution.score().0, 12);
    }

    #[test]
    fn test_region_target() {
        assert_eq!(Hooks::example().region_target(), Some(11));
        // 285 over 19 regions
        assert_eq!(Hooks::puzzle().region_target(), Some(15));
    }

    #[test]
    fn test_uneven_target_has_no_solution() {
        // 55 does not split over two regions
        let regions = Regions::from_rows(vec![
            vec![1, 1, 1, 2, 2],
            vec![1, 1, 1, 2, 2],
            vec![1, 1, 2, 2, 2],
            vec![1, 1, 2, 2, 2],
            vec![1, 1, 2, 2, 2],
        ])
        .unwrap();
        let puzzle = Hooks::new(regions, Vec::new()).unwrap();
        assert_eq!(puzzle.region_target(), None);

        let solved = find_solutions(&puzzle, SearchLimit::All).unwrap();
        assert!(solved.solutions.is_empty());
        assert_eq!(solved.stats.solve_calls, 0);
        assert!(build_model(&puzzle).unwrap().is_none());
    }

    #[test]
    fn test_rejects_bad_givens() {
        let regions = Hooks::example().regions;
        assert!(Hooks::new(regions.clone(), vec![Given::new((5, 0), 1)]).is_err());
        assert!(Hooks::new(regions, vec![Given::new((0, 0), 6)]).is_err());
    }
}
