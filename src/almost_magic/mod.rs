#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Almost Magic Square: twenty-eight distinct positive integers fill four overlapping
//! 3x3 squares. In every square the eight line sums (rows, columns and diagonals)
//! differ by at most one. The goal is the smallest possible total.
//!
//! Cells are numbered 1 to 28 in reading order of this staggered shape:
//!
//! ```text
//!          1   2   3
//!          4   5   6   7   8
//!      9  10  11  12  13  14
//!     15  16  17  18  19  20
//!     21  22  23  24  25
//!             26  27  28
//! ```

mod catalogue;
mod search;
mod solver;

pub use search::{INITIAL_BOUND, MAX_BOUND};

use crate::model::{Model, Solved};
use anyhow::{bail, ensure, Result};
use catalogue::{Catalogue, Givens};
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Instant;

/// Number of numbered cells in the shape.
pub const CELL_COUNT: usize = 28;

/// Cell numbers of each 3x3 square, row by row.
pub const SQUARES: [[usize; 9]; 4] = [
    [1, 2, 3, 4, 5, 6, 10, 11, 12],
    [6, 7, 8, 12, 13, 14, 18, 19, 20],
    [9, 10, 11, 15, 16, 17, 21, 22, 23],
    [17, 18, 19, 23, 24, 25, 26, 27, 28],
];

/// Positions within a square of its three rows, three columns and two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Rows of the staggered shape: leading offset (1 = flush left) and cell numbers.
const SHAPE_ROWS: [(usize, &[usize]); 6] = [
    (2, &[1, 2, 3]),
    (2, &[4, 5, 6, 7, 8]),
    (1, &[9, 10, 11, 12, 13, 14]),
    (1, &[15, 16, 17, 18, 19, 20]),
    (1, &[21, 22, 23, 24, 25]),
    (3, &[26, 27, 28]),
];

const SHAPE_WIDTH: usize = 6;

/// A value prescribed for a numbered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Cell number, `1..=28`.
    pub cell: usize,
    /// The value the cell must hold.
    pub value: usize,
}

/// An Almost Magic Square instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlmostMagic {
    /// Prescribed cell values; empty for the open problem.
    #[serde(default)]
    pub givens: Vec<Entry>,
}

impl AlmostMagic {
    /// # Errors
    ///
    /// If a cell number is outside `1..=28`, a value is 0, or a cell or value repeats.
    pub fn new(givens: Vec<Entry>) -> Result<Self> {
        for entry in &givens {
            ensure!(
                (1..=CELL_COUNT).contains(&entry.cell),
                "no cell numbered {}",
                entry.cell
            );
            ensure!(entry.value > 0, "cell {} needs a positive value", entry.cell);
        }
        ensure!(
            givens.iter().map(|e| e.cell).all_unique(),
            "a cell is given twice"
        );
        ensure!(
            givens.iter().map(|e| e.value).all_unique(),
            "values must be distinct"
        );
        Ok(Self { givens })
    }
}

/// The line sums of one square, given its nine values row by row.
#[must_use]
pub fn line_sums(square: &[usize; 9]) -> [usize; 8] {
    LINES.map(|line| line.iter().map(|&i| square[i]).sum())
}

/// Whether the line sums of `square` differ by at most one.
#[must_use]
pub fn check_magic(square: &[usize; 9]) -> bool {
    let sums = line_sums(square);
    match sums.iter().minmax().into_option() {
        Some((min, max)) => max - min <= 1,
        None => true,
    }
}

/// Validates a full set of 28 values and returns their total.
///
/// # Errors
///
/// If the values are not 28 distinct positive integers or a square is not almost magic.
pub fn total(values: &[usize]) -> Result<usize> {
    ensure!(
        values.len() == CELL_COUNT,
        "expected {CELL_COUNT} values, got {}",
        values.len()
    );
    ensure!(values.iter().all(|&v| v > 0), "values must be positive");
    ensure!(values.iter().all_unique(), "values must be distinct");
    for cells in &SQUARES {
        let square = cells.map(|cell| values[cell - 1]);
        if !check_magic(&square) {
            bail!("invalid almost magic square: {cells:?}");
        }
    }
    Ok(values.iter().sum())
}

/// Draws the values in the staggered shape.
#[must_use]
pub fn render(values: &[usize]) -> String {
    let labels: Vec<String> = values.iter().map(ToString::to_string).collect();
    let width = labels.iter().map(String::len).max().unwrap_or(1);
    let blank = " ".repeat(width);
    let border = format!("-{}\n", format!("{}-", "-".repeat(width)).repeat(SHAPE_WIDTH));

    let mut out = border.clone();
    for (start, cells) in SHAPE_ROWS {
        out.push('|');
        let trailing = SHAPE_WIDTH + 1 - start - cells.len();
        for _ in 1..start {
            let _ = write!(out, "{blank}|");
        }
        for &cell in cells {
            let label = labels.get(cell - 1).map_or("", String::as_str);
            let _ = write!(out, "{label:>width$}|");
        }
        for _ in 0..trailing {
            let _ = write!(out, "{blank}|");
        }
        out.push('\n');
        out.push_str(&border);
    }
    out
}

/// Finds the smallest total.
///
/// The first search uses values up to [`INITIAL_BOUND`] (or the largest given), doubling
/// the bound while nothing fits. Any arrangement with a smaller total than the one found
/// has no value above `total - 1 - (1 + 2 + ... + 27)` and no square summing to more than
/// `total - 1 - (1 + 2 + ... + 19)`, so one more search with those limits proves the
/// optimum. Above [`MAX_BOUND`] the answer is returned unproven, with a warning.
///
/// `stats.solve_calls` counts catalogue searches and `stats.solutions` counts
/// improvements of the best total.
///
/// # Errors
///
/// If a given value exceeds [`MAX_BOUND`] or no arrangement exists with values up to it.
pub fn find_optimum(puzzle: &AlmostMagic) -> Result<Solved<Vec<usize>>> {
    optimum_within(puzzle, INITIAL_BOUND, MAX_BOUND)
}

fn optimum_within(
    puzzle: &AlmostMagic,
    first_bound: usize,
    last_bound: usize,
) -> Result<Solved<Vec<usize>>> {
    let start = Instant::now();
    let givens = Givens::new(&puzzle.givens);
    let largest_given = puzzle.givens.iter().map(|e| e.value).max().unwrap_or(0);
    ensure!(
        largest_given <= last_bound,
        "given value {largest_given} is above the largest supported value {last_bound}"
    );

    let mut solved = Solved::default();
    let mut bound = first_bound.max(largest_given);
    let mut best: Option<(usize, Vec<usize>)> = None;
    loop {
        let incumbent = best.as_ref().map(|(total, _)| *total);
        let max_sum = incumbent.map_or(usize::MAX, |t| t - 1 - search::OUTSIDE_ONE_SQUARE);
        let catalogue = Catalogue::new(u16::try_from(bound)?, max_sum);
        info!("searching {} squares with values up to {bound}", catalogue.len());

        let below = incumbent.unwrap_or(usize::MAX);
        let (found, stats) = search::search(&catalogue, &givens, below);
        solved.stats.solve_calls += 1;
        solved.stats.solutions += stats.improvements;
        if let Some(found) = found {
            info!("total {} with values up to {bound}", found.0);
            best = Some(found);
        }

        match &best {
            None if bound >= last_bound => {
                bail!("no arrangement with values up to {last_bound}: search bound exhausted")
            }
            None => bound = (bound * 2).min(last_bound),
            Some((total, _)) => {
                let proof_bound = total - 1 - search::ALL_BUT_ONE_CELL;
                if proof_bound <= bound {
                    info!("optimal total {total}");
                    break;
                }
                if bound >= last_bound {
                    warn!(
                        "total {total} is not proven optimal: \
                         values above {last_bound} were not searched"
                    );
                    break;
                }
                bound = proof_bound.min(last_bound);
            }
        }
    }

    solved.stats.elapsed = start.elapsed();
    solved.solutions.extend(best.map(|(_, values)| values));
    Ok(solved)
}

/// The model at the starting value bound.
///
/// # Errors
///
/// If the model cannot be built.
pub fn build_model(puzzle: &AlmostMagic) -> Result<Option<Model>> {
    let largest_given = puzzle.givens.iter().map(|e| e.value).max().unwrap_or(0);
    let bound = INITIAL_BOUND.max(largest_given);
    Ok(solver::build(puzzle, bound, None)?.map(|(model, ..)| model))
}
