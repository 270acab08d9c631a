#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Rectangular grids, region partitions and prescribed values shared by every puzzle.

mod components;
mod connectivity;

pub use components::{connected_components, empty_area_product};
pub use connectivity::FilledCells;

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A zero-based `(row, col)` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

const KNIGHT_STEPS: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

const ORTHOGONAL_STEPS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Cell {
    /// Cell at `row`, `col`.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance.
    #[must_use]
    pub const fn taxicab(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Whether `other` is a knight's move away.
    #[must_use]
    pub const fn is_knights_move(self, other: Self) -> bool {
        let (dr, dc) = (self.row.abs_diff(other.row), self.col.abs_diff(other.col));
        (dr == 1 && dc == 2) || (dr == 2 && dc == 1)
    }

    fn offset(self, (dr, dc): (isize, isize), rows: usize, cols: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Self { row, col })
    }

    /// Up, down, left and right neighbours inside a `rows` x `cols` grid.
    pub fn orthogonal_neighbours(self, rows: usize, cols: usize) -> impl Iterator<Item = Self> {
        ORTHOGONAL_STEPS
            .into_iter()
            .filter_map(move |step| self.offset(step, rows, cols))
    }

    /// Cells a knight's move away inside a `rows` x `cols` grid.
    pub fn knight_neighbours(self, rows: usize, cols: usize) -> impl Iterator<Item = Self> {
        KNIGHT_STEPS
            .into_iter()
            .filter_map(move |step| self.offset(step, rows, cols))
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Dense row-major grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// A `rows` x `cols` grid with every cell set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    /// Builds a grid from nested rows.
    ///
    /// # Errors
    ///
    /// If the rows are empty or have different lengths.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("grid has no rows");
        };
        let cols = first.len();
        ensure!(cols > 0, "grid has empty rows");
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            bail!("row {i} has {} cells, expected {cols}", row.len());
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// A copy of column `col`, top to bottom.
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows).map(|row| self[Cell::new(row, col)].clone()).collect()
    }

    /// Transposed copy.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let cells = (0..self.cols).flat_map(|c| self.column(c)).collect();
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// The values as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.cells.chunks(self.cols).map(<[T]>::to_vec).collect()
    }
}

impl<T> Grid<T> {
    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Whether there are as many rows as columns.
    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// `None` outside the grid.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<&T> {
        (cell.row < self.rows && cell.col < self.cols).then(|| &self.cells[self.index(cell)])
    }

    /// Row `row`, left to right.
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Cell> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Cell::new(i / cols, i % cols))
    }

    /// Every `(cell, value)` pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        self.positions().zip(self.cells.iter())
    }

    /// Every value in row-major order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// A grid of the same shape holding `f` of each value.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    const fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }
}

impl<T> std::ops::Index<Cell> for Grid<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &T {
        &self.cells[self.index(cell)]
    }
}

impl<T> std::ops::IndexMut<Cell> for Grid<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        let i = self.index(cell);
        &mut self.cells[i]
    }
}

impl<T: Display> Display for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .cells
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        for row in 0..self.rows {
            let line = self
                .row(row)
                .iter()
                .map(|v| format!("{v:>width$}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "[{line}]")?;
        }
        Ok(())
    }
}

impl<T: Serialize + Clone> Serialize for Grid<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Clone> Deserialize<'de> for Grid<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;
        Self::from_rows(rows).map_err(serde::de::Error::custom)
    }
}

/// A partition of a grid into regions labelled `1..=k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Grid<usize>", into = "Grid<usize>")]
pub struct Regions {
    labels: Grid<usize>,
    cells: Vec<Vec<Cell>>,
}

impl Regions {
    /// # Errors
    ///
    /// If a label is 0 or a label in `1..=max` is never used.
    pub fn new(labels: Grid<usize>) -> Result<Self> {
        let count = labels.values().copied().max().unwrap_or(0);
        let mut cells = vec![Vec::new(); count];
        for (cell, &label) in labels.iter() {
            ensure!(label > 0, "region label 0 at {cell:?}");
            cells[label - 1].push(cell);
        }
        if let Some(missing) = cells.iter().position(Vec::is_empty) {
            bail!("region {} has no cells", missing + 1);
        }
        Ok(Self { labels, cells })
    }

    /// # Errors
    ///
    /// See [`Grid::from_rows`] and [`Regions::new`].
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        Self::new(Grid::from_rows(rows)?)
    }

    /// The label of every cell.
    #[must_use]
    pub const fn labels(&self) -> &Grid<usize> {
        &self.labels
    }

    /// Number of regions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.len()
    }

    /// Label of the region containing `cell`.
    #[must_use]
    pub fn label(&self, cell: Cell) -> usize {
        self.labels[cell]
    }

    /// Cells of the region labelled `label` (1-based).
    #[must_use]
    pub fn cells(&self, label: usize) -> &[Cell] {
        &self.cells[label - 1]
    }

    /// `(label, cells)` for every region.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cells)| (i + 1, cells.as_slice()))
    }

    /// Size of the smallest region.
    #[must_use]
    pub fn smallest(&self) -> usize {
        self.cells.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Size of the largest region.
    #[must_use]
    pub fn largest(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl TryFrom<Grid<usize>> for Regions {
    type Error = anyhow::Error;

    fn try_from(labels: Grid<usize>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<Regions> for Grid<usize> {
    fn from(regions: Regions) -> Self {
        regions.labels
    }
}

/// A prescribed cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Given {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
    /// The value the cell must hold.
    pub value: usize,
}

impl Given {
    /// `value` at `(row, col)`.
    #[must_use]
    pub const fn new((row, col): (usize, usize), value: usize) -> Self {
        Self { row, col, value }
    }

    /// The cell the value is prescribed for.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}

/// Checks that every given lies on a `rows` x `cols` board with a value in `values`.
///
/// # Errors
///
/// On the first given that does not.
pub fn validate_givens(
    givens: &[Given],
    rows: usize,
    cols: usize,
    values: std::ops::RangeInclusive<usize>,
) -> Result<()> {
    for given in givens {
        ensure!(
            given.row < rows && given.col < cols,
            "given at ({}, {}) is outside the {rows}x{cols} grid",
            given.row,
            given.col
        );
        ensure!(
            values.contains(&given.value),
            "given value {} at ({}, {}) is outside {values:?}",
            given.value,
            given.row,
            given.col
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Grid::from_rows(vec![vec![1, 2], vec![3]]).is_err());
        assert!(Grid::<u8>::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_index_and_transpose() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(grid[Cell::new(1, 2)], 6);
        assert_eq!(grid.column(1), vec![2, 5]);
        let t = grid.transpose();
        assert_eq!(t.to_rows(), vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    }

    #[test]
    fn test_display_aligns_columns() {
        let grid = Grid::from_rows(vec![vec![1, 10], vec![0, 5]]).unwrap();
        assert_eq!(grid.to_string(), "[ 1 10]\n[ 0  5]\n");
    }

    #[test]
    fn test_knight_neighbours_in_corner() {
        let mut n: Vec<Cell> = Cell::new(0, 0).knight_neighbours(5, 5).collect();
        n.sort();
        assert_eq!(n, vec![Cell::new(1, 2), Cell::new(2, 1)]);
        assert!(Cell::new(0, 0).is_knights_move(Cell::new(2, 1)));
        assert_eq!(Cell::new(0, 0).taxicab(Cell::new(2, 3)), 5);
    }

    #[test]
    fn test_regions_validation() {
        let regions = Regions::from_rows(vec![vec![1, 1], vec![2, 1]]).unwrap();
        assert_eq!(regions.count(), 2);
        assert_eq!(regions.cells(2), &[Cell::new(1, 0)]);
        assert_eq!(regions.smallest(), 1);
        assert!(Regions::from_rows(vec![vec![1, 3], vec![3, 1]]).is_err());
        assert!(Regions::from_rows(vec![vec![0, 1]]).is_err());
    }

    #[test]
    fn test_grid_json_round_trip_shape() {
        let grid: Grid<usize> = serde_json::from_str("[[1,2],[3,4]]").unwrap();
        assert_eq!(grid.rows(), 2);
        assert!(serde_json::from_str::<Grid<usize>>("[[1,2],[3]]").is_err());
    }
}
