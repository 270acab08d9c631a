//! Enumeration of hook layouts.
//!
//! An N x N square is covered by N nested hooks: hook `k` is an L of `2k - 1` cells
//! running along two sides of a k x k square, and removing it leaves a
//! (k-1) x (k-1) square for the next hook. Choosing one of four corners for every
//! hook from N down to 2 gives `4^(N-1)` layouts, so a layout is identified by a
//! base-4 code.

use crate::grid::{Cell, Given, Grid};

/// The corner of the current square a hook wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// The hook runs along the top and left sides.
    TopLeft,
    /// The hook runs along the bottom and left sides.
    BottomLeft,
    /// The hook runs along the top and right sides.
    TopRight,
    /// The hook runs along the bottom and right sides.
    BottomRight,
}

impl Corner {
    /// The corners in base-4 digit order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::BottomLeft,
        Self::TopRight,
        Self::BottomRight,
    ];
}

/// Number of layouts of an N x N square.
#[must_use]
pub fn layout_count(size: usize) -> usize {
    4usize.pow(u32::try_from(size.saturating_sub(1)).unwrap_or(u32::MAX))
}

/// The layout whose corner choices (largest hook first) are the base-4 digits of `code`.
#[must_use]
pub fn layout_from_code(size: usize, mut code: usize) -> Grid<usize> {
    let mut layout = Grid::filled(size, size, 0);
    let (mut top, mut left) = (0, 0);

    for k in (2..=size).rev() {
        let corner = Corner::ALL[code % 4];
        code /= 4;

        let (col, row) = match corner {
            Corner::TopLeft => (left, top),
            Corner::BottomLeft => (left, top + k - 1),
            Corner::TopRight => (left + k - 1, top),
            Corner::BottomRight => (left + k - 1, top + k - 1),
        };
        for i in 0..k {
            layout[Cell::new(top + i, col)] = k;
            layout[Cell::new(row, left + i)] = k;
        }

        if col == left {
            left += 1;
        }
        if row == top {
            top += 1;
        }
    }
    if size > 0 {
        layout[Cell::new(top, left)] = 1;
    }
    layout
}

/// Every layout of an N x N square, lazily.
pub fn layouts(size: usize) -> impl Iterator<Item = Grid<usize>> {
    (0..layout_count(size)).map(move |code| layout_from_code(size, code))
}

/// Hook `k` holds `k'` copies of its value for some `k' <= 2k - 1`, so a given larger
/// than its hook's size rules the layout out.
#[must_use]
pub fn admits_givens(layout: &Grid<usize>, givens: &[Given]) -> bool {
    givens
        .iter()
        .all(|g| g.value <= 2 * layout[g.cell()] - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid(rows: [[usize; 5]; 5]) -> Grid<usize> {
        Grid::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_all_layouts_are_distinct_hooks() {
        let all: Vec<Grid<usize>> = layouts(5).collect();
        assert_eq!(all.len(), 256);

        let distinct: HashSet<&Grid<usize>> = all.iter().collect();
        assert_eq!(distinct.len(), 256);

        for layout in &all {
            for k in 1..=5 {
                assert_eq!(layout.values().filter(|&&v| v == k).count(), 2 * k - 1);
            }
        }
    }

    #[test]
    fn test_known_layouts_are_enumerated() {
        let expected = [
            grid([
                [4, 4, 4, 4, 5],
                [2, 2, 3, 4, 5],
                [2, 1, 3, 4, 5],
                [3, 3, 3, 4, 5],
                [5, 5, 5, 5, 5],
            ]),
            grid([
                [5, 4, 4, 4, 4],
                [5, 4, 3, 3, 3],
                [5, 4, 2, 1, 3],
                [5, 4, 2, 2, 3],
                [5, 5, 5, 5, 5],
            ]),
            grid([
                [5, 3, 3, 3, 4],
                [5, 1, 2, 3, 4],
                [5, 2, 2, 3, 4],
                [5, 4, 4, 4, 4],
                [5, 5, 5, 5, 5],
            ]),
        ];
        let all: HashSet<Grid<usize>> = layouts(5).collect();
        for layout in &expected {
            assert!(all.contains(layout), "missing layout\n{layout}");
        }
    }

    #[test]
    fn test_admits_givens() {
        let layout = layout_from_code(3, 0);
        // top-left corners all the way down: hook 1 sits at (2, 2)
        assert_eq!(layout[Cell::new(2, 2)], 1);
        assert!(admits_givens(&layout, &[Given::new((0, 0), 3)]));
        assert!(!admits_givens(&layout, &[Given::new((2, 2), 2)]));
    }
}
