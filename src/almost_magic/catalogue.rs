//! Every almost magic 3x3 square with distinct values up to a bound.
//!
//! A square is fixed by its centre `e`, its smallest line sum `s` and its top corners
//! `a` and `c`. Each of six lines then sums to `s` or `s + 1`, and those six choices
//! determine the other cells:
//!
//! ```text
//!     a b c      b = row 1 - a - c     d = column 1 - a - g
//!     d e f      i = diagonal - a - e   f = column 3 - c - i
//!     g h i      g = anti-diagonal - c - e
//!                h = column 2 - b - e
//! ```
//!
//! The two remaining rows are checked afterwards.

use super::{Entry, SQUARES};
use rustc_hash::FxHashMap;

/// One square, row by row.
pub(crate) type Square = [u16; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) sum: u32,
    pub(crate) cells: Square,
}

/// Almost magic squares sorted by increasing sum.
pub(crate) struct Catalogue {
    bound: u16,
    squares: Vec<Candidate>,
}

impl Catalogue {
    /// Every square with distinct values in `1..=bound` and a sum of at most `max_sum`.
    pub(crate) fn new(bound: u16, max_sum: usize) -> Self {
        let m = i64::from(bound);
        let mut squares = Vec::new();

        for e in 1..=m {
            for s in (3 * e - 3).max(1)..=3 * e + 2 {
                if usize::try_from(3 * s).map_or(true, |low| low > max_sum) {
                    continue;
                }
                let top = (s - e).min(m);
                for a in 1..=top {
                    for c in 1..=top.min(s - a) {
                        for choice in 0..64 {
                            if let Some(candidate) = complete(s, e, a, c, choice, m) {
                                if candidate.sum as usize <= max_sum {
                                    squares.push(candidate);
                                }
                            }
                        }
                    }
                }
            }
        }

        squares.sort_by_key(|candidate| candidate.sum);
        Self { bound, squares }
    }

    pub(crate) const fn bound(&self) -> u16 {
        self.bound
    }

    pub(crate) fn len(&self) -> usize {
        self.squares.len()
    }

    pub(crate) fn squares(&self) -> &[Candidate] {
        &self.squares
    }

    pub(crate) fn get(&self, index: u32) -> &Candidate {
        &self.squares[index as usize]
    }
}

/// Fills in a square from its free cells and the line sums picked by `choice`.
fn complete(s: i64, e: i64, a: i64, c: i64, choice: u8, bound: i64) -> Option<Candidate> {
    let line = |bit: u8| s + i64::from((choice >> bit) & 1);
    let b = line(0) - a - c;
    let i = line(1) - a - e;
    let g = line(2) - c - e;
    let h = line(3) - b - e;
    let d = line(4) - a - g;
    let f = line(5) - c - i;

    let values = [a, b, c, d, e, f, g, h, i];
    if values.iter().any(|v| !(1..=bound).contains(v)) {
        return None;
    }
    let middle = d + e + f;
    let bottom = g + h + i;
    if !(s..=s + 1).contains(&middle) || !(s..=s + 1).contains(&bottom) {
        return None;
    }
    // otherwise the same square turns up again under s + 1
    if choice == 0b11_1111 && middle > s && bottom > s {
        return None;
    }
    for (k, x) in values.iter().enumerate() {
        if values[k + 1..].contains(x) {
            return None;
        }
    }

    let mut cells = [0; 9];
    for (cell, value) in cells.iter_mut().zip(values) {
        *cell = u16::try_from(value).ok()?;
    }
    let sum = u32::try_from(line(0) + middle + bottom).ok()?;
    Some(Candidate { sum, cells })
}

/// Prescribed values, looked up by cell and by value.
#[derive(Debug, Default)]
pub(crate) struct Givens {
    by_cell: FxHashMap<usize, u16>,
    by_value: FxHashMap<u16, usize>,
}

impl Givens {
    pub(crate) fn new(entries: &[Entry]) -> Self {
        let mut givens = Self::default();
        for entry in entries {
            if let Ok(value) = u16::try_from(entry.value) {
                givens.by_cell.insert(entry.cell, value);
                givens.by_value.insert(value, entry.cell);
            }
        }
        givens
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_cell.is_empty()
    }

    /// Whether `square` can stand at position `slot` of the shape: it agrees with every
    /// given in its cells and places no given value anywhere else.
    pub(crate) fn fits(&self, slot: usize, square: &Square) -> bool {
        SQUARES[slot].iter().zip(square).all(|(cell, value)| {
            self.by_cell.get(cell).map_or(true, |given| given == value)
                && self.by_value.get(value).map_or(true, |at| at == cell)
        })
    }
}

/// Catalogue indices of the squares fitting one slot, grouped by the values at two
/// positions. Each group keeps the catalogue order, so it is sorted by sum.
pub(crate) struct PairIndex {
    width: usize,
    starts: Vec<u32>,
    items: Vec<u32>,
}

impl PairIndex {
    pub(crate) fn new(
        catalogue: &Catalogue,
        givens: &Givens,
        slot: usize,
        (p, q): (usize, usize),
    ) -> Self {
        let width = usize::from(catalogue.bound()) + 1;
        let key = |cells: &Square| usize::from(cells[p]) * width + usize::from(cells[q]);
        let fitting: Vec<u32> = (0..catalogue.len())
            .filter_map(|i| u32::try_from(i).ok())
            .filter(|&i| givens.fits(slot, &catalogue.get(i).cells))
            .collect();

        let mut starts = vec![0u32; width * width + 1];
        for &i in &fitting {
            starts[key(&catalogue.get(i).cells) + 1] += 1;
        }
        for k in 0..width * width {
            starts[k + 1] += starts[k];
        }

        let mut next = starts.clone();
        let mut items = vec![0; fitting.len()];
        for &i in &fitting {
            let k = key(&catalogue.get(i).cells);
            items[next[k] as usize] = i;
            next[k] += 1;
        }
        Self {
            width,
            starts,
            items,
        }
    }

    /// Squares with `x` and `y` at the two indexed positions.
    pub(crate) fn group(&self, x: u16, y: u16) -> &[u32] {
        let k = usize::from(x) * self.width + usize::from(y);
        &self.items[self.starts[k] as usize..self.starts[k + 1] as usize]
    }

    /// Every indexed square.
    pub(crate) fn items(&self) -> &[u32] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almost_magic::check_magic;
    use itertools::Itertools;

    fn widened(square: &Square) -> [usize; 9] {
        square.map(usize::from)
    }

    #[test]
    fn test_every_square_is_almost_magic() {
        let catalogue = Catalogue::new(20, usize::MAX);
        assert!(!catalogue.squares().is_empty());
        for candidate in catalogue.squares() {
            let square = widened(&candidate.cells);
            assert!(check_magic(&square), "{square:?}");
            assert!(square.iter().all_unique());
            assert!(square.iter().all(|&v| (1..=20).contains(&v)));
            assert_eq!(square.iter().sum::<usize>(), candidate.sum as usize);
        }
        assert!(catalogue
            .squares()
            .iter()
            .tuple_windows()
            .all(|(x, y)| x.sum <= y.sum));
    }

    #[test]
    fn test_squares_are_listed_once() {
        let catalogue = Catalogue::new(16, usize::MAX);
        assert!(catalogue.squares().iter().map(|c| c.cells).all_unique());
    }

    #[test]
    fn test_contains_lo_shu_and_known_squares() {
        let catalogue = Catalogue::new(12, usize::MAX);
        let lo_shu = [2, 7, 6, 9, 5, 1, 4, 3, 8];
        assert!(catalogue.squares().iter().any(|c| c.cells == lo_shu));
        assert_eq!(catalogue.squares()[0].sum, 45);

        let catalogue = Catalogue::new(40, usize::MAX);
        // first and last squares of the smallest known arrangement
        for square in [[26, 2, 34, 29, 21, 13, 7, 39, 16], [9, 5, 19, 22, 11, 1, 3, 17, 14]] {
            assert!(catalogue.squares().iter().any(|c| c.cells == square));
        }
    }

    #[test]
    fn test_sum_limit() {
        let catalogue = Catalogue::new(30, 60);
        assert!(!catalogue.squares().is_empty());
        assert!(catalogue.squares().iter().all(|c| c.sum <= 60));
        assert_eq!(Catalogue::new(30, 44).len(), 0);
    }

    #[test]
    fn test_givens_restrict_slots() {
        let givens = Givens::new(&[Entry { cell: 5, value: 5 }]);
        let lo_shu = [2, 7, 6, 9, 5, 1, 4, 3, 8];
        // cell 5 is the centre of the first square only
        assert!(givens.fits(0, &lo_shu));
        assert!(!givens.fits(1, &lo_shu));
        assert!(!givens.fits(0, &[4, 9, 2, 3, 6, 7, 8, 1, 5]));
        assert!(givens.fits(3, &[12, 17, 10, 11, 13, 15, 16, 9, 14]));
    }

    #[test]
    fn test_pair_index_groups_by_positions() {
        let catalogue = Catalogue::new(15, usize::MAX);
        let index = PairIndex::new(&catalogue, &Givens::default(), 1, (0, 3));
        assert_eq!(index.items().len(), catalogue.len());
        let group = index.group(2, 9);
        assert!(!group.is_empty());
        for &i in group {
            let cells = catalogue.get(i).cells;
            assert_eq!((cells[0], cells[3]), (2, 9));
        }
        assert!(group
            .iter()
            .tuple_windows()
            .all(|(&x, &y)| catalogue.get(x).sum <= catalogue.get(y).sum));
    }
}
