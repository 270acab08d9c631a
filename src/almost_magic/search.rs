//! Branch and bound over catalogue squares.
//!
//! Squares are placed in the order A (top left), B (top right), C (bottom left) and
//! D (bottom right). Neighbours share two cells, so once A is placed the candidates
//! for B and C come from pair indexes keyed on those shared values, and D is keyed on
//! one value from C and one from B. Every index is sorted by sum, so each loop stops
//! at the first candidate that cannot beat the incumbent.
//!
//! Without givens, a quarter turn of the shape maps A to B, B to D, D to C and C to A,
//! so only arrangements where A has the smallest square sum are searched.

use super::catalogue::{Catalogue, Givens, PairIndex, Square};
use super::{CELL_COUNT, SQUARES};
use log::debug;

/// Smallest value bound that is tried first.
pub const INITIAL_BOUND: usize = 48;
/// Largest value bound the search grows to.
pub const MAX_BOUND: usize = 96;

/// `1 + 2 + ... + 19`: the least the 19 cells outside one square can add.
pub(crate) const OUTSIDE_ONE_SQUARE: usize = 190;
/// `1 + 2 + ... + 27`: the least any 27 cells can add.
pub(crate) const ALL_BUT_ONE_CELL: usize = 378;

/// Positions of A shared with B, matching B positions 0 and 3.
const A_WITH_B: [usize; 2] = [5, 8];
/// Positions of A shared with C, matching C positions 1 and 2.
const A_WITH_C: [usize; 2] = [6, 7];
/// Positions of B shared with D, matching D positions 1 and 2.
const B_WITH_D: [usize; 2] = [6, 7];
/// Positions of C shared with D, matching D positions 0 and 3.
const C_WITH_D: [usize; 2] = [5, 8];

const B_OWN: [usize; 7] = [1, 2, 4, 5, 6, 7, 8];
const C_OWN: [usize; 7] = [0, 3, 4, 5, 6, 7, 8];
const D_OWN: [usize; 5] = [4, 5, 6, 7, 8];
const ALL: [usize; 9] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SearchStats {
    /// Placements of B, C and D that passed the distinctness check.
    pub nodes: usize,
    /// Times the incumbent improved.
    pub improvements: usize,
}

/// The best arrangement found by [`search`]: the total and the 28 values.
pub(crate) type Arrangement = (usize, Vec<usize>);

/// Indexes built once per catalogue.
struct Tables<'a> {
    catalogue: &'a Catalogue,
    b_index: PairIndex,
    c_index: PairIndex,
    d_index: PairIndex,
    width: usize,
    /// Least D sum minus its shared cells, by the values D shares with B.
    d_rest_by_b: Vec<usize>,
    /// Least D sum minus its shared cells, by the values D shares with C.
    d_rest_by_c: Vec<usize>,
    d_rest: usize,
}

impl<'a> Tables<'a> {
    fn new(catalogue: &'a Catalogue, givens: &Givens) -> Self {
        let width = usize::from(catalogue.bound()) + 1;
        let d_index = PairIndex::new(catalogue, givens, 3, (0, 1));
        let mut d_rest_by_b = vec![usize::MAX; width * width];
        let mut d_rest_by_c = vec![usize::MAX; width * width];
        for &i in d_index.items() {
            let candidate = catalogue.get(i);
            let x = candidate.cells.map(usize::from);
            let rest = candidate.sum as usize - x[0] - x[1] - x[2] - x[3];
            let by_b = &mut d_rest_by_b[x[1] * width + x[2]];
            *by_b = (*by_b).min(rest);
            let by_c = &mut d_rest_by_c[x[0] * width + x[3]];
            *by_c = (*by_c).min(rest);
        }
        let d_rest = d_rest_by_b.iter().copied().min().unwrap_or(usize::MAX);

        Self {
            catalogue,
            b_index: PairIndex::new(catalogue, givens, 1, (0, 3)),
            c_index: PairIndex::new(catalogue, givens, 2, (1, 2)),
            d_index,
            width,
            d_rest_by_b,
            d_rest_by_c,
            d_rest,
        }
    }

    fn square_sum(&self, index: u32) -> usize {
        self.catalogue.get(index).sum as usize
    }

    /// The part of `group` whose square sums are at least `floor`.
    fn from_floor<'g>(&self, group: &'g [u32], floor: usize) -> &'g [u32] {
        &group[group.partition_point(|&i| self.square_sum(i) < floor)..]
    }
}

struct Search<'a> {
    tables: &'a Tables<'a>,
    symmetric: bool,
    used: Vec<bool>,
    best: usize,
    found: Option<[u32; 4]>,
    stats: SearchStats,
}

/// Searches for an arrangement with a total below `below`.
///
/// Without givens only arrangements where A has the smallest square sum are visited.
pub(crate) fn search(
    catalogue: &Catalogue,
    givens: &Givens,
    below: usize,
) -> (Option<Arrangement>, SearchStats) {
    let tables = Tables::new(catalogue, givens);
    let mut search = Search {
        tables: &tables,
        symmetric: givens.is_empty(),
        used: vec![false; usize::from(catalogue.bound()) + CELL_COUNT + 2],
        best: below,
        found: None,
        stats: SearchStats::default(),
    };
    if tables.d_rest != usize::MAX {
        search.place_a(givens);
    }
    debug!(
        "searched {} squares up to {}: {} nodes, {} improvement(s)",
        catalogue.len(),
        catalogue.bound(),
        search.stats.nodes,
        search.stats.improvements
    );

    let arrangement = search.found.map(|found| {
        let mut values = vec![0; CELL_COUNT];
        for (cells, index) in SQUARES.iter().zip(found) {
            for (cell, &value) in cells.iter().zip(&catalogue.get(index).cells) {
                values[cell - 1] = usize::from(value);
            }
        }
        (search.best, values)
    });
    (arrangement, search.stats)
}

impl Search<'_> {
    /// Sum of the `count` smallest positive values not yet used.
    fn smallest_unused(&self, count: usize) -> usize {
        (1..self.used.len())
            .filter(|&v| !self.used[v])
            .take(count)
            .sum()
    }

    fn all_unused(&self, square: &Square, positions: &[usize]) -> bool {
        positions
            .iter()
            .all(|&k| !self.used[usize::from(square[k])])
    }

    fn mark(&mut self, square: &Square, positions: &[usize], used: bool) {
        for &k in positions {
            self.used[usize::from(square[k])] = used;
        }
    }

    fn place_a(&mut self, givens: &Givens) {
        let tables = self.tables;

        for (a_index, a) in (0u32..).zip(tables.catalogue.squares()) {
            let a_sum = a.sum as usize;
            if a_sum + OUTSIDE_ONE_SQUARE >= self.best {
                break;
            }
            if !givens.fits(0, &a.cells) {
                continue;
            }
            let floor = if self.symmetric { a_sum } else { 0 };
            let cells = a.cells;

            let b_group = tables.from_floor(
                tables.b_index.group(cells[A_WITH_B[0]], cells[A_WITH_B[1]]),
                floor,
            );
            let c_group = tables.from_floor(
                tables.c_index.group(cells[A_WITH_C[0]], cells[A_WITH_C[1]]),
                floor,
            );
            let Some(&c_first) = c_group.first() else {
                continue;
            };
            if b_group.is_empty() {
                continue;
            }
            let c_least = tables.square_sum(c_first)
                - usize::from(cells[A_WITH_C[0]])
                - usize::from(cells[A_WITH_C[1]]);

            self.mark(&cells, &ALL, true);
            let a = Placed {
                index: a_index,
                cells,
                sum: a_sum,
            };
            self.place_b(&a, b_group, c_group, c_least, floor);
            self.mark(&cells, &ALL, false);
        }
    }

    fn place_b(
        &mut self,
        a: &Placed,
        b_group: &[u32],
        c_group: &[u32],
        c_least: usize,
        floor: usize,
    ) {
        let tables = self.tables;
        let shared = usize::from(a.cells[A_WITH_B[0]]) + usize::from(a.cells[A_WITH_B[1]]);
        let rest = self.smallest_unused(CELL_COUNT - 9 - 7);

        for &index in b_group {
            let b = tables.catalogue.get(index);
            let sum = a.sum + b.sum as usize - shared;
            if sum + rest >= self.best
                || (sum + c_least).saturating_add(tables.d_rest) >= self.best
            {
                break;
            }
            let (b6, b7) = (b.cells[B_WITH_D[0]], b.cells[B_WITH_D[1]]);
            let d_rest = tables.d_rest_by_b[usize::from(b6) * tables.width + usize::from(b7)];
            if (sum + c_least).saturating_add(d_rest) >= self.best
                || !self.all_unused(&b.cells, &B_OWN)
            {
                continue;
            }
            self.stats.nodes += 1;

            self.mark(&b.cells, &B_OWN, true);
            let b = Placed { index, cells: b.cells, sum };
            self.place_c(a, &b, d_rest, c_group, floor);
            self.mark(&b.cells, &B_OWN, false);
        }
    }

    /// `ab.sum` is the total of A and B together.
    fn place_c(
        &mut self,
        a: &Placed,
        ab: &Placed,
        d_rest: usize,
        c_group: &[u32],
        floor: usize,
    ) {
        let tables = self.tables;
        let shared = usize::from(a.cells[A_WITH_C[0]]) + usize::from(a.cells[A_WITH_C[1]]);
        let rest = self.smallest_unused(CELL_COUNT - 9 - 7 - 7);
        let (b6, b7) = (ab.cells[B_WITH_D[0]], ab.cells[B_WITH_D[1]]);

        for &index in c_group {
            let c = tables.catalogue.get(index);
            let sum = ab.sum + c.sum as usize - shared;
            if sum + rest >= self.best || sum.saturating_add(d_rest) >= self.best {
                break;
            }
            let (c5, c8) = (c.cells[C_WITH_D[0]], c.cells[C_WITH_D[1]]);
            let shared_with_d =
                usize::from(c5) + usize::from(b6) + usize::from(b7) + usize::from(c8);
            let by_c = tables.d_rest_by_c[usize::from(c5) * tables.width + usize::from(c8)];
            if sum.saturating_add(by_c) >= self.best
                || (sum + floor).saturating_sub(shared_with_d) >= self.best
                || !self.all_unused(&c.cells, &C_OWN)
            {
                continue;
            }
            self.stats.nodes += 1;

            self.mark(&c.cells, &C_OWN, true);
            self.place_d(
                [a.index, ab.index, index],
                (b6, b7),
                (c5, c8),
                sum - shared_with_d,
                floor,
            );
            self.mark(&c.cells, &C_OWN, false);
        }
    }

    /// `base` is the total of A, B and C less the four cells D shares with them.
    fn place_d(
        &mut self,
        placed: [u32; 3],
        (b6, b7): (u16, u16),
        (c5, c8): (u16, u16),
        base: usize,
        floor: usize,
    ) {
        let tables = self.tables;
        for &index in tables.d_index.group(c5, b6) {
            let d = tables.catalogue.get(index);
            let total = base + d.sum as usize;
            if total >= self.best {
                break;
            }
            if d.cells[2] != b7
                || d.cells[3] != c8
                || (d.sum as usize) < floor
                || !self.all_unused(&d.cells, &D_OWN)
            {
                continue;
            }
            self.stats.nodes += 1;
            self.stats.improvements += 1;
            self.best = total;
            let [a, b, c] = placed;
            self.found = Some([a, b, c, index]);
        }
    }
}

/// A square placed on the current branch.
struct Placed {
    index: u32,
    cells: Square,
    /// The square sum for A; the running total for B.
    sum: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almost_magic::{total, Entry};

    const KNOWN: [usize; 28] = [
        26, 2, 34, 29, 21, 13, 4, 18, 24, 7, 39, 16, 12, 6, 37, 23, 9, 5, 19, 10, 8, 40, 22, 11,
        1, 3, 17, 14,
    ];

    fn givens(values: &[usize]) -> Givens {
        let entries: Vec<Entry> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Entry { cell: i + 1, value })
            .collect();
        Givens::new(&entries)
    }

    #[test]
    fn test_fully_given_arrangement() {
        let catalogue = Catalogue::new(40, usize::MAX);
        let (found, stats) = search(&catalogue, &givens(&KNOWN), usize::MAX);
        let (best, values) = found.unwrap();
        assert_eq!(best, 470);
        assert_eq!(values, KNOWN.to_vec());
        assert_eq!(stats.improvements, 1);

        let (found, _) = search(&catalogue, &givens(&KNOWN), 470);
        assert!(found.is_none());
    }

    #[test]
    fn test_partial_givens_reach_a_valid_arrangement() {
        let catalogue = Catalogue::new(40, usize::MAX);
        let (found, _) = search(&catalogue, &givens(&KNOWN[..20]), usize::MAX);
        let (best, values) = found.unwrap();
        assert!(best <= 470);
        assert_eq!(total(&values).unwrap(), best);
        assert_eq!(&values[..20], &KNOWN[..20]);
    }

    #[test]
    fn test_broken_square_has_no_arrangement() {
        let mut values = KNOWN;
        values[27] = 15;
        let catalogue = Catalogue::new(40, usize::MAX);
        let (found, _) = search(&catalogue, &givens(&values), usize::MAX);
        assert!(found.is_none());
    }
}
