//! Lazy connectivity for "all filled cells form one group" rules.

use super::{connected_components, Cell, Grid};
use crate::model::Assignment;
use rustc_hash::FxHashSet;
use varisat::Lit;

/// Literals saying "this cell is filled", one per cell.
#[derive(Debug, Clone)]
pub struct FilledCells(Grid<Lit>);

impl FilledCells {
    /// Wraps one "filled" literal per cell.
    #[must_use]
    pub const fn new(filled: Grid<Lit>) -> Self {
        Self(filled)
    }

    /// Which cells `assignment` fills.
    #[must_use]
    pub fn mask(&self, assignment: &Assignment) -> Grid<bool> {
        self.0.map(|&lit| assignment.value(lit))
    }

    /// A clause excluding `assignment` if its filled cells are disconnected.
    ///
    /// For the smallest group `C` and a cell `d` of another group: either a cell of `C`
    /// or `d` becomes empty, or some empty neighbour of `C` becomes filled.
    #[must_use]
    pub fn cut(&self, assignment: &Assignment) -> Option<Vec<Lit>> {
        let mask = self.mask(assignment);
        let mut components = connected_components(&mask);
        if components.len() < 2 {
            return None;
        }
        components.sort_by_key(Vec::len);
        let group = &components[0];
        let other = components[1][0];

        let (rows, cols) = (mask.rows(), mask.cols());
        let mut seen = FxHashSet::default();
        let boundary: Vec<Cell> = group
            .iter()
            .flat_map(|cell| cell.orthogonal_neighbours(rows, cols))
            .filter(|&n| !mask[n] && seen.insert(n))
            .collect();

        let mut clause: Vec<Lit> = group.iter().map(|&c| !self.0[c]).collect();
        clause.push(!self.0[other]);
        clause.extend(boundary.into_iter().map(|c| self.0[c]));
        Some(clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, SearchLimit, SolutionCallback};

    struct Connected(FilledCells);

    impl SolutionCallback for Connected {
        type Solution = Grid<bool>;

        fn check(&mut self, assignment: &Assignment) -> Option<Vec<Lit>> {
            self.0.cut(assignment)
        }

        fn on_solution(&mut self, assignment: &Assignment) -> Grid<bool> {
            self.0.mask(assignment)
        }
    }

    #[test]
    fn test_only_connected_pairs_survive() {
        // two filled cells on a 2x2 board: 4 adjacent placements, 2 diagonal ones
        let mut model = Model::new();
        let lits = model.new_bools(4);
        model.count(&lits, 2..=2);
        let filled = Grid::from_rows(vec![lits[..2].to_vec(), lits[2..].to_vec()]).unwrap();

        let mut callback = Connected(FilledCells::new(filled));
        let solutions = model.collect(&lits, SearchLimit::All, &mut callback).unwrap();
        assert_eq!(solutions.len(), 4);
        for mask in &solutions {
            assert_eq!(connected_components(mask).len(), 1);
        }
    }
}
