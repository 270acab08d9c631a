use super::{Cell, Grid};
use std::collections::VecDeque;

/// Orthogonally connected groups of `true` cells, each in discovery order.
#[must_use]
pub fn connected_components(mask: &Grid<bool>) -> Vec<Vec<Cell>> {
    let (rows, cols) = (mask.rows(), mask.cols());
    let mut seen = Grid::filled(rows, cols, false);
    let mut components = Vec::new();

    for start in mask.positions() {
        if !mask[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            component.push(cell);
            for next in cell.orthogonal_neighbours(rows, cols) {
                if mask[next] && !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Product of the areas of the connected groups of empty (zero) cells, with the areas.
#[must_use]
pub fn empty_area_product(values: &Grid<usize>) -> (u64, Vec<usize>) {
    let areas: Vec<usize> = connected_components(&values.map(|&v| v == 0))
        .iter()
        .map(Vec::len)
        .collect();
    let product = areas.iter().map(|&a| a as u64).product();
    (product, areas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_ignore_diagonals() {
        let mask = Grid::from_rows(vec![
            vec![true, false, true],
            vec![false, true, true],
            vec![true, false, false],
        ])
        .unwrap();
        let mut sizes: Vec<usize> = connected_components(&mask).iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 1, 3]);
    }

    #[test]
    fn test_empty_area_product() {
        let values = Grid::from_rows(vec![vec![0, 1, 0], vec![0, 1, 0], vec![1, 1, 0]]).unwrap();
        let (product, mut areas) = empty_area_product(&values);
        areas.sort_unstable();
        assert_eq!(areas, vec![2, 3]);
        assert_eq!(product, 6);
    }
}
