use super::{TwentyFourSeven, View, LINE_COUNT, LINE_SUM, SIZE};
use crate::grid::{Cell, FilledCells, Grid};
use crate::model::{Assignment, Model, SearchLimit, SolutionCallback, SolveStats, Term};
use anyhow::Result;
use log::debug;
use varisat::Lit;

pub(crate) struct Decode {
    values: Grid<Vec<Lit>>,
    filled: FilledCells,
}

impl SolutionCallback for Decode {
    type Solution = Grid<usize>;

    fn check(&mut self, assignment: &Assignment) -> Option<Vec<Lit>> {
        self.filled.cut(assignment)
    }

    fn on_solution(&mut self, assignment: &Assignment) -> Grid<usize> {
        self.values
            .map(|lits| assignment.first_true(lits).unwrap_or_default())
    }
}

pub(crate) fn build(puzzle: &TwentyFourSeven) -> Result<(Model, Decode, Vec<Lit>)> {
    let mut model = Model::new();

    let x = Grid::filled(SIZE, SIZE, ()).map(|_| model.new_bools(SIZE + 1));
    for (_, lits) in x.iter() {
        model.exactly_one(lits);
    }
    let filled = x.map(|lits| !lits[0]);

    for v in 1..=SIZE {
        let holders: Vec<Lit> = x.values().map(|lits| lits[v]).collect();
        let v = u32::try_from(v)?;
        model.count(&holders, v..=v);
    }

    let count = u32::try_from(LINE_COUNT)?;
    let sum = u32::try_from(LINE_SUM)?;
    for i in 0..SIZE {
        for line in [row_cells(i), col_cells(i)] {
            let numbers: Vec<Lit> = line.iter().map(|&c| filled[c]).collect();
            model.count(&numbers, count..=count);
            let terms: Vec<Term> = line
                .iter()
                .map(|&c| Term::one_hot(&x[c], |v| v as u32))
                .collect();
            model.sum(&terms, sum..=sum);
        }
    }

    for row in 0..SIZE - 1 {
        for col in 0..SIZE - 1 {
            let window = [(0, 0), (0, 1), (1, 0), (1, 1)]
                .map(|(dr, dc)| x[Cell::new(row + dr, col + dc)][0]);
            model.at_least_one(&window);
        }
    }

    // a connected group of n cells has at least n - 1 adjacent pairs
    let mut edges = Vec::new();
    for (cell, &here) in filled.iter() {
        for next in [Cell::new(cell.row + 1, cell.col), Cell::new(cell.row, cell.col + 1)] {
            let Some(&there) = filled.get(next) else {
                continue;
            };
            let edge = model.new_bool();
            model.implies(edge, here);
            model.implies(edge, there);
            edges.push(edge);
        }
    }
    let numbers = u32::try_from(SIZE * (SIZE + 1) / 2)?;
    let edge_count = u32::try_from(edges.len())?;
    model.count(&edges, numbers - 1..=edge_count);

    for view in &puzzle.views {
        add_view(&mut model, &x, view);
    }

    for given in &puzzle.givens {
        model.fix(x[given.cell()][given.value]);
    }

    debug!(
        "24/7 model: {} variables, {} clauses, {} view(s)",
        model.num_vars(),
        model.num_clauses(),
        puzzle.views.len()
    );

    let projection: Vec<Lit> = x.values().flatten().copied().collect();
    let decode = Decode {
        values: x,
        filled: FilledCells::new(filled),
    };
    Ok((model, decode, projection))
}

pub(crate) fn solve(
    puzzle: &TwentyFourSeven,
    limit: SearchLimit,
) -> Result<(Vec<Grid<usize>>, SolveStats)> {
    let (mut model, mut decode, projection) = build(puzzle)?;
    let solutions = model.collect(&projection, limit, &mut decode)?;
    Ok((solutions, model.stats()))
}

fn row_cells(row: usize) -> Vec<Cell> {
    (0..SIZE).map(|col| Cell::new(row, col)).collect()
}

fn col_cells(col: usize) -> Vec<Cell> {
    (0..SIZE).map(|row| Cell::new(row, col)).collect()
}

/// A number other than the clue may only appear after the clue value has been seen.
fn add_view(model: &mut Model, x: &Grid<Vec<Lit>>, view: &View) {
    let line = view.side.line(view.index);
    for (k, &cell) in line.iter().enumerate() {
        let earlier: Vec<Lit> = line[..k].iter().map(|&c| x[c][view.value]).collect();
        for v in (1..=SIZE).filter(|&v| v != view.value) {
            let mut clause = earlier.clone();
            clause.push(!x[cell][v]);
            model.add_clause(&clause);
        }
    }
}
