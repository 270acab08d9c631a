#![deny(missing_docs)]
//! Logic-grid puzzles encoded as SAT models and solved with `varisat`.

/// The `model` module is a small boolean modelling layer (cardinality, bounded sums,
/// enumeration, minimisation, DIMACS export) over the `varisat` solver.
pub mod model;

/// The `grid` module holds the grids, region partitions and givens every puzzle shares.
pub mod grid;

/// The `hooks` module solves Hooks: nested L-shaped hooks filled with 1 one, 2 twos, and so on.
pub mod hooks;

/// The `knights` module solves Knight's Move: consecutive values a knight's move apart.
pub mod knights;

/// The `block_party` module solves Block Party: each value's nearest twin is that many steps away.
pub mod block_party;

/// The `twenty_four_seven` module solves 24/7 on a 7x7 grid with border view clues.
pub mod twenty_four_seven;

/// The `almost_magic` module finds the smallest set of four overlapping almost magic squares.
pub mod almost_magic;

/// The `puzzle` module reads puzzle instances from JSON.
pub mod puzzle;
