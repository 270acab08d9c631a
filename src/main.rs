//! # gridpuzzles
//!
//! `gridpuzzles` solves a family of logic-grid puzzles by encoding each one as a
//! boolean model and handing it to the `varisat` SAT solver.
//!
//! ## Puzzles
//!
//! -   **Hooks**: nested L-shaped hooks hold one 1, two 2s, and so on. Every region sums
//!     to the same total, filled cells are connected and every 2x2 block has an empty cell.
//!     The answer is the product of the areas of the empty components.
//! -   **Knight's Move**: values 1 to N where every region sums to the same total and
//!     each value is a knight's move from the previous one. The answer is the sum of
//!     the squared row maxima.
//! -   **Block Party**: each region of size n holds 1 to n, and the nearest other copy of
//!     a value v is exactly v steps away. The answer is the sum of the row products.
//! -   **24/7**: a 7x7 grid with one 1, two 2s, up to seven 7s, four cells per row and
//!     column summing to 20, connected filled cells and view clues on the border.
//! -   **Almost Magic Square**: four overlapping 3x3 squares of distinct values whose line
//!     sums differ by at most one, with the smallest possible total.
//!
//! ## Usage
//!
//! ```sh
//! gridpuzzles [SUBCOMMAND] [OPTIONS]
//! ```
//!
//! ### Subcommands
//!
//! 1.  **`hooks`**, **`knights`**, **`block-party`**: solve the built-in puzzle.
//!     `-e, --example` picks the 5x5 reference instance instead.
//! 2.  **`twenty-four-seven`**: find a 24/7 grid without clues.
//! 3.  **`almost-magic`**: find the smallest almost magic total.
//! 4.  **`file`**: solve a puzzle stored as JSON (see `grid_puzzles::puzzle`). A
//!     `twenty_four_seven_set` file solves several 24/7 grids and adds them up.
//!     ```sh
//!     gridpuzzles file --path puzzles/hooks.json --all
//!     ```
//! 5.  **`dir`**: solve every `.json` puzzle below a directory.
//! 6.  **`completions`**: print a shell completion script.
//!
//! ### Common Options
//!
//! -   `-d, --debug`: Enable debug logging (default: `false`).
//! -   `-a, --all`: Enumerate every solution (default: `false`).
//! -   `-s, --stats`: Print model, search and memory statistics (default: `false`).
//! -   `--export-dimacs <PATH>`: Write the model in DIMACS CNF format.
//! -   `--log-file <PATH>`: Send log output to a file.
//!
//! `RUST_LOG` overrides the log level chosen by the flags.

mod command_line;

use crate::command_line::cli::{self, Cli, Commands};
use clap::{CommandFactory, Parser};
use std::time::Duration;

/// Global allocator using `tikv-jemallocator`, which also provides the memory statistics.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    cli::init_logging(cli.command.common())?;

    match &cli.command {
        Commands::File { path, common } => cli::solve_file(path, common),
        Commands::Dir { path, common } => cli::solve_dir(path, common).map(|_| ()),
        command => {
            let (Some(puzzle), Some(common)) = (command.builtin(), command.common()) else {
                return Ok(());
            };
            cli::solve_and_report(&puzzle, common, None, Duration::ZERO)
        }
    }
}
