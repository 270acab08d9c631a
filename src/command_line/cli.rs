#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use grid_puzzles::almost_magic::{self, AlmostMagic};
use grid_puzzles::block_party::{self, BlockParty};
use grid_puzzles::grid::Grid;
use grid_puzzles::hooks::{self, Hooks};
use grid_puzzles::knights::{self, Knights};
use grid_puzzles::model::{Model, SearchLimit, SolveStats};
use grid_puzzles::puzzle::Puzzle;
use grid_puzzles::twenty_four_seven::{self, TwentyFourSeven, TwentyFourSevenSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the grid puzzle solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "gridpuzzles",
    version,
    about = "Logic-grid puzzles encoded as SAT models"
)]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute (e.g. `hooks`, `knights`, `file`).
    #[clap(subcommand)]
    pub command: Commands,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve the built-in Hooks puzzle (9x9, or the 5x5 example).
    Hooks {
        /// Use the 5x5 reference example instead of the 9x9 puzzle.
        #[arg(short, long, default_value_t = false)]
        example: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve the built-in Knight's Move puzzle (10x10, or the 5x5 example).
    Knights {
        /// Use the 5x5 reference example instead of the 10x10 puzzle.
        #[arg(short, long, default_value_t = false)]
        example: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve the built-in Block Party puzzle (10x10, or the 5x5 example).
    BlockParty {
        /// Use the 5x5 reference example instead of the 10x10 puzzle.
        #[arg(short, long, default_value_t = false)]
        example: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Find a 24/7 grid without clues. Clued instances are read with `file`.
    TwentyFourSeven {
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Find the smallest total of the four overlapping almost magic squares.
    AlmostMagic {
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a puzzle stored as JSON.
    File {
        /// Path to the `.json` puzzle file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.json` puzzle below a directory.
    Dir {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging, reporting progress candidate by candidate.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Enumerate every solution instead of stopping at the first one.
    ///
    /// Almost Magic reports its single optimum and 24/7 sets combine first solutions.
    #[arg(short, long, default_value_t = false)]
    pub(crate) all: bool,

    /// Enable printing of model and memory statistics after solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Write the puzzle's (first) model to this path in DIMACS CNF format.
    #[arg(long)]
    pub(crate) export_dimacs: Option<PathBuf>,

    /// Write log output to this file instead of stderr.
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

impl Commands {
    pub(crate) const fn common(&self) -> Option<&CommonOptions> {
        match self {
            Self::Hooks { common, .. }
            | Self::Knights { common, .. }
            | Self::BlockParty { common, .. }
            | Self::TwentyFourSeven { common }
            | Self::AlmostMagic { common }
            | Self::File { common, .. }
            | Self::Dir { common, .. } => Some(common),
            Self::Completions { .. } => None,
        }
    }

    /// The built-in instance a puzzle subcommand names.
    pub(crate) fn builtin(&self) -> Option<Puzzle> {
        let puzzle = match self {
            Self::Hooks { example, .. } => Puzzle::Hooks(if *example {
                Hooks::example()
            } else {
                Hooks::puzzle()
            }),
            Self::Knights { example, .. } => Puzzle::Knights(if *example {
                Knights::example()
            } else {
                Knights::puzzle()
            }),
            Self::BlockParty { example, .. } => Puzzle::BlockParty(if *example {
                BlockParty::example()
            } else {
                BlockParty::puzzle()
            }),
            Self::TwentyFourSeven { .. } => Puzzle::TwentyFourSeven(TwentyFourSeven::default()),
            Self::AlmostMagic { .. } => Puzzle::AlmostMagic(AlmostMagic::default()),
            _ => return None,
        };
        Some(puzzle)
    }
}

/// Sets up `env_logger`. `RUST_LOG` wins over the flags.
///
/// Without flags only warnings are shown; a log file records `info` and above,
/// `--debug` everything down to `debug`.
pub(crate) fn init_logging(common: Option<&CommonOptions>) -> Result<()> {
    let debug = common.is_some_and(|c| c.debug);
    let log_file = common.and_then(|c| c.log_file.as_deref());
    let level = default_level(debug, log_file.is_some());

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp(None).format_target(false);
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("unable to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

/// The log filter used when `RUST_LOG` is unset.
const fn default_level(debug: bool, to_file: bool) -> &'static str {
    match (debug, to_file) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    }
}

/// What [`solve_dir`] did with the files it found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DirReport {
    pub(crate) solved: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
}

/// Solves every `.json` puzzle below `path`, reporting failures and moving on.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<DirReport> {
    anyhow::ensure!(path.is_dir(), "not a directory: {}", path.display());
    let mut report = DirReport::default();

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "json") {
            eprintln!("Skipping non-JSON file: {}", file_path.display());
            report.skipped += 1;
            continue;
        }

        match solve_file(file_path, common) {
            Ok(()) => report.solved += 1,
            Err(e) => {
                eprintln!("Error: {e:#}");
                report.failed += 1;
            }
        }
    }

    println!(
        "Solved {} file(s), {} failed, {} skipped",
        report.solved, report.failed, report.skipped
    );
    Ok(report)
}

pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<()> {
    let time = Instant::now();
    let puzzle = Puzzle::load(path)?;
    let parse_time = time.elapsed();
    solve_and_report(&puzzle, common, Some(path), parse_time)
}

/// Solves a puzzle, prints its solutions and, if requested, statistics.
pub(crate) fn solve_and_report(
    puzzle: &Puzzle,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<()> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    println!("=====[ {} ]=====", puzzle.name());

    if let Some(path) = &common.export_dimacs {
        export_dimacs(puzzle, path)?;
    }

    epoch::advance()?;
    let limit = SearchLimit::from_find_all(common.all);
    let time = Instant::now();
    let solve_stats = match puzzle {
        Puzzle::Hooks(p) => report_hooks(p, limit)?,
        Puzzle::Knights(p) => report_knights(p, limit)?,
        Puzzle::BlockParty(p) => report_block_party(p, limit)?,
        Puzzle::TwentyFourSeven(p) => report_twenty_four_seven(p, limit)?,
        Puzzle::TwentyFourSevenSet(p) => report_twenty_four_seven_set(p)?,
        Puzzle::AlmostMagic(p) => report_almost_magic(p)?,
    };
    let elapsed = time.elapsed();
    println!("Total time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    if common.stats {
        epoch::advance()?;
        let allocated_mib = stats::allocated::read()? as f64 / (1024.0 * 1024.0);
        let resident_mib = stats::resident::read()? as f64 / (1024.0 * 1024.0);
        print_stats(parse_time, elapsed, &solve_stats, allocated_mib, resident_mib);
    }
    Ok(())
}

fn export_dimacs(puzzle: &Puzzle, path: &Path) -> Result<()> {
    let model: Option<Model> = match puzzle {
        Puzzle::Hooks(p) => hooks::build_model(p)?,
        Puzzle::Knights(p) => knights::build_model(p),
        Puzzle::BlockParty(p) => Some(block_party::build_model(p)),
        Puzzle::TwentyFourSeven(p) => Some(twenty_four_seven::build_model(p)?),
        Puzzle::TwentyFourSevenSet(p) => p
            .grids
            .first()
            .map(twenty_four_seven::build_model)
            .transpose()?,
        Puzzle::AlmostMagic(p) => almost_magic::build_model(p)?,
    };
    match model {
        Some(model) => {
            model.write_dimacs(path)?;
            println!("DIMACS written to: {}", path.display());
        }
        None => println!("No model to export: the puzzle is infeasible as stated"),
    }
    Ok(())
}

/// Prints every solution with `show`, or `NO SOLUTION FOUND`.
fn print_solutions<S>(solutions: &[S], mut show: impl FnMut(&S)) {
    if solutions.is_empty() {
        println!("NO SOLUTION FOUND");
        return;
    }
    if solutions.len() > 1 {
        println!("====={} valid solutions found=====", solutions.len());
    }
    for (i, solution) in solutions.iter().enumerate() {
        if solutions.len() > 1 {
            println!("-----Solution {}-----", i + 1);
        } else {
            println!("-----Solution-----");
        }
        show(solution);
    }
}

fn print_grid(title: &str, grid: &Grid<usize>) {
    println!("---{title}---");
    print!("{grid}");
}

fn report_hooks(puzzle: &Hooks, limit: SearchLimit) -> Result<SolveStats> {
    let solved = hooks::find_solutions(puzzle, limit)?;
    if puzzle.region_target().is_none() {
        println!("Region count does not divide the sum of squares");
    }
    print_solutions(&solved.solutions, |solution| {
        print_grid("hooks", &solution.layout);
        print_grid("vals", &solution.values);
        let (product, areas) = solution.score();
        println!("Areas: {areas:?}");
        println!("Product of areas: {product}");
    });
    Ok(solved.stats)
}

fn report_knights(puzzle: &Knights, limit: SearchLimit) -> Result<SolveStats> {
    let solved = knights::find_solutions(puzzle, limit)?;
    print_solutions(&solved.solutions, |values| {
        print_grid("vals", values);
        let (sum, squares) = knights::row_max_squares(values);
        println!("Squares of row-maxes {squares:?}");
        println!("sum: {sum}");
    });
    Ok(solved.stats)
}

fn report_block_party(puzzle: &BlockParty, limit: SearchLimit) -> Result<SolveStats> {
    let solved = block_party::find_solutions(puzzle, limit)?;
    print_solutions(&solved.solutions, |values| {
        for issue in block_party::check_taxicab(values) {
            println!("{issue}");
        }
        print_grid("vals", values);
        println!("sum of products {}", block_party::row_product_sum(values));
    });
    Ok(solved.stats)
}

fn show_twenty_four_seven(puzzle: &TwentyFourSeven, values: &Grid<usize>) {
    for view in twenty_four_seven::check_views(values, &puzzle.views) {
        println!("Checking {view} failed");
    }
    print_grid("vals", values);
    println!("Adjacent pairs: {}", twenty_four_seven::edge_count(values));
}

fn report_twenty_four_seven(puzzle: &TwentyFourSeven, limit: SearchLimit) -> Result<SolveStats> {
    let solved = twenty_four_seven::find_solutions(puzzle, limit)?;
    print_solutions(&solved.solutions, |values| {
        show_twenty_four_seven(puzzle, values);
    });
    Ok(solved.stats)
}

fn report_twenty_four_seven_set(set: &TwentyFourSevenSet) -> Result<SolveStats> {
    let solved = twenty_four_seven::solve_set(set)?;
    for (i, (puzzle, values)) in set.grids.iter().zip(&solved.grids).enumerate() {
        println!("-----Grid {}-----", i + 1);
        match values {
            Some(values) => show_twenty_four_seven(puzzle, values),
            None => println!("NO SOLUTION FOUND"),
        }
    }
    match &solved.combined {
        Some((sum, squares)) => {
            print_grid("sum of grids", sum);
            println!("sum of squared values {squares}");
        }
        None => println!("Not every grid has a solution, nothing to combine"),
    }
    Ok(solved.stats)
}

fn report_almost_magic(puzzle: &AlmostMagic) -> Result<SolveStats> {
    let solved = almost_magic::find_optimum(puzzle)?;
    let mut failure = None;
    print_solutions(&solved.solutions, |values| {
        println!("sol = {values:?}");
        match almost_magic::total(values) {
            Ok(total) => println!("sum of values = {total}"),
            Err(e) => failure = Some(e),
        }
        print!("{}", almost_magic::render(values));
    });
    if let Some(e) = failure {
        return Err(e.context("solver returned an invalid grid"));
    }
    Ok(solved.stats)
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of model and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    s: &SolveStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n========================[ Model Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", s.variables);
    stat_line("Clauses", s.clauses);
    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Solver calls", s.solve_calls, elapsed_secs);
    stat_line("Connectivity cuts", s.cuts);
    stat_line("Solutions", s.solutions);
    stat_line("Solver time (s)", format!("{:.3}", s.elapsed.as_secs_f64()));
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("Total time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_builtin_instances() {
        let common = CommonOptions::default();
        let hooks = Commands::Hooks {
            example: true,
            common: common.clone(),
        };
        assert_eq!(hooks.builtin(), Some(Puzzle::Hooks(Hooks::example())));

        let knights = Commands::Knights {
            example: false,
            common: common.clone(),
        };
        assert_eq!(knights.builtin(), Some(Puzzle::Knights(Knights::puzzle())));

        let magic = Commands::AlmostMagic { common };
        assert_eq!(
            magic.builtin(),
            Some(Puzzle::AlmostMagic(AlmostMagic::default()))
        );

        let completions = Commands::Completions {
            shell: clap_complete::Shell::Bash,
        };
        assert!(completions.builtin().is_none());
        assert!(completions.common().is_none());
    }

    #[test]
    fn test_example_flag_only_on_sized_puzzles() {
        let cli = Cli::try_parse_from(["gridpuzzles", "block-party", "-e", "--all"]).unwrap();
        let Commands::BlockParty { example, common } = &cli.command else {
            panic!("expected block-party");
        };
        assert!(*example);
        assert!(common.all);

        assert!(Cli::try_parse_from(["gridpuzzles", "almost-magic", "--example"]).is_err());
        assert!(Cli::try_parse_from(["gridpuzzles", "twenty-four-seven", "-e"]).is_err());
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), "warn");
        assert_eq!(default_level(false, true), "info");
        assert_eq!(default_level(true, false), "debug");
        assert_eq!(default_level(true, true), "debug");
    }

    #[test]
    fn test_solve_dir_counts_files() {
        let dir = std::env::temp_dir().join(format!("gridpuzzles-dir-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("notes.txt"), "not a puzzle").unwrap();
        fs::write(dir.join("broken.json"), "{").unwrap();
        fs::write(
            dir.join("nested").join("pair.json"),
            r#"{"kind": "block_party", "regions": [[1, 2]]}"#,
        )
        .unwrap();

        let report = solve_dir(&dir, &CommonOptions::default()).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert_eq!(
            report,
            DirReport {
                solved: 1,
                failed: 1,
                skipped: 1,
            }
        );

        assert!(solve_dir(&dir, &CommonOptions::default()).is_err());
    }
}
