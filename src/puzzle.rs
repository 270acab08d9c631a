#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Puzzle instances read from JSON files.
//!
//! A file holds one object tagged by `kind`:
//!
//! ```json
//! {
//!   "kind": "hooks",
//!   "regions": [[1, 1, 2], [3, 2, 2], [3, 3, 2]],
//!   "givens": [{ "row": 0, "col": 2, "value": 3 }]
//! }
//! ```
//!
//! `knights` and `block_party` take the same fields, `twenty_four_seven` takes
//! `givens` and `views` (`{ "side": "left", "index": 0, "value": 5 }`),
//! `twenty_four_seven_set` takes `grids`, a list of such instances whose first
//! solutions are added together, and `almost_magic` takes `givens` as
//! `{ "cell": 1, "value": 26 }`.

use crate::almost_magic::AlmostMagic;
use crate::block_party::BlockParty;
use crate::hooks::Hooks;
use crate::knights::Knights;
use crate::twenty_four_seven::{TwentyFourSeven, TwentyFourSevenSet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One puzzle instance of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Puzzle {
    /// `"hooks"`
    Hooks(Hooks),
    /// `"knights"`
    Knights(Knights),
    /// `"block_party"`
    BlockParty(BlockParty),
    /// `"twenty_four_seven"`
    TwentyFourSeven(TwentyFourSeven),
    /// `"twenty_four_seven_set"`
    TwentyFourSevenSet(TwentyFourSevenSet),
    /// `"almost_magic"`
    AlmostMagic(AlmostMagic),
}

impl Puzzle {
    /// Parses and validates a puzzle.
    ///
    /// # Errors
    ///
    /// If the JSON is malformed or the instance is invalid.
    pub fn from_json(text: &str) -> Result<Self> {
        let puzzle: Self = serde_json::from_str(text)?;
        puzzle.validated()
    }

    /// Reads and validates a puzzle file.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or does not hold a valid puzzle.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid puzzle in {}", path.display()))
    }

    /// Pretty-printed JSON, readable by [`Puzzle::from_json`].
    ///
    /// # Errors
    ///
    /// If serialisation fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Display name of the puzzle kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hooks(_) => "Hooks",
            Self::Knights(_) => "Knight's Move",
            Self::BlockParty(_) => "Block Party",
            Self::TwentyFourSeven(_) => "24/7",
            Self::TwentyFourSevenSet(_) => "24/7 (combined grids)",
            Self::AlmostMagic(_) => "Almost Magic Square",
        }
    }

    /// Re-runs the checks of each puzzle's constructor.
    fn validated(self) -> Result<Self> {
        Ok(match self {
            Self::Hooks(p) => Self::Hooks(Hooks::new(p.regions, p.givens)?),
            Self::Knights(p) => Self::Knights(Knights::new(p.regions, p.givens)?),
            Self::BlockParty(p) => Self::BlockParty(BlockParty::new(p.regions, p.givens)?),
            Self::TwentyFourSeven(p) => {
                Self::TwentyFourSeven(TwentyFourSeven::new(p.givens, p.views)?)
            }
            Self::TwentyFourSevenSet(p) => {
                Self::TwentyFourSevenSet(TwentyFourSevenSet::new(p.grids)?)
            }
            Self::AlmostMagic(p) => Self::AlmostMagic(AlmostMagic::new(p.givens)?),
        })
    }
}
