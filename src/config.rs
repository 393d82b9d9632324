//! Matching sensitivity and process-wide configuration.
//!
//! Two pieces of process-wide state exist: the current matching level and a
//! debug flag. Both are init-at-startup / set-by-CLI and read at each use;
//! mutating them during a pipeline run is unsupported. Callers that prefer
//! explicit configuration can thread a [`Config`] through the pipeline and
//! treat the process-wide accessors as a thin shim for the CLI.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::{Error, Result};

/// Similarity above which a block match counts as exact (renders as equal).
pub const EXACT_MATCH_THRESHOLD: f64 = 0.99;
/// Similarity a joined block pair must reach to count as a paragraph split.
pub const SPLIT_SIMILARITY: f64 = 0.95;
/// Minimum word-run length for an anchor inside the inline diff.
pub const MIN_ANCHOR_RUN: usize = 3;
/// Minimum shared word run between segments for move detection.
pub const MIN_SHARED_FOR_MOVED: usize = 8;
/// Minimum segment length in characters considered by move detection.
pub const MIN_SEGMENT_LENGTH_FOR_MOVED: usize = 30;
/// Maximum length of an equal island absorbed between same-type changes.
pub const SHORT_MATCH_THRESHOLD: usize = 2;

/// Block matching sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingLevel {
    /// Pair blocks only on strong similarity.
    Strict,
    /// Balanced pairing.
    #[default]
    Normal,
    /// Pair blocks even on weak similarity.
    Loose,
}

impl MatchingLevel {
    /// Minimum bigram similarity for the block-alignment LCS to pair blocks.
    pub fn block_threshold(self) -> f64 {
        match self {
            MatchingLevel::Strict => 0.7,
            MatchingLevel::Normal => 0.6,
            MatchingLevel::Loose => 0.4,
        }
    }

    /// Minimum shared word run for repairing unmatched removed/added blocks.
    pub fn min_shared_for_pairing(self) -> usize {
        match self {
            MatchingLevel::Strict => 6,
            MatchingLevel::Normal => 5,
            MatchingLevel::Loose => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchingLevel::Strict => "strict",
            MatchingLevel::Normal => "normal",
            MatchingLevel::Loose => "loose",
        }
    }

    fn from_u8(n: u8) -> Self {
        match n {
            0 => MatchingLevel::Strict,
            2 => MatchingLevel::Loose,
            _ => MatchingLevel::Normal,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            MatchingLevel::Strict => 0,
            MatchingLevel::Normal => 1,
            MatchingLevel::Loose => 2,
        }
    }
}

impl FromStr for MatchingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(MatchingLevel::Strict),
            "normal" => Ok(MatchingLevel::Normal),
            "loose" => Ok(MatchingLevel::Loose),
            other => Err(Error::UnknownMatchingLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for MatchingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static PROCESS_LEVEL: AtomicU8 = AtomicU8::new(1);
static PROCESS_DEBUG: AtomicBool = AtomicBool::new(false);

/// Set the process-wide matching level (CLI shim).
pub fn set_matching_level(level: MatchingLevel) {
    PROCESS_LEVEL.store(level.to_u8(), Ordering::Relaxed);
}

/// Current process-wide matching level.
pub fn matching_level() -> MatchingLevel {
    MatchingLevel::from_u8(PROCESS_LEVEL.load(Ordering::Relaxed))
}

/// Enable or disable process-wide debug mode.
pub fn set_debug(enabled: bool) {
    PROCESS_DEBUG.store(enabled, Ordering::Relaxed);
}

/// Whether process-wide debug mode is on.
pub fn debug_enabled() -> bool {
    PROCESS_DEBUG.load(Ordering::Relaxed)
}

/// Tunable settings for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Block matching sensitivity.
    pub matching_level: MatchingLevel,
    /// Enables verbose stage logging and post-pipeline shape validation.
    pub debug: bool,
}

impl Config {
    /// Snapshot the process-wide state into an explicit config.
    pub fn from_process() -> Self {
        Config {
            matching_level: matching_level(),
            debug: debug_enabled(),
        }
    }
}
