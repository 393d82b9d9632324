//! Structural markdown diffing.
//!
//! Given two markdown documents parsed into sequences of top-level blocks,
//! the pipeline produces a side-by-side alignment in which each row is
//! classified as equal, added, removed, modified, or split. Modified rows
//! carry a nested word- and character-level inline diff that flags minor
//! (case- and punctuation-only) edits and absorbs stop-word noise.
//!
//! ```rust,ignore
//! use markdiff::{parse, run_pipeline};
//!
//! let old = parse("Hello world.\n");
//! let new = parse("Hello there, world.\n");
//! let pairs = run_pipeline(&old, &new, None);
//! ```
//!
//! Rendering, file I/O, and CLI wiring live outside this crate; the output
//! pair list is serializable so a renderer can consume it directly.

pub mod align;
pub mod ast;
pub mod boundary;
pub mod config;
pub mod inline;
pub mod lcs;
pub mod moves;
pub mod pairs;
pub mod pipeline;
pub mod repair;
pub mod rules;
pub mod similarity;
pub mod split;
pub mod text;

pub use ast::{Alignment, Block, Inline, block_to_text, parse};
pub use config::{Config, MatchingLevel, debug_enabled, matching_level, set_debug, set_matching_level};
pub use inline::{InlinePart, PartKind, compute_inline_diff, render_html_value};
pub use pairs::{BlockMatch, DiffPair, validate_pairs};
pub use pipeline::{run_pipeline, run_pipeline_with_stages};
pub use similarity::{TextSimilarity, WordRun, compute_text_similarity, dice};
pub use text::{WordToken, normalize_word, tokenize};

/// Errors surfaced by the crate's outer edges.
///
/// The diff core itself is total: any pair of block sequences produces a
/// well-formed pair list. Errors only arise on the configuration surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A matching level string from the CLI pass-through was not recognised.
    #[error("unknown matching level '{0}', expected: strict, normal, loose")]
    UnknownMatchingLevel(String),
}

/// Convenience result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
