//! Diff pair variants, factories, and shape validation.
//!
//! Every block from either input document lands in exactly one pair, and
//! concatenating the left (resp. right) blocks across the output reproduces
//! the original left (resp. right) sequence.

use serde::Serialize;

use crate::ast::{Block, block_to_text};
use crate::inline::{InlinePart, compute_inline_diff};

/// A block pairing produced by the alignment LCS.
///
/// Match lists are strictly increasing in both indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockMatch {
    pub left: usize,
    pub right: usize,
    /// Similarity above the exact threshold; the pair renders as equal.
    pub exact: bool,
}

/// One row of the side-by-side diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DiffPair<'a> {
    Equal {
        left: &'a Block,
        right: &'a Block,
    },
    Added {
        right: &'a Block,
        /// Set by move detection when this block's content was shown inside
        /// another pair; renders as a paragraph indicator.
        #[serde(skip_serializing_if = "Option::is_none")]
        indicator: Option<Vec<InlinePart>>,
    },
    Removed {
        left: &'a Block,
    },
    Modified {
        left: &'a Block,
        right: &'a Block,
        inline: Vec<InlinePart>,
    },
    Split {
        left: &'a Block,
        /// First right-side block, in document order.
        first: &'a Block,
        /// Second right-side block.
        second: &'a Block,
        /// Character index in the left text where the first part ends.
        split_point: usize,
    },
}

impl<'a> DiffPair<'a> {
    pub fn status(&self) -> &'static str {
        match self {
            DiffPair::Equal { .. } => "equal",
            DiffPair::Added { .. } => "added",
            DiffPair::Removed { .. } => "removed",
            DiffPair::Modified { .. } => "modified",
            DiffPair::Split { .. } => "split",
        }
    }

    /// The left-document block this pair covers, if any.
    pub fn left_block(&self) -> Option<&'a Block> {
        match self {
            DiffPair::Equal { left, .. }
            | DiffPair::Removed { left }
            | DiffPair::Modified { left, .. }
            | DiffPair::Split { left, .. } => Some(*left),
            DiffPair::Added { .. } => None,
        }
    }

    /// The right-document blocks this pair covers, in document order.
    pub fn right_blocks(&self) -> Vec<&'a Block> {
        match self {
            DiffPair::Equal { right, .. }
            | DiffPair::Added { right, .. }
            | DiffPair::Modified { right, .. } => vec![*right],
            DiffPair::Split { first, second, .. } => vec![*first, *second],
            DiffPair::Removed { .. } => Vec::new(),
        }
    }

    /// The inline diff of a modified pair.
    pub fn inline_diff(&self) -> Option<&[InlinePart]> {
        match self {
            DiffPair::Modified { inline, .. } => Some(inline),
            _ => None,
        }
    }
}

pub fn create_equal_pair<'a>(left: &'a Block, right: &'a Block) -> DiffPair<'a> {
    DiffPair::Equal { left, right }
}

pub fn create_added_pair<'a>(right: &'a Block) -> DiffPair<'a> {
    DiffPair::Added {
        right,
        indicator: None,
    }
}

pub fn create_removed_pair<'a>(left: &'a Block) -> DiffPair<'a> {
    DiffPair::Removed { left }
}

/// Build a modified pair; the inline diff is computed here from the
/// serialised block texts.
pub fn create_modified_pair<'a>(left: &'a Block, right: &'a Block) -> DiffPair<'a> {
    let inline = compute_inline_diff(&block_to_text(left), &block_to_text(right));
    DiffPair::Modified {
        left,
        right,
        inline,
    }
}

/// Build a split pair from a source block and the two right-side blocks it
/// became. The split point is located by substring search on the trimmed
/// first-part text, falling back to the first part's length.
pub fn create_split_pair<'a>(
    left: &'a Block,
    first: &'a Block,
    second: &'a Block,
) -> DiffPair<'a> {
    let left_text = block_to_text(left);
    let first_text = block_to_text(first);
    let needle = first_text.trim();
    let split_point = match left_text.find(needle) {
        Some(start) => left_text[..start + needle.len()].chars().count(),
        None => needle.chars().count(),
    };
    DiffPair::Split {
        left,
        first,
        second,
        split_point,
    }
}

/// Check every pair's shape and the document-order invariants.
///
/// Returns human-readable violation descriptions; the pipeline logs them in
/// debug mode but never aborts on them.
pub fn validate_pairs(pairs: &[DiffPair<'_>], left: &[Block], right: &[Block]) -> Vec<String> {
    let mut violations = Vec::new();
    for (idx, pair) in pairs.iter().enumerate() {
        match pair {
            DiffPair::Modified { inline, .. } if inline.is_empty() => {
                violations.push(format!("pair {idx}: modified pair with empty inline diff"));
            }
            DiffPair::Split {
                left, split_point, ..
            } => {
                let len = block_to_text(left).chars().count();
                if *split_point > len {
                    violations.push(format!(
                        "pair {idx}: split point {split_point} beyond block text ({len} chars)"
                    ));
                }
            }
            DiffPair::Added {
                indicator: Some(parts),
                ..
            } if parts.is_empty() => {
                violations.push(format!("pair {idx}: empty moved-content indicator"));
            }
            _ => {}
        }
    }

    let lefts: Vec<&Block> = pairs.iter().filter_map(|p| p.left_block()).collect();
    if !same_sequence(&lefts, left) {
        violations.push("left blocks out of document order".to_string());
    }
    let rights: Vec<&Block> = pairs.iter().flat_map(|p| p.right_blocks()).collect();
    if !same_sequence(&rights, right) {
        violations.push("right blocks out of document order".to_string());
    }
    violations
}

fn same_sequence(found: &[&Block], expected: &[Block]) -> bool {
    found.len() == expected.len()
        && found
            .iter()
            .zip(expected)
            .all(|(a, b)| std::ptr::eq(*a, b))
}
