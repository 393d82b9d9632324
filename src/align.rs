//! Initial block alignment: similarity matrix plus weighted LCS.

use crate::ast::Block;
use crate::config::Config;
use crate::lcs::weighted_lcs;
use crate::pairs::{
    BlockMatch, DiffPair, create_added_pair, create_equal_pair, create_modified_pair,
    create_removed_pair,
};
use crate::similarity::dice;

/// Pair blocks across the two documents by bigram similarity.
pub fn find_block_matches(
    left_texts: &[String],
    right_texts: &[String],
    config: &Config,
) -> Vec<BlockMatch> {
    let threshold = config.matching_level.block_threshold();
    let sim: Vec<Vec<f64>> = left_texts
        .iter()
        .map(|l| right_texts.iter().map(|r| dice(l, r)).collect())
        .collect();
    weighted_lcs(&sim, threshold)
}

/// Walk both documents against the match list, emitting removed/added pairs
/// for skipped positions and equal/modified pairs for matches.
pub fn create_initial_pairs<'a>(
    left: &'a [Block],
    right: &'a [Block],
    matches: &[BlockMatch],
) -> Vec<DiffPair<'a>> {
    let mut pairs = Vec::new();
    let mut i = 0;
    let mut j = 0;
    for m in matches {
        while i < m.left {
            pairs.push(create_removed_pair(&left[i]));
            i += 1;
        }
        while j < m.right {
            pairs.push(create_added_pair(&right[j]));
            j += 1;
        }
        pairs.push(if m.exact {
            create_equal_pair(&left[i], &right[j])
        } else {
            create_modified_pair(&left[i], &right[j])
        });
        i += 1;
        j += 1;
    }
    while i < left.len() {
        pairs.push(create_removed_pair(&left[i]));
        i += 1;
    }
    while j < right.len() {
        pairs.push(create_added_pair(&right[j]));
        j += 1;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks.iter().map(crate::ast::block_to_text).collect()
    }

    #[test]
    fn identical_documents_match_exactly() {
        let md = "First paragraph.\n\nSecond paragraph.\n";
        let left = parse(md);
        let right = parse(md);
        let matches = find_block_matches(&texts(&left), &texts(&right), &Config::default());
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.exact));
        let pairs = create_initial_pairs(&left, &right, &matches);
        assert!(pairs.iter().all(|p| p.status() == "equal"));
    }

    #[test]
    fn small_edit_pairs_as_modified() {
        let left = parse("The quick brown fox jumps over the lazy dog.\n");
        let right = parse("The quick brown fox leaps over the lazy dog.\n");
        let matches = find_block_matches(&texts(&left), &texts(&right), &Config::default());
        assert_eq!(matches.len(), 1);
        assert!(!matches[0].exact);
        let pairs = create_initial_pairs(&left, &right, &matches);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].status(), "modified");
    }

    #[test]
    fn unrelated_blocks_become_removed_and_added() {
        let left = parse("Completely original text about weather patterns.\n");
        let right = parse("Unrelated musings covering cuisine instead.\n");
        let matches = find_block_matches(&texts(&left), &texts(&right), &Config::default());
        assert!(matches.is_empty());
        let pairs = create_initial_pairs(&left, &right, &matches);
        let statuses: Vec<&str> = pairs.iter().map(|p| p.status()).collect();
        assert_eq!(statuses, vec!["removed", "added"]);
    }

    #[test]
    fn empty_left_yields_all_added() {
        let left: Vec<Block> = Vec::new();
        let right = parse("one\n\ntwo\n");
        let pairs = create_initial_pairs(&left, &right, &[]);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.status() == "added"));
    }

    #[test]
    fn empty_right_yields_all_removed() {
        let left = parse("one\n\ntwo\n");
        let right: Vec<Block> = Vec::new();
        let pairs = create_initial_pairs(&left, &right, &[]);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.status() == "removed"));
    }

    #[test]
    fn skipped_blocks_flank_the_match() {
        let left = parse("Shared sentence about alignment basics.\n\nLeft only content.\n");
        let right = parse("Brand new right-side opener.\n\nShared sentence about alignment basics.\n");
        let matches = find_block_matches(&texts(&left), &texts(&right), &Config::default());
        assert_eq!(matches.len(), 1);
        let pairs = create_initial_pairs(&left, &right, &matches);
        let statuses: Vec<&str> = pairs.iter().map(|p| p.status()).collect();
        assert_eq!(statuses, vec!["added", "equal", "removed"]);
    }
}
