//! Pipeline orchestrator: compose the alignment stages and validate output.

use log::{debug, warn};

use crate::align::{create_initial_pairs, find_block_matches};
use crate::ast::{Block, block_to_text};
use crate::config::Config;
use crate::moves::detect_moved_text;
use crate::pairs::{DiffPair, validate_pairs};
use crate::repair::pair_unmatched_blocks;
use crate::split::detect_paragraph_splits;

/// A caller-supplied pipeline stage, run after the default stages.
pub type Stage<'a, 'b> = &'b dyn Fn(Vec<DiffPair<'a>>, &Config) -> Vec<DiffPair<'a>>;

/// Diff two block sequences into side-by-side pairs.
///
/// With no explicit config the process-wide settings apply. The pipeline is
/// total: any input produces a well-formed pair list.
pub fn run_pipeline<'a>(
    left: &'a [Block],
    right: &'a [Block],
    config: Option<&Config>,
) -> Vec<DiffPair<'a>> {
    run_pipeline_with_stages(left, right, config, &[])
}

/// [`run_pipeline`] plus extra stages after the default three
/// (pair unmatched blocks, detect paragraph splits, detect moved text).
pub fn run_pipeline_with_stages<'a>(
    left: &'a [Block],
    right: &'a [Block],
    config: Option<&Config>,
    extra_stages: &[Stage<'a, '_>],
) -> Vec<DiffPair<'a>> {
    let config = config.copied().unwrap_or_else(Config::from_process);

    let left_texts: Vec<String> = left.iter().map(block_to_text).collect();
    let right_texts: Vec<String> = right.iter().map(block_to_text).collect();
    let matches = find_block_matches(&left_texts, &right_texts, &config);
    if config.debug {
        debug!(
            "alignment: {} x {} blocks, {} matches at level {}",
            left.len(),
            right.len(),
            matches.len(),
            config.matching_level
        );
    }

    let mut pairs = create_initial_pairs(left, right, &matches);
    pairs = pair_unmatched_blocks(pairs, &config);
    pairs = detect_paragraph_splits(pairs, &config);
    pairs = detect_moved_text(pairs, &config);
    for stage in extra_stages {
        pairs = stage(pairs, &config);
    }

    if config.debug {
        debug!("pipeline produced {} pairs", pairs.len());
        for violation in validate_pairs(&pairs, left, right) {
            warn!("invariant violation: {violation}");
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;

    #[test]
    fn identical_documents_are_all_equal() {
        let md = "# Title\n\nBody paragraph one.\n\n- a\n- b\n";
        let left = parse(md);
        let right = parse(md);
        let pairs = run_pipeline(&left, &right, None);
        assert_eq!(pairs.len(), left.len());
        assert!(pairs.iter().all(|p| p.status() == "equal"));
    }

    #[test]
    fn empty_left_is_all_added() {
        let left: Vec<crate::ast::Block> = Vec::new();
        let right = parse("one\n\ntwo\n");
        let pairs = run_pipeline(&left, &right, None);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.status() == "added"));
    }

    #[test]
    fn empty_right_is_all_removed() {
        let left = parse("one\n\ntwo\n");
        let right: Vec<crate::ast::Block> = Vec::new();
        let pairs = run_pipeline(&left, &right, None);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.status() == "removed"));
    }

    #[test]
    fn both_empty_is_empty() {
        let pairs = run_pipeline(&[], &[], None);
        assert!(pairs.is_empty());
    }

    #[test]
    fn extra_stages_run_after_defaults() {
        let left = parse("alpha\n");
        let right = parse("alpha\n");
        let drop_all: Stage<'_, '_> = &|_pairs, _config| Vec::new();
        let pairs = run_pipeline_with_stages(&left, &right, None, &[drop_all]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn debug_validation_does_not_abort() {
        let left = parse("some text\n");
        let right = parse("other words\n");
        let config = Config {
            debug: true,
            ..Config::default()
        };
        let pairs = run_pipeline(&left, &right, Some(&config));
        assert!(!pairs.is_empty());
    }
}
