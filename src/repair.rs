//! Re-pairing of unmatched removed/added runs.
//!
//! After initial alignment, a run of removed pairs followed by a run of
//! added pairs is re-examined: each removed block greedily claims the best
//! remaining added block by longest common word run. Claims advance
//! monotonically through the added run, so document order is preserved on
//! both sides; any permutation that would reorder a side is never produced.

use log::debug;

use crate::ast::{Block, block_to_text};
use crate::config::Config;
use crate::pairs::{DiffPair, create_added_pair, create_modified_pair, create_removed_pair};
use crate::similarity::longest_common_run_normalized;
use crate::text::tokenize;

/// Pipeline stage: upgrade removed/added runs to modified pairs where the
/// blocks share a long enough word run.
pub fn pair_unmatched_blocks<'a>(pairs: Vec<DiffPair<'a>>, config: &Config) -> Vec<DiffPair<'a>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        if !matches!(pairs[i], DiffPair::Removed { .. }) {
            out.push(pairs[i].clone());
            i += 1;
            continue;
        }
        let removed_start = i;
        while i < pairs.len() && matches!(pairs[i], DiffPair::Removed { .. }) {
            i += 1;
        }
        let added_start = i;
        while i < pairs.len() && matches!(pairs[i], DiffPair::Added { .. }) {
            i += 1;
        }
        if added_start == i {
            // No added run follows; keep the removed pairs as they are.
            out.extend(pairs[removed_start..added_start].iter().cloned());
            continue;
        }
        let removed: Vec<&Block> = pairs[removed_start..added_start]
            .iter()
            .filter_map(|p| p.left_block())
            .collect();
        let added: Vec<&Block> = pairs[added_start..i]
            .iter()
            .flat_map(|p| p.right_blocks())
            .collect();
        out.extend(repair_region(&removed, &added, config));
    }
    out
}

fn repair_region<'a>(
    removed: &[&'a Block],
    added: &[&'a Block],
    config: &Config,
) -> Vec<DiffPair<'a>> {
    let min_shared = config.matching_level.min_shared_for_pairing();
    let removed_tokens: Vec<_> = removed
        .iter()
        .map(|b| tokenize(&block_to_text(b)))
        .collect();
    let added_tokens: Vec<_> = added.iter().map(|b| tokenize(&block_to_text(b))).collect();

    // Greedy, left-to-right, each added block claimed at most once. Claims
    // only move forward through the added run, which keeps both sides in
    // document order.
    let mut pairings: Vec<(usize, usize)> = Vec::new();
    let mut next_added = 0;
    for (p, r_tokens) in removed_tokens.iter().enumerate() {
        let mut best: Option<(usize, usize)> = None;
        for (q, a_tokens) in added_tokens.iter().enumerate().skip(next_added) {
            let run = longest_common_run_normalized(r_tokens, a_tokens).len;
            if run >= min_shared && best.is_none_or(|(len, _)| run > len) {
                best = Some((run, q));
            }
        }
        if let Some((run, q)) = best {
            debug!("repair: pairing removed block {p} with added block {q} (run {run})");
            pairings.push((p, q));
            next_added = q + 1;
        }
    }

    let mut out = Vec::new();
    let mut p = 0;
    let mut q = 0;
    for &(pp, qq) in &pairings {
        while p < pp {
            out.push(create_removed_pair(removed[p]));
            p += 1;
        }
        while q < qq {
            out.push(create_added_pair(added[q]));
            q += 1;
        }
        out.push(create_modified_pair(removed[pp], added[qq]));
        p += 1;
        q += 1;
    }
    while p < removed.len() {
        out.push(create_removed_pair(removed[p]));
        p += 1;
    }
    while q < added.len() {
        out.push(create_added_pair(added[q]));
        q += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::pairs::validate_pairs;

    fn statuses(pairs: &[DiffPair<'_>]) -> Vec<&'static str> {
        pairs.iter().map(|p| p.status()).collect()
    }

    #[test]
    fn shared_run_upgrades_to_modified() {
        // Low bigram similarity, but a long shared word run.
        let left = parse("zebras often gather near the winding river at dusk quietly\n");
        let right = parse("buffalo herds gather near the winding river at dusk instead\n");
        let pairs = vec![create_removed_pair(&left[0]), create_added_pair(&right[0])];
        let repaired = pair_unmatched_blocks(pairs, &Config::default());
        assert_eq!(statuses(&repaired), vec!["modified"]);
    }

    #[test]
    fn short_run_leaves_pairs_alone() {
        let left = parse("alpha beta gamma delta\n");
        let right = parse("epsilon zeta eta theta\n");
        let pairs = vec![create_removed_pair(&left[0]), create_added_pair(&right[0])];
        let repaired = pair_unmatched_blocks(pairs, &Config::default());
        assert_eq!(statuses(&repaired), vec!["removed", "added"]);
    }

    #[test]
    fn repair_preserves_document_order() {
        // removed r0 best-matches added a1; the unclaimed a0 must still come
        // out before the modified pair so the right side stays in order.
        let left = parse(
            "first shared sentence one two three four five six\n\nsecond shared sentence seven eight nine ten eleven twelve\n",
        );
        let right = parse(
            "fresh opener with nothing in common at all whatsoever honestly\n\nfirst shared sentence one two three four five six altered\n",
        );
        let pairs = vec![
            create_removed_pair(&left[0]),
            create_removed_pair(&left[1]),
            create_added_pair(&right[0]),
            create_added_pair(&right[1]),
        ];
        let repaired = pair_unmatched_blocks(pairs, &Config::default());
        assert_eq!(statuses(&repaired), vec!["added", "modified", "removed"]);
        assert!(validate_pairs(&repaired, &left, &right).is_empty());
    }

    #[test]
    fn each_added_block_claimed_once() {
        let left = parse(
            "common run alpha beta gamma delta epsilon one\n\ncommon run alpha beta gamma delta epsilon two\n",
        );
        let right = parse("common run alpha beta gamma delta epsilon three\n");
        let pairs = vec![
            create_removed_pair(&left[0]),
            create_removed_pair(&left[1]),
            create_added_pair(&right[0]),
        ];
        let repaired = pair_unmatched_blocks(pairs, &Config::default());
        assert_eq!(statuses(&repaired), vec!["modified", "removed"]);
    }

    #[test]
    fn loose_level_lowers_the_bar() {
        let left = parse("they kept the old garden gate painted blue\n");
        let right = parse("we kept the old garden style painted red\n");
        let pairs = vec![create_removed_pair(&left[0]), create_added_pair(&right[0])];
        let strict = pair_unmatched_blocks(
            pairs.clone(),
            &Config {
                matching_level: crate::config::MatchingLevel::Strict,
                debug: false,
            },
        );
        assert_eq!(statuses(&strict), vec!["removed", "added"]);
        let loose = pair_unmatched_blocks(
            pairs,
            &Config {
                matching_level: crate::config::MatchingLevel::Loose,
                debug: false,
            },
        );
        assert_eq!(statuses(&loose), vec!["modified"]);
    }
}
