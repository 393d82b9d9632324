//! Paragraph split detection.
//!
//! A source block that became two adjacent right-side blocks shows up after
//! alignment as a modified pair plus an added pair. When joining the two
//! right-side texts reproduces the source almost exactly, the two pairs
//! collapse into a single split pair.

use log::debug;

use crate::ast::block_to_text;
use crate::config::{Config, SPLIT_SIMILARITY};
use crate::pairs::{DiffPair, create_split_pair};
use crate::similarity::dice;

/// Pipeline stage: collapse `added + modified` and `modified + added`
/// neighbours into split pairs.
pub fn detect_paragraph_splits<'a>(
    pairs: Vec<DiffPair<'a>>,
    _config: &Config,
) -> Vec<DiffPair<'a>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        if i + 1 < pairs.len() {
            // added(X) then modified(L, R): X is the first half of L.
            if let (
                DiffPair::Added { right: x, .. },
                DiffPair::Modified { left: l, right: r, .. },
            ) = (&pairs[i], &pairs[i + 1])
            {
                let joined = format!("{} {}", block_to_text(x), block_to_text(r));
                if dice(&joined, &block_to_text(l)) > SPLIT_SIMILARITY {
                    debug!("split: added block merges with following modified pair");
                    out.push(create_split_pair(*l, *x, *r));
                    i += 2;
                    continue;
                }
            }
            // modified(L, R) then added(X): X is the second half of L.
            if let (
                DiffPair::Modified { left: l, right: r, .. },
                DiffPair::Added { right: x, .. },
            ) = (&pairs[i], &pairs[i + 1])
            {
                let joined = format!("{} {}", block_to_text(r), block_to_text(x));
                if dice(&joined, &block_to_text(l)) > SPLIT_SIMILARITY {
                    debug!("split: modified pair merges with following added block");
                    out.push(create_split_pair(*l, *r, *x));
                    i += 2;
                    continue;
                }
            }
        }
        out.push(pairs[i].clone());
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::pairs::{create_added_pair, create_modified_pair};

    #[test]
    fn trailing_split_detected() {
        let left = parse("Alpha beta gamma. Delta epsilon zeta.\n");
        let right = parse("Alpha beta gamma.\n\nDelta epsilon zeta.\n");
        let pairs = vec![
            create_modified_pair(&left[0], &right[0]),
            create_added_pair(&right[1]),
        ];
        let out = detect_paragraph_splits(pairs, &Config::default());
        assert_eq!(out.len(), 1);
        match &out[0] {
            DiffPair::Split {
                first,
                second,
                split_point,
                ..
            } => {
                assert_eq!(block_to_text(first), "Alpha beta gamma.");
                assert_eq!(block_to_text(second), "Delta epsilon zeta.");
                assert_eq!(*split_point, 17);
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn leading_split_detected() {
        let left = parse("Alpha beta gamma. Delta epsilon zeta.\n");
        let right = parse("Alpha beta gamma.\n\nDelta epsilon zeta.\n");
        let pairs = vec![
            create_added_pair(&right[0]),
            create_modified_pair(&left[0], &right[1]),
        ];
        let out = detect_paragraph_splits(pairs, &Config::default());
        assert_eq!(out.len(), 1);
        match &out[0] {
            DiffPair::Split { first, second, .. } => {
                assert_eq!(block_to_text(first), "Alpha beta gamma.");
                assert_eq!(block_to_text(second), "Delta epsilon zeta.");
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_added_block_is_not_a_split() {
        let left = parse("Alpha beta gamma. Delta epsilon zeta.\n");
        let right = parse("Alpha beta gamma. Delta epsilon zeta mostly.\n\nWholly new closing remarks.\n");
        let pairs = vec![
            create_modified_pair(&left[0], &right[0]),
            create_added_pair(&right[1]),
        ];
        let out = detect_paragraph_splits(pairs, &Config::default());
        let statuses: Vec<&str> = out.iter().map(|p| p.status()).collect();
        assert_eq!(statuses, vec!["modified", "added"]);
    }
}
