//! Cross-block move detection.
//!
//! Long removed segments from modified pairs are matched against added text
//! elsewhere. On a match the source pair's inline diff is recomputed with
//! the destination's text virtually appended to the right side, so the
//! moved run re-emerges as equal; the destination collapses to a paragraph
//! indicator (when it was a purely added block) or has its matching added
//! parts downgraded to equal (when it was modified).

use std::collections::HashMap;

use log::debug;

use crate::ast::block_to_text;
use crate::config::{Config, MIN_SEGMENT_LENGTH_FOR_MOVED, MIN_SHARED_FOR_MOVED};
use crate::inline::{InlinePart, PartKind, compute_inline_diff};
use crate::pairs::DiffPair;
use crate::similarity::longest_common_run_normalized;
use crate::text::tokenize;

/// A candidate segment for move matching.
struct MoveSegment {
    pair_idx: usize,
    text: String,
}

fn shared_run(a: &str, b: &str) -> usize {
    longest_common_run_normalized(&tokenize(a), &tokenize(b)).len
}

/// Pipeline stage: find text runs that left one block and appeared in
/// another, and rewrite both pairs involved.
pub fn detect_moved_text<'a>(pairs: Vec<DiffPair<'a>>, _config: &Config) -> Vec<DiffPair<'a>> {
    let mut pairs = pairs;

    let mut sources: Vec<MoveSegment> = Vec::new();
    let mut dests: Vec<MoveSegment> = Vec::new();
    for (idx, pair) in pairs.iter().enumerate() {
        match pair {
            DiffPair::Modified { inline, .. } => {
                for part in inline {
                    if part.minor || part.value.trim().chars().count() <= MIN_SEGMENT_LENGTH_FOR_MOVED
                    {
                        continue;
                    }
                    let segment = MoveSegment {
                        pair_idx: idx,
                        text: part.value.clone(),
                    };
                    match part.kind {
                        PartKind::Removed => sources.push(segment),
                        PartKind::Added => dests.push(segment),
                        PartKind::Equal => {}
                    }
                }
            }
            DiffPair::Added {
                right,
                indicator: None,
            } => dests.push(MoveSegment {
                pair_idx: idx,
                text: block_to_text(right),
            }),
            _ => {}
        }
    }

    // Texts virtually appended to each source pair's right side, so a pair
    // with several moved-out runs accumulates all of its destinations.
    let mut appended: HashMap<usize, Vec<String>> = HashMap::new();
    let mut dest_used = vec![false; dests.len()];
    for source in &sources {
        for (di, dest) in dests.iter().enumerate() {
            if dest_used[di] || dest.pair_idx == source.pair_idx {
                continue;
            }
            if shared_run(&source.text, &dest.text) < MIN_SHARED_FOR_MOVED {
                continue;
            }
            debug!(
                "move: pair {} lost a run that reappears in pair {}",
                source.pair_idx, dest.pair_idx
            );
            appended
                .entry(source.pair_idx)
                .or_default()
                .push(dest.text.clone());
            rewrite_source(&mut pairs[source.pair_idx], &appended[&source.pair_idx]);
            rewrite_destination(&mut pairs[dest.pair_idx], &source.text);
            dest_used[di] = true;
            break;
        }
    }

    pairs
}

/// Recompute the source pair's inline diff with every matched destination
/// text appended to the right side; the moved runs align as equal.
fn rewrite_source(pair: &mut DiffPair<'_>, appended: &[String]) {
    if let DiffPair::Modified {
        left,
        right,
        inline,
    } = pair
    {
        let mut virtual_right = block_to_text(right);
        for text in appended {
            virtual_right.push_str(" \u{b6} ");
            virtual_right.push_str(text);
        }
        *inline = compute_inline_diff(&block_to_text(left), &virtual_right);
    }
}

fn rewrite_destination(pair: &mut DiffPair<'_>, source_text: &str) {
    match pair {
        // A purely added destination collapses to a paragraph indicator;
        // its content is already shown inside the source pair.
        DiffPair::Added { indicator, .. } => {
            *indicator = Some(vec![
                InlinePart::added("\u{b6} "),
                InlinePart::equal("(content shown above)"),
            ]);
        }
        // A modified destination keeps its diff, but added parts matching
        // the moved text are demoted to equal.
        DiffPair::Modified { inline, .. } => {
            for part in inline.iter_mut() {
                if part.kind == PartKind::Added
                    && !part.minor
                    && shared_run(&part.value, source_text) >= MIN_SHARED_FOR_MOVED
                {
                    part.kind = PartKind::Equal;
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::pairs::{create_added_pair, create_modified_pair};

    const RUN: &str = "the elders recite the founding charter aloud before the assembled crowd together";

    #[test]
    fn move_into_added_block_collapses_destination() {
        let left_md = format!(
            "Later in the evening the village gathers by the fire to trade stories and {RUN}.\n"
        );
        let right_md = format!(
            "Later in the evening the village gathers by the fire to trade stories and disperses.\n\n{RUN}.\n"
        );
        let left = parse(&left_md);
        let right = parse(&right_md);
        let pairs = vec![
            create_modified_pair(&left[0], &right[0]),
            create_added_pair(&right[1]),
        ];
        let out = detect_moved_text(pairs, &Config::default());

        // Destination: indicator replaces the plain added rendering.
        match &out[1] {
            DiffPair::Added {
                indicator: Some(parts),
                ..
            } => {
                assert_eq!(parts[0], InlinePart::added("\u{b6} "));
                assert_eq!(parts[1], InlinePart::equal("(content shown above)"));
            }
            other => panic!("expected indicator on destination, got {other:?}"),
        }

        // Source: the moved run now aligns as equal text.
        let inline = out[0].inline_diff().expect("modified source pair");
        let equal_text: String = inline
            .iter()
            .filter(|p| p.kind == PartKind::Equal)
            .map(|p| p.value.as_str())
            .collect();
        assert!(
            equal_text.contains("founding charter aloud"),
            "moved run should re-emerge as equal: {inline:?}"
        );
        assert!(
            !inline
                .iter()
                .any(|p| p.kind == PartKind::Removed && p.value.contains("founding charter")),
            "moved run must no longer read as removed: {inline:?}"
        );
    }

    #[test]
    fn move_into_modified_block_demotes_added_parts() {
        let left_md = format!(
            "Opening remarks about the harvest festival stay put here untouched and {RUN}.\n\nClosing remarks thank every volunteer for their generous patient help.\n"
        );
        let right_md = format!(
            "Opening remarks about the harvest festival stay put here untouched and conclude.\n\nClosing remarks thank every volunteer, and {RUN}, for their generous patient help.\n"
        );
        let left = parse(&left_md);
        let right = parse(&right_md);
        let pairs = vec![
            create_modified_pair(&left[0], &right[0]),
            create_modified_pair(&left[1], &right[1]),
        ];
        let out = detect_moved_text(pairs, &Config::default());

        let dest_inline = out[1].inline_diff().expect("destination stays modified");
        assert!(
            !dest_inline
                .iter()
                .any(|p| p.kind == PartKind::Added && p.value.contains("founding charter")),
            "added run should be demoted to equal: {dest_inline:?}"
        );
        assert!(
            dest_inline
                .iter()
                .any(|p| p.kind == PartKind::Equal && p.value.contains("founding charter")),
            "demoted run should read as equal: {dest_inline:?}"
        );
    }

    #[test]
    fn short_segments_are_ignored() {
        let left = parse("The small note moved away from this paragraph entirely today.\n");
        let right = parse("This paragraph lost its note but keeps everything else as written today.\n\nThe small note.\n");
        let pairs = vec![
            create_modified_pair(&left[0], &right[0]),
            create_added_pair(&right[1]),
        ];
        let out = detect_moved_text(pairs, &Config::default());
        assert!(
            matches!(&out[1], DiffPair::Added { indicator: None, .. }),
            "short run must not trigger move handling: {:?}",
            out[1]
        );
    }
}
