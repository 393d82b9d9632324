//! Longest-common-subsequence engines.
//!
//! Three variants serve the pipeline: a generic LCS over arbitrary equality
//! (word and character diffs), a similarity-weighted LCS over block pairs,
//! and an anchor search that extracts all long common word runs.

use crate::config::{EXACT_MATCH_THRESHOLD, MIN_ANCHOR_RUN};
use crate::pairs::BlockMatch;
use crate::similarity::{WordRun, longest_common_run_normalized};
use crate::text::WordToken;

/// One step of an LCS alignment, carrying indices into the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcsOp {
    /// `old[i]` aligns with `new[j]`.
    Equal(usize, usize),
    /// `old[i]` has no counterpart.
    Remove(usize),
    /// `new[j]` has no counterpart.
    Add(usize),
}

/// LCS-based sequence diff under a caller-supplied equality.
pub fn lcs_ops_by<T>(old: &[T], new: &[T], eq: impl Fn(&T, &T) -> bool) -> Vec<LcsOp> {
    let m = old.len();
    let n = new.len();

    // Build LCS table
    let mut table = vec![vec![0u32; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            if eq(&old[i - 1], &new[j - 1]) {
                table[i][j] = table[i - 1][j - 1] + 1;
            } else {
                table[i][j] = table[i - 1][j].max(table[i][j - 1]);
            }
        }
    }

    // Backtrack
    let mut ops = Vec::new();
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && eq(&old[i - 1], &new[j - 1]) {
            ops.push(LcsOp::Equal(i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            ops.push(LcsOp::Add(j - 1));
            j -= 1;
        } else {
            ops.push(LcsOp::Remove(i - 1));
            i -= 1;
        }
    }
    ops.reverse();
    ops
}

/// Similarity-weighted LCS over a precomputed block similarity matrix.
///
/// `dp[i][j]` holds the maximum total score over alignments of the suffixes
/// `left[i..]` and `right[j..]`; a pair scores `1 + sim` when its similarity
/// reaches `threshold`. The traceback emits a strictly increasing match list.
pub fn weighted_lcs(sim: &[Vec<f64>], threshold: f64) -> Vec<BlockMatch> {
    let m = sim.len();
    let n = if m > 0 { sim[0].len() } else { 0 };
    if m == 0 || n == 0 {
        return Vec::new();
    }

    let mut dp = vec![vec![0f64; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            let skip = dp[i + 1][j].max(dp[i][j + 1]);
            dp[i][j] = if sim[i][j] >= threshold {
                (dp[i + 1][j + 1] + 1.0 + sim[i][j]).max(skip)
            } else {
                skip
            };
        }
    }

    let mut matches = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < m && j < n {
        if sim[i][j] >= threshold && dp[i][j] == dp[i + 1][j + 1] + 1.0 + sim[i][j] {
            matches.push(BlockMatch {
                left: i,
                right: j,
                exact: sim[i][j] > EXACT_MATCH_THRESHOLD,
            });
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    matches
}

/// All non-overlapping common word runs of length >= [`MIN_ANCHOR_RUN`],
/// longest-first, returned left-to-right.
///
/// Word equality is normalised; the regions left and right of the best run
/// are searched recursively.
pub fn anchor_runs(a: &[WordToken], b: &[WordToken]) -> Vec<WordRun> {
    let mut runs = Vec::new();
    collect_anchors(a, b, 0, 0, &mut runs);
    runs
}

fn collect_anchors(a: &[WordToken], b: &[WordToken], a_off: usize, b_off: usize, out: &mut Vec<WordRun>) {
    let run = longest_common_run_normalized(a, b);
    if run.len < MIN_ANCHOR_RUN {
        return;
    }
    collect_anchors(&a[..run.ai], &b[..run.bi], a_off, b_off, out);
    out.push(WordRun {
        ai: a_off + run.ai,
        bi: b_off + run.bi,
        len: run.len,
    });
    collect_anchors(
        &a[run.ai + run.len..],
        &b[run.bi + run.len..],
        a_off + run.ai + run.len,
        b_off + run.bi + run.len,
        out,
    );
}
