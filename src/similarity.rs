//! Text similarity metrics: bigram Dice, common word runs, set overlap.

use std::collections::{HashMap, HashSet};

use crate::text::{WordToken, normalize_word, tokenize};

/// A contiguous word run shared by two token slices.
///
/// `a[ai..ai + len]` matches `b[bi..bi + len]` word-by-word, possibly under
/// normalisation depending on which search produced the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordRun {
    pub ai: usize,
    pub bi: usize,
    pub len: usize,
}

/// Dice coefficient over character bigram multisets.
///
/// Returns 1 for identical strings and 0 when either string is shorter than
/// two characters. Symmetric in its arguments.
pub fn dice(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.len() < 2 || b_chars.len() < 2 {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), u32> = HashMap::new();
    for w in a_chars.windows(2) {
        *counts.entry((w[0], w[1])).or_insert(0) += 1;
    }
    let mut intersection = 0usize;
    for w in b_chars.windows(2) {
        if let Some(count) = counts.get_mut(&(w[0], w[1])) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    let total = (a_chars.len() - 1) + (b_chars.len() - 1);
    2.0 * intersection as f64 / total as f64
}

fn longest_run_by_keys(a: &[&str], b: &[&str]) -> WordRun {
    let mut best = WordRun::default();
    if a.is_empty() || b.is_empty() {
        return best;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                curr[j] = prev[j - 1] + 1;
                if curr[j] > best.len {
                    best = WordRun {
                        ai: i - curr[j],
                        bi: j - curr[j],
                        len: curr[j],
                    };
                }
            } else {
                curr[j] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.fill(0);
    }
    best
}

/// Longest contiguous run of exactly-equal words.
pub fn longest_common_run(a: &[WordToken], b: &[WordToken]) -> WordRun {
    let a_keys: Vec<&str> = a.iter().map(|t| t.word.as_str()).collect();
    let b_keys: Vec<&str> = b.iter().map(|t| t.word.as_str()).collect();
    longest_run_by_keys(&a_keys, &b_keys)
}

/// Longest contiguous run of words equal under [`normalize_word`].
pub fn longest_common_run_normalized(a: &[WordToken], b: &[WordToken]) -> WordRun {
    let a_norm: Vec<String> = a.iter().map(|t| normalize_word(&t.word)).collect();
    let b_norm: Vec<String> = b.iter().map(|t| normalize_word(&t.word)).collect();
    let a_keys: Vec<&str> = a_norm.iter().map(String::as_str).collect();
    let b_keys: Vec<&str> = b_norm.iter().map(String::as_str).collect();
    longest_run_by_keys(&a_keys, &b_keys)
}

/// Size of the intersection of normalised word sets.
pub fn shared_unique_words(a: &[WordToken], b: &[WordToken]) -> usize {
    let a_set: HashSet<String> = a
        .iter()
        .map(|t| normalize_word(&t.word))
        .filter(|w| !w.is_empty())
        .collect();
    b.iter()
        .map(|t| normalize_word(&t.word))
        .filter(|w| !w.is_empty())
        .collect::<HashSet<_>>()
        .intersection(&a_set)
        .count()
}

/// All four similarity metrics from a single tokenisation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSimilarity {
    /// Bigram Dice coefficient of the raw strings.
    pub dice: f64,
    /// Longest contiguous run of exactly-equal words.
    pub common_run: usize,
    /// Longest contiguous run of normalised-equal words.
    pub common_run_normalized: usize,
    /// Number of distinct normalised words shared by both texts.
    pub shared_words: usize,
}

/// Compute [`TextSimilarity`] for two texts.
pub fn compute_text_similarity(a: &str, b: &str) -> TextSimilarity {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);
    TextSimilarity {
        dice: dice(a, b),
        common_run: longest_common_run(&a_tokens, &b_tokens).len,
        common_run_normalized: longest_common_run_normalized(&a_tokens, &b_tokens).len,
        shared_words: shared_unique_words(&a_tokens, &b_tokens),
    }
}
