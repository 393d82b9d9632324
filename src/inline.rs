//! Word- and character-level inline diff for modified block pairs.
//!
//! The diff is a flat list of [`InlinePart`]s: concatenating the values of
//! removed-plus-equal parts reproduces the left text, added-plus-equal the
//! right text. Word pairs that differ only cosmetically (case, punctuation)
//! come out as a minor removed/added pair whose children hold the
//! character-level diff between the two words.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::boundary::{absorb_short_matches, optimize_boundaries};
use crate::lcs::{LcsOp, anchor_runs, lcs_ops_by};
use crate::rules::{MAX_RULE_PASSES, apply_rules_until_stable, standard_rules};
use crate::text::{WordToken, is_pure_punctuation, normalize_word, tokenize};

/// Classification of an inline diff part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Equal,
    Added,
    Removed,
}

/// One segment of an inline diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePart {
    pub kind: PartKind,
    pub value: String,
    /// Cosmetic edit (case-only or pure punctuation); may be visually demoted.
    pub minor: bool,
    /// Nested parts. For a minor word pair this is the character-level diff
    /// of that side; for an absorbed short match, the original three parts.
    /// The part's value always equals the concatenation of child values.
    pub children: Vec<InlinePart>,
}

impl InlinePart {
    pub fn new(kind: PartKind, value: impl Into<String>) -> Self {
        InlinePart {
            kind,
            value: value.into(),
            minor: false,
            children: Vec::new(),
        }
    }

    pub fn equal(value: impl Into<String>) -> Self {
        Self::new(PartKind::Equal, value)
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self::new(PartKind::Added, value)
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self::new(PartKind::Removed, value)
    }

    pub fn minor(mut self) -> Self {
        self.minor = true;
        self
    }

    pub fn with_children(mut self, children: Vec<InlinePart>) -> Self {
        self.children = children;
        self
    }

    /// True for removed and added parts.
    pub fn is_change(&self) -> bool {
        self.kind != PartKind::Equal
    }
}

/// Internal-space stand-in that keeps protected markdown spans atomic
/// through word tokenisation.
const SPACE_SENTINEL: char = '\u{1}';

static STRONG_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*").unwrap());
static EMPHASIS_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*[^*\s][^*]*\*").unwrap());
static STRONG_WRAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static EMPHASIS_WRAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());

/// Diff two texts into inline parts.
///
/// Long common word runs anchor the alignment; the residues between anchors
/// are diffed word-by-word under normalisation, boundary-optimised, and then
/// rewritten to a fixed point by the standard rule set.
pub fn compute_inline_diff(left: &str, right: &str) -> Vec<InlinePart> {
    if left.is_empty() && right.is_empty() {
        return Vec::new();
    }
    if left == right {
        return vec![InlinePart::equal(left)];
    }
    if left.is_empty() {
        return vec![InlinePart::added(right)];
    }
    if right.is_empty() {
        return vec![InlinePart::removed(left)];
    }

    let protected_left = protect_markdown(left);
    let protected_right = protect_markdown(right);
    let a = tokenize(&protected_left);
    let b = tokenize(&protected_right);

    let mut builder = PartBuilder::default();
    let mut ai = 0;
    let mut bi = 0;
    for run in anchor_runs(&a, &b) {
        diff_words(&a[ai..run.ai], &b[bi..run.bi], &mut builder);
        for k in 0..run.len {
            builder.push_aligned(&a[run.ai + k], &b[run.bi + k]);
        }
        ai = run.ai + run.len;
        bi = run.bi + run.len;
    }
    diff_words(&a[ai..], &b[bi..], &mut builder);
    let mut parts = builder.finish();

    optimize_boundaries(&mut parts);
    absorb_short_matches(&mut parts);
    let parts = apply_rules_until_stable(parts, standard_rules(), MAX_RULE_PASSES);
    restore_markdown(parts)
}

/// Word-level LCS over a residue between anchors.
fn diff_words(a: &[WordToken], b: &[WordToken], out: &mut PartBuilder) {
    if a.is_empty() && b.is_empty() {
        return;
    }
    let a_norm: Vec<String> = a.iter().map(|t| normalize_word(&t.word)).collect();
    let b_norm: Vec<String> = b.iter().map(|t| normalize_word(&t.word)).collect();
    for op in lcs_ops_by(&a_norm, &b_norm, |x, y| x == y) {
        match op {
            LcsOp::Equal(i, j) => out.push_aligned(&a[i], &b[j]),
            LcsOp::Remove(i) => out.push_removed(&a[i]),
            LcsOp::Add(j) => out.push_added(&b[j]),
        }
    }
}

/// Accumulates tokens into parts, grouping consecutive same-type words.
#[derive(Default)]
struct PartBuilder {
    parts: Vec<InlinePart>,
    equal_run: String,
    removed_run: String,
    added_run: String,
}

impl PartBuilder {
    /// A word pair aligned by normalisation: plain equal when the raw words
    /// agree, otherwise a minor pair with character-level children.
    fn push_aligned(&mut self, l: &WordToken, r: &WordToken) {
        if l.raw == r.raw {
            self.flush_changes();
            self.equal_run.push_str(&l.raw);
        } else if l.word == r.word
            && let (Some(l_ws), Some(r_ws)) =
                (l.raw.strip_prefix(&l.word), r.raw.strip_prefix(&r.word))
        {
            // Same word, differing trailing whitespace. The word stays equal;
            // the whitespace delta is tracked so both sides reconstruct.
            self.flush_changes();
            self.equal_run.push_str(&l.word);
            if l_ws == r_ws {
                self.equal_run.push_str(l_ws);
            } else {
                self.flush_equal();
                self.removed_run.push_str(l_ws);
                self.added_run.push_str(r_ws);
            }
        } else {
            self.flush_equal();
            self.flush_changes();
            let (removed_children, added_children) = char_diff_children(&l.raw, &r.raw);
            self.parts.push(
                InlinePart::removed(&l.raw)
                    .minor()
                    .with_children(removed_children),
            );
            self.parts.push(
                InlinePart::added(&r.raw)
                    .minor()
                    .with_children(added_children),
            );
        }
    }

    fn push_removed(&mut self, token: &WordToken) {
        self.flush_equal();
        self.removed_run.push_str(&token.raw);
    }

    fn push_added(&mut self, token: &WordToken) {
        self.flush_equal();
        self.added_run.push_str(&token.raw);
    }

    fn flush_equal(&mut self) {
        if !self.equal_run.is_empty() {
            self.parts
                .push(InlinePart::equal(std::mem::take(&mut self.equal_run)));
        }
    }

    fn flush_changes(&mut self) {
        if !self.removed_run.is_empty() {
            let mut part = InlinePart::removed(std::mem::take(&mut self.removed_run));
            if is_pure_punctuation(&part.value) {
                part = part.minor();
            }
            self.parts.push(part);
        }
        if !self.added_run.is_empty() {
            let mut part = InlinePart::added(std::mem::take(&mut self.added_run));
            if is_pure_punctuation(&part.value) {
                part = part.minor();
            }
            self.parts.push(part);
        }
    }

    fn finish(mut self) -> Vec<InlinePart> {
        self.flush_equal();
        self.flush_changes();
        self.parts
    }
}

/// Character-level diff between the two words of a minor pair.
///
/// Returns the children for the removed side (equal + removed characters,
/// concatenating to `left`) and for the added side (equal + added characters,
/// concatenating to `right`).
fn char_diff_children(left: &str, right: &str) -> (Vec<InlinePart>, Vec<InlinePart>) {
    let l: Vec<char> = left.chars().collect();
    let r: Vec<char> = right.chars().collect();
    let mut removed = CharGrouper::default();
    let mut added = CharGrouper::default();
    for op in lcs_ops_by(&l, &r, |a, b| a == b) {
        match op {
            LcsOp::Equal(i, _) => {
                removed.push(PartKind::Equal, l[i]);
                added.push(PartKind::Equal, l[i]);
            }
            LcsOp::Remove(i) => removed.push(PartKind::Removed, l[i]),
            LcsOp::Add(j) => added.push(PartKind::Added, r[j]),
        }
    }
    (removed.finish(), added.finish())
}

/// Groups a character stream into runs of the same part kind.
#[derive(Default)]
struct CharGrouper {
    parts: Vec<InlinePart>,
    kind: Option<PartKind>,
    buf: String,
}

impl CharGrouper {
    fn push(&mut self, kind: PartKind, c: char) {
        if self.kind != Some(kind) {
            self.flush();
            self.kind = Some(kind);
        }
        self.buf.push(c);
    }

    fn flush(&mut self) {
        if let Some(kind) = self.kind.take() {
            if !self.buf.is_empty() {
                self.parts
                    .push(InlinePart::new(kind, std::mem::take(&mut self.buf)));
            }
        }
    }

    fn finish(mut self) -> Vec<InlinePart> {
        self.flush();
        self.parts
    }
}

/// Encode internal spaces of `**bold**` and `*italic*` spans so the spans
/// survive word tokenisation as single tokens.
fn protect_markdown(text: &str) -> String {
    let sentinel = SPACE_SENTINEL.to_string();
    let strong = STRONG_SPAN.replace_all(text, |caps: &Captures<'_>| {
        caps[0].replace(' ', &sentinel)
    });
    EMPHASIS_SPAN
        .replace_all(&strong, |caps: &Captures<'_>| caps[0].replace(' ', &sentinel))
        .into_owned()
}

/// Re-expand sentinels in part values and children.
fn restore_markdown(parts: Vec<InlinePart>) -> Vec<InlinePart> {
    parts.into_iter().map(restore_part).collect()
}

fn restore_part(mut part: InlinePart) -> InlinePart {
    if part.value.contains(SPACE_SENTINEL) {
        part.value = part.value.replace(SPACE_SENTINEL, " ");
    }
    part.children = part.children.into_iter().map(restore_part).collect();
    part
}

/// Rewrap markdown markers in a part value as HTML for renderers:
/// `**bold**` becomes `<strong>bold</strong>`, `*italic*` becomes
/// `<em>italic</em>`. Part values themselves keep the raw markers so that
/// value concatenation reproduces the serialised block texts.
pub fn render_html_value(value: &str) -> String {
    let strong = STRONG_WRAP.replace_all(value, "<strong>$1</strong>");
    EMPHASIS_WRAP.replace_all(&strong, "<em>$1</em>").into_owned()
}
