//! Declarative rewrite rules for inline-diff part sequences.
//!
//! A rule is a pattern of part kinds plus a condition and a transform. The
//! engine scans the part list; at each index the first rule whose pattern
//! prefix-matches and whose condition holds is applied, and scanning resumes
//! after the emitted replacement, so a transform cannot loop on its own
//! output within one pass. [`apply_rules_until_stable`] repeats passes until
//! a fixed point or the iteration cap.

use crate::inline::{InlinePart, PartKind};
use crate::text::{is_stop_word, normalize_word, tokenize};

/// Default pass cap for [`apply_rules_until_stable`]. The standard rules
/// strictly shrink the part list, so realistic inputs converge well before
/// this bound.
pub const MAX_RULE_PASSES: usize = 10;

const LARGE_CHANGE_MIN_WORDS: usize = 3;

/// Part kind requirement at one pattern position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Equal,
    Removed,
    Added,
    /// Either removed or added.
    Change,
}

impl PatternKind {
    fn matches(self, part: &InlinePart) -> bool {
        match self {
            PatternKind::Equal => part.kind == PartKind::Equal,
            PatternKind::Removed => part.kind == PartKind::Removed,
            PatternKind::Added => part.kind == PartKind::Added,
            PatternKind::Change => part.kind != PartKind::Equal,
        }
    }
}

/// Surrounding parts available to a rule condition.
pub struct RuleContext<'a> {
    /// The full part list being scanned.
    pub parts: &'a [InlinePart],
    /// Index of the matched window's first part.
    pub index: usize,
}

/// A single rewrite rule. Rules are plain data so new absorption behaviours
/// can be added without touching the engine.
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: &'static [PatternKind],
    pub condition: fn(&[InlinePart], &RuleContext<'_>) -> bool,
    pub transform: fn(&[InlinePart]) -> Vec<InlinePart>,
}

/// One scan pass. Rules are tried in list order at each index.
pub fn apply_rules(mut parts: Vec<InlinePart>, rules: &[RewriteRule]) -> Vec<InlinePart> {
    let mut i = 0;
    while i < parts.len() {
        let mut applied = false;
        for rule in rules {
            let plen = rule.pattern.len();
            if plen == 0 || i + plen > parts.len() {
                continue;
            }
            let window = &parts[i..i + plen];
            if !rule.pattern.iter().zip(window).all(|(k, p)| k.matches(p)) {
                continue;
            }
            let ctx = RuleContext {
                parts: &parts,
                index: i,
            };
            if !(rule.condition)(window, &ctx) {
                continue;
            }
            let replacement = (rule.transform)(window);
            let advance = replacement.len();
            parts.splice(i..i + plen, replacement);
            i += advance;
            applied = true;
            break;
        }
        if !applied {
            i += 1;
        }
    }
    parts
}

/// Apply passes until the list stops changing or `max_passes` is reached.
pub fn apply_rules_until_stable(
    parts: Vec<InlinePart>,
    rules: &[RewriteRule],
    max_passes: usize,
) -> Vec<InlinePart> {
    let mut current = parts;
    for _ in 0..max_passes {
        let next = apply_rules(current.clone(), rules);
        if next == current {
            return next;
        }
        current = next;
    }
    current
}

/// The standard rule set: stop-word noise suppression.
pub fn standard_rules() -> &'static [RewriteRule] {
    &STANDARD_RULES
}

static STANDARD_RULES: [RewriteRule; 3] = [
    RewriteRule {
        name: "absorb-equal-stop-words",
        pattern: &[PatternKind::Change, PatternKind::Equal, PatternKind::Change],
        condition: stop_word_island_condition,
        transform: merge_equal_into_flanks,
    },
    RewriteRule {
        name: "absorb-single-word-large-changes",
        pattern: &[PatternKind::Change, PatternKind::Equal, PatternKind::Change],
        condition: single_word_island_condition,
        transform: merge_equal_into_flanks,
    },
    RewriteRule {
        name: "absorb-minor-stop-word-pair",
        pattern: &[
            PatternKind::Removed,
            PatternKind::Added,
            PatternKind::Removed,
            PatternKind::Added,
        ],
        condition: minor_stop_pair_condition,
        transform: merge_minor_stop_pair,
    },
];

/// A leaf change that rules may grow or merge without losing structure.
fn is_plain_change(part: &InlinePart) -> bool {
    part.is_change() && !part.minor && part.children.is_empty()
}

fn word_count(part: &InlinePart) -> usize {
    tokenize(&part.value).len()
}

fn is_stop_word_only(part: &InlinePart) -> bool {
    let tokens = tokenize(&part.value);
    !tokens.is_empty()
        && tokens
            .iter()
            .all(|t| is_stop_word(&normalize_word(&t.word)))
}

/// An equal part carrying at least one real (non-stop-word) word.
fn is_meaningful_equal(part: &InlinePart) -> bool {
    part.kind == PartKind::Equal
        && tokenize(&part.value).iter().any(|t| {
            let w = normalize_word(&t.word);
            !w.is_empty() && !is_stop_word(&w)
        })
}

/// Walk outward from a window edge, past at most one change group partner,
/// and report whether the first equal found carries a real word.
fn meaningful_equal_nearby(parts: &[InlinePart], start: Option<usize>, forward: bool) -> bool {
    let mut i = start;
    for _ in 0..2 {
        let Some(idx) = i else { return false };
        let Some(part) = parts.get(idx) else {
            return false;
        };
        if part.kind == PartKind::Equal {
            return is_meaningful_equal(part);
        }
        i = if forward { idx.checked_add(1) } else { idx.checked_sub(1) };
    }
    false
}

/// The flanking changes must differ in type so the island's text can live on
/// both sides of the merged diff.
fn stop_word_island_condition(window: &[InlinePart], ctx: &RuleContext<'_>) -> bool {
    let (c1, island, c2) = (&window[0], &window[1], &window[2]);
    if !is_plain_change(c1) || !is_plain_change(c2) || c1.kind == c2.kind {
        return false;
    }
    if !is_stop_word_only(island) {
        return false;
    }
    // Retain the island when a meaningful equal sits within one change
    // position on either side.
    let meaningful_before =
        meaningful_equal_nearby(ctx.parts, ctx.index.checked_sub(1), false);
    let meaningful_after = meaningful_equal_nearby(ctx.parts, Some(ctx.index + 3), true);
    !(meaningful_before || meaningful_after)
}

fn single_word_island_condition(window: &[InlinePart], _ctx: &RuleContext<'_>) -> bool {
    let (c1, island, c2) = (&window[0], &window[1], &window[2]);
    is_plain_change(c1)
        && is_plain_change(c2)
        && c1.kind != c2.kind
        && word_count(island) == 1
        && word_count(c1) >= LARGE_CHANGE_MIN_WORDS
        && word_count(c2) >= LARGE_CHANGE_MIN_WORDS
}

/// Append the island to the left change and prepend it to the right change.
/// The two changes have opposite types, so each document side still reads
/// the island exactly once, in order.
fn merge_equal_into_flanks(window: &[InlinePart]) -> Vec<InlinePart> {
    let mut first = window[0].clone();
    first.value.push_str(&window[1].value);
    let mut second = window[2].clone();
    second.value.insert_str(0, &window[1].value);
    vec![first, second]
}

/// A minor removed/added pair whose single word is a stop word on both sides.
fn is_minor_stop_pair(removed: &InlinePart, added: &InlinePart) -> bool {
    removed.minor && added.minor && is_single_stop_word(removed) && is_single_stop_word(added)
}

fn is_single_stop_word(part: &InlinePart) -> bool {
    let tokens = tokenize(&part.value);
    tokens.len() == 1 && is_stop_word(&normalize_word(&tokens[0].word))
}

fn minor_stop_pair_condition(window: &[InlinePart], _ctx: &RuleContext<'_>) -> bool {
    let first_pair_minor = is_minor_stop_pair(&window[0], &window[1]);
    let second_pair_minor = is_minor_stop_pair(&window[2], &window[3]);
    (first_pair_minor && is_plain_change(&window[2]) && is_plain_change(&window[3]))
        || (second_pair_minor && is_plain_change(&window[0]) && is_plain_change(&window[1]))
}

/// Fold the minor pair into the adjacent non-minor changes, dropping its
/// minor flag and character children.
fn merge_minor_stop_pair(window: &[InlinePart]) -> Vec<InlinePart> {
    vec![
        InlinePart::removed(format!("{}{}", window[0].value, window[2].value)),
        InlinePart::added(format!("{}{}", window[1].value, window[3].value)),
    ]
}
