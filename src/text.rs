//! Word tokenisation and text predicates.

/// A word plus the raw slice it came from, trailing whitespace included.
///
/// Joining `raw` over a token sequence reproduces the input exactly; leading
/// whitespace of the input is attached to the first token's `raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    /// The non-whitespace run.
    pub word: String,
    /// The original slice: the word plus any whitespace that followed it.
    pub raw: String,
}

/// Split text into words, each carrying its trailing whitespace.
pub fn tokenize(text: &str) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    let body = text.trim_start();
    let lead = &text[..text.len() - body.len()];

    let mut rest = body;
    while !rest.is_empty() {
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let raw_end = rest[word_end..]
            .find(|c: char| !c.is_whitespace())
            .map(|i| word_end + i)
            .unwrap_or(rest.len());
        tokens.push(WordToken {
            word: rest[..word_end].to_string(),
            raw: rest[..raw_end].to_string(),
        });
        rest = &rest[raw_end..];
    }

    if !lead.is_empty() {
        match tokens.first_mut() {
            Some(first) => first.raw.insert_str(0, lead),
            None => tokens.push(WordToken {
                word: String::new(),
                raw: lead.to_string(),
            }),
        }
    }
    tokens
}

/// Concatenate the raw slices back into the original text.
pub fn join_tokens(tokens: &[WordToken]) -> String {
    tokens.iter().map(|t| t.raw.as_str()).collect()
}

const LEADING_TRIM: &[char] = &['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', '(', '[', '{', '<'];
const TRAILING_TRIM: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', ')', ']', '}', '>', '\u{201c}', '\u{201d}',
    '\u{2018}', '\u{2019}',
];

/// Lowercase a word and strip leading quotes/brackets and trailing punctuation.
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase()
        .trim_start_matches(LEADING_TRIM)
        .trim_end_matches(TRAILING_TRIM)
        .to_string()
}

/// True when the string contains no alphanumeric characters.
pub fn is_pure_punctuation(s: &str) -> bool {
    s.chars().all(|c| !c.is_alphanumeric())
}

/// Sentence separators used when scoring diff boundaries.
pub fn is_separator_char(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
}

/// Function words eligible for absorption when they appear as equal islands
/// between changes. Checked against normalised words.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "to", "of", "in", "for",
    "on", "at", "by", "with", "from", "as", "and", "or", "but", "not", "no", "nor", "it", "its",
    "we", "he", "she", "they", "this", "that", "these", "those", "has", "have", "had", "do",
    "does", "did",
];

/// True when a normalised word is on the stop-word list.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// True when two raw words are equal after lowercasing but not equal as-is.
pub fn is_minor_case_variant(a: &str, b: &str) -> bool {
    a != b && a.to_lowercase() == b.to_lowercase()
}
