//! Text normalization for fuzzy comparison.
//!
//! Both engines disagree on punctuation, spacing, and casing, so all
//! similarity math runs over a canonical form. The normalizer keeps a
//! position map back into the original string so accepted matches can be
//! cut out of the punctuated text, not the flattened one.
//!
//! All positions in this module are **char** offsets, never bytes.

use regex::Regex;
use std::sync::OnceLock;

/// A normalized view of a string with a reversible position mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedText {
    /// The canonical text: punctuation/whitespace removed, lower-cased.
    pub text: String,
    /// `index_map[k]` is the original char offset of the k-th retained char.
    pub index_map: Vec<usize>,
    /// Char length of the original string (end-of-string sentinel).
    pub original_len: usize,
}

impl NormalizedText {
    /// Char length of the normalized text.
    pub fn len(&self) -> usize {
        self.index_map.len()
    }

    /// Whether nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }

    /// Map a normalized char position back to an original char position.
    ///
    /// Positions at or past the end of the normalized text map to the
    /// original string's length.
    pub fn map_to_original(&self, pos: usize) -> usize {
        self.index_map.get(pos).copied().unwrap_or(self.original_len)
    }
}

/// Characters stripped during normalization: whitespace plus the common
/// CJK and Latin punctuation both engines sprinkle differently.
fn is_filtered(c: char) -> bool {
    if c.is_whitespace() {
        return true;
    }
    matches!(
        c,
        '，' | '。' | '！' | '？' | '、' | '：' | '；' | '“' | '”' | '‘' | '’' | '（' | '）'
            | '【' | '】' | '《' | '》' | '…' | '—' | ',' | '.' | '!' | '?' | ';' | ':' | '\''
            | '"' | '(' | ')' | '[' | ']' | '{' | '}'
    )
}

/// Normalize a string for fuzzy comparison.
///
/// Removes punctuation/whitespace/control characters and lower-cases,
/// recording the original char offset of every retained character.
/// `normalize("")` yields an empty text with an empty map.
pub fn normalize(s: &str) -> NormalizedText {
    let mut text = String::new();
    let mut index_map = Vec::new();
    let mut original_len = 0;

    for (idx, c) in s.chars().enumerate() {
        original_len = idx + 1;
        if is_filtered(c) {
            continue;
        }
        for lower in c.to_lowercase() {
            text.push(lower);
            index_map.push(idx);
        }
    }

    NormalizedText {
        text,
        index_map,
        original_len,
    }
}

fn emoji_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            "[",
            "\u{1F600}-\u{1F64F}", // emoticons
            "\u{1F300}-\u{1F5FF}", // symbols and pictographs
            "\u{1F680}-\u{1F6FF}", // transport and map symbols
            "\u{1F1E0}-\u{1F1FF}", // flags
            "\u{2700}-\u{27BF}",   // dingbats
            "\u{1F900}-\u{1F9FF}", // supplemental symbols
            "\u{1FA00}-\u{1FA6F}", // extended symbols A
            "\u{1FA70}-\u{1FAFF}", // extended symbols B
            "\u{2600}-\u{26FF}",   // miscellaneous symbols
            "]+",
        ))
        .expect("emoji pattern is valid")
    })
}

/// Remove emoji, keeping punctuation and text (including CJK).
pub fn strip_emoji(text: &str) -> String {
    emoji_pattern().replace_all(text, "").trim().to_string()
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<\s*\|[^|]*\|\s*>").expect("tag pattern is valid"))
}

fn whitespace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Remove `<|...|>` engine markup and collapse runs of whitespace.
///
/// High-fidelity engines emit inline event/language tags in this shape;
/// only plain text goes into the aligner.
pub fn strip_engine_tags(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = tag_pattern().replace_all(text, "");
    whitespace_pattern()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Char length of a string.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Slice a string by char offsets, clamped to the string's length.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let mut indices = s.char_indices().map(|(i, _)| i);
    let byte_start = match indices.nth(start) {
        Some(i) => i,
        None => return "",
    };
    let byte_end = s
        .char_indices()
        .map(|(i, _)| i)
        .nth(end)
        .unwrap_or(s.len());
    &s[byte_start..byte_end]
}

/// The first `n` chars of a string.
pub fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// The suffix of a string starting at char offset `n`.
pub fn char_suffix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[i..],
        None => "",
    }
}
