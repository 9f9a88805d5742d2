//! Order- and distance-constrained fuzzy substring matching.
//!
//! Finds the best-matching window of the high-fidelity text for one
//! diarized unit. The caller passes only the text after its cursor (order
//! constraint); the search itself looks no further than
//! `max_search_distance` chars in (distance constraint), so one bad unit
//! cannot claim unrelated downstream text.

use super::models::MatchResult;
use super::text::{char_prefix, char_slice, normalize};
use std::collections::HashMap;

/// Similarity ratio between two char sequences, in [0, 1].
///
/// `2 * matches / (len_a + len_b)` over longest-matching-blocks, the
/// classic sequence-matcher ratio: symmetric, 1.0 for identical inputs,
/// 0.0 when nothing lines up.
pub fn similarity_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    2.0 * matching_chars(a, b) as f64 / (a.len() + b.len()) as f64
}

/// Total length of the longest-matching-blocks decomposition.
///
/// Repeatedly takes the longest common contiguous block and recurses into
/// the pieces on either side of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size > 0 {
            total += size;
            pending.push((alo, i, blo, j));
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    total
}

/// Longest contiguous match of `a[alo..ahi]` within `b[blo..bhi]`.
///
/// Returns `(a_start, b_start, size)`; earliest in `a`, then earliest in
/// `b` on ties.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(&a[i]) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j > blo {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                new_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = new_j2len;
    }

    (best_i, best_j, best_size)
}

/// Default search-distance bound for a needle of `needle_len` normalized
/// chars: three needle lengths, never less than 50 chars.
pub fn default_search_distance(needle_len: usize) -> usize {
    (needle_len * 3).max(50)
}

/// Find the best fuzzy match for `needle` within the first
/// `max_search_distance` chars of `haystack`.
///
/// The needle and the restricted haystack slice are normalized before
/// comparison; every window of length `[needle/2, needle*2]` at every
/// offset is scored and the first window with the strictly highest score
/// wins (ties keep the earliest, smallest window). Returns `None` when
/// the needle normalizes to nothing or the best score falls below
/// `min_similarity`; otherwise the match span is mapped back into
/// original-text char coordinates of the restricted slice.
pub fn fuzzy_substring_search(
    haystack: &str,
    needle: &str,
    min_similarity: f64,
    max_search_distance: Option<usize>,
) -> Option<MatchResult> {
    let needle_norm = normalize(needle);
    if needle_norm.is_empty() {
        return None;
    }
    let needle_len = needle_norm.len();

    let max_distance = max_search_distance.unwrap_or_else(|| default_search_distance(needle_len));
    let search_text = char_prefix(haystack, max_distance);
    let search_norm = normalize(search_text);
    if search_norm.is_empty() {
        return None;
    }

    let needle_chars: Vec<char> = needle_norm.text.chars().collect();
    let search_chars: Vec<char> = search_norm.text.chars().collect();

    let min_window = (needle_len / 2).max(1);
    let max_window = (needle_len * 2).min(search_chars.len());

    let mut best: Option<(usize, usize, f64)> = None;
    for window in min_window..=max_window {
        for start in 0..=search_chars.len() - window {
            let score = similarity_ratio(&needle_chars, &search_chars[start..start + window]);
            if best.map_or(true, |(_, _, b)| score > b) {
                best = Some((start, start + window, score));
            }
        }
    }

    let (start, end, similarity) = best?;
    if similarity < min_similarity {
        return None;
    }

    let original_start = search_norm.map_to_original(start);
    let original_end = search_norm.map_to_original(end);

    Some(MatchResult {
        text: char_slice(search_text, original_start, original_end).to_string(),
        start_pos: original_start,
        end_pos: original_end,
        similarity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::text::char_len;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_ratio_identical() {
        assert_eq!(similarity_ratio(&chars("今天天气"), &chars("今天天气")), 1.0);
    }

    #[test]
    fn test_ratio_disjoint() {
        assert_eq!(similarity_ratio(&chars("abcd"), &chars("wxyz")), 0.0);
    }

    #[test]
    fn test_ratio_partial() {
        // longest block "bcd" (3 chars) -> 2*3 / (4+4)
        let score = similarity_ratio(&chars("abcd"), &chars("bcde"));
        assert!((score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_empty() {
        assert_eq!(similarity_ratio(&[], &[]), 1.0);
        assert_eq!(similarity_ratio(&chars("a"), &[]), 0.0);
    }

    #[test]
    fn test_ratio_split_blocks() {
        // "ab" and "cd" both match -> 2*4 / (5+4)
        let score = similarity_ratio(&chars("abxcd"), &chars("abcd"));
        assert!((score - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_exact_with_punctuation() {
        let m = fuzzy_substring_search("今天 天气 真不错", "今天天气", 0.5, None)
            .expect("match expected");
        assert!(m.similarity >= 0.5);
        assert_eq!(m.start_pos, 0);
        assert_eq!(m.text.trim(), "今天 天气");
    }

    #[test]
    fn test_search_empty_needle() {
        assert!(fuzzy_substring_search("today it rains", "", 0.5, None).is_none());
        assert!(fuzzy_substring_search("today it rains", ", . !", 0.5, None).is_none());
    }

    #[test]
    fn test_search_empty_haystack() {
        assert!(fuzzy_substring_search("", "今天天气", 0.5, None).is_none());
    }

    #[test]
    fn test_search_below_threshold() {
        assert!(fuzzy_substring_search("完全无关的内容", "今天天气", 0.5, None).is_none());
    }

    #[test]
    fn test_search_respects_distance_bound() {
        // The real match lies past the 4-char search window.
        let haystack = "xxxx今天天气";
        assert!(fuzzy_substring_search(haystack, "今天天气", 0.5, Some(4)).is_none());
    }

    #[test]
    fn test_search_span_within_slice() {
        let haystack = "大家好，今天天气很好，我们出发吧";
        let m = fuzzy_substring_search(haystack, "今天天气", 0.5, Some(10)).expect("match");
        let slice_len = char_len("大家好，今天天气很好");
        assert!(m.start_pos <= m.end_pos);
        assert!(m.end_pos <= slice_len);
    }

    #[test]
    fn test_search_prefers_first_best_window() {
        // Two identical candidates; the earlier one must win.
        let m = fuzzy_substring_search("abab", "ab", 0.5, None).expect("match");
        assert_eq!(m.start_pos, 0);
        assert_eq!(m.end_pos, 2);
    }

    #[test]
    fn test_default_search_distance_floor() {
        assert_eq!(default_search_distance(4), 50);
        assert_eq!(default_search_distance(30), 90);
    }
}
