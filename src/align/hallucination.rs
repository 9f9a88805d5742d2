//! Hallucination heuristics.
//!
//! Decides whether a diarized unit, or the fuzzy match found for it, is
//! trustworthy enough to take high-fidelity text for. Precision over
//! recall: when in doubt the caller falls back to the diarized engine's
//! own text for that unit.

use super::models::MatchResult;
use super::AlignmentConfig;
use std::collections::HashSet;

/// Classify a diarized needle and its match result as hallucinated.
///
/// Rules, first true wins:
/// 1. empty needle;
/// 2. four or more raw chars but at most two distinct ones (degenerate
///    repeats, e.g. one syllable looped);
/// 3. no match found;
/// 4. similarity below the hallucination floor;
/// 5. the match only appears past the midpoint of the remaining text,
///    which is more likely a coincidental fuzzy hit than alignment.
pub fn is_hallucination(
    needle: &str,
    match_result: Option<&MatchResult>,
    remaining_len: usize,
    config: &AlignmentConfig,
) -> bool {
    if needle.is_empty() {
        return true;
    }

    let chars: Vec<char> = needle.chars().collect();
    if chars.len() >= 4 {
        let distinct: HashSet<char> = chars.iter().copied().collect();
        if distinct.len() <= 2 {
            return true;
        }
    }

    let m = match match_result {
        Some(m) => m,
        None => return true,
    };

    if m.similarity < config.hallucination_similarity {
        return true;
    }

    if remaining_len > 0 && m.start_pos as f64 > remaining_len as f64 * 0.5 {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AlignmentConfig {
        AlignmentConfig::default()
    }

    fn good_match() -> MatchResult {
        MatchResult {
            text: "今天天气".to_string(),
            start_pos: 0,
            end_pos: 4,
            similarity: 0.9,
        }
    }

    #[test]
    fn test_empty_needle() {
        assert!(is_hallucination("", Some(&good_match()), 100, &config()));
    }

    #[test]
    fn test_degenerate_repeat() {
        // Four identical chars: hallucinated regardless of the match.
        assert!(is_hallucination("阿阿阿阿", Some(&good_match()), 100, &config()));
        assert!(is_hallucination("阿巴阿巴", Some(&good_match()), 100, &config()));
    }

    #[test]
    fn test_short_repeat_allowed() {
        // Under four chars the repeat rule does not fire.
        assert!(!is_hallucination("阿阿", Some(&good_match()), 100, &config()));
    }

    #[test]
    fn test_no_match() {
        assert!(is_hallucination("今天天气很好", None, 100, &config()));
    }

    #[test]
    fn test_low_similarity() {
        let m = MatchResult {
            similarity: 0.3,
            ..good_match()
        };
        assert!(is_hallucination("今天天气很好", Some(&m), 100, &config()));
    }

    #[test]
    fn test_match_too_deep() {
        let m = MatchResult {
            start_pos: 60,
            end_pos: 64,
            ..good_match()
        };
        assert!(is_hallucination("今天天气很好", Some(&m), 100, &config()));
        // With no remaining-length information the position rule is skipped.
        assert!(!is_hallucination("今天天气很好", Some(&m), 0, &config()));
    }

    #[test]
    fn test_trustworthy_match() {
        assert!(!is_hallucination("今天天气很好", Some(&good_match()), 100, &config()));
    }
}
