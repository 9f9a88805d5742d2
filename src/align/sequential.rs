//! Sequential alignment of one segment's speaker groups against its
//! high-fidelity text.
//!
//! A single cursor walks the high-fidelity text left to right. Each group
//! may only claim text at or after the cursor (order constraint) and no
//! further ahead than its search distance (distance constraint). Units
//! that fail matching never stall the walk: every outcome advances the
//! cursor or leaves it where the next unit can still make progress.

use super::fuzzy::{default_search_distance, fuzzy_substring_search};
use super::grouping::group_by_speaker;
use super::hallucination::is_hallucination;
use super::models::{AlignmentRecord, RecordSource, Sentence, SpeakerGroup};
use super::text::{char_len, char_suffix, normalize, strip_emoji};
use super::AlignmentConfig;
use std::collections::HashSet;
use tracing::debug;

/// Align one segment: choose a text and provenance for every diarized
/// sentence in it.
///
/// Strategy depends on the segment's shape:
/// - blank high-fidelity text: every sentence keeps its diarized text
///   (`source_empty`);
/// - one sentence: nothing to align against, high-fidelity text verbatim
///   (`direct`);
/// - several sentences, one speaker: one `merged` record carrying the
///   whole high-fidelity text, since there is no signal to split on;
/// - several speakers: group and fuzzy-match sequentially.
pub fn align_segment(
    high_fidelity_text: &str,
    sentences: &[Sentence],
    config: &AlignmentConfig,
) -> Vec<AlignmentRecord> {
    if sentences.is_empty() {
        return Vec::new();
    }

    if high_fidelity_text.trim().is_empty() {
        return fallback_records(sentences, RecordSource::SourceEmpty);
    }

    if sentences.len() == 1 {
        let s = &sentences[0];
        return vec![AlignmentRecord::new(
            &s.speaker,
            s.start_ms,
            s.end_ms,
            high_fidelity_text,
            RecordSource::Direct,
        )];
    }

    let speakers: HashSet<&str> = sentences.iter().map(|s| s.speaker.as_str()).collect();
    if speakers.len() == 1 {
        let first = &sentences[0];
        let last = &sentences[sentences.len() - 1];
        return vec![AlignmentRecord::new(
            &first.speaker,
            first.start_ms,
            last.end_ms,
            high_fidelity_text,
            RecordSource::Merged,
        )
        .with_merged_count(sentences.len())];
    }

    let groups = group_by_speaker(sentences);
    sequential_fuzzy_match(high_fidelity_text, &groups, config)
}

/// Walk speaker groups in order against the high-fidelity text, choosing
/// per group among accept / suspicious / hallucination / empty.
pub fn sequential_fuzzy_match(
    high_fidelity_text: &str,
    groups: &[SpeakerGroup],
    config: &AlignmentConfig,
) -> Vec<AlignmentRecord> {
    let total_len = char_len(high_fidelity_text);
    let mut records = Vec::with_capacity(groups.len());
    let mut cursor: usize = 0;

    for group in groups {
        let needle_len = normalize(&group.text).len();

        if needle_len == 0 {
            records.push(group_record(group, String::new(), RecordSource::Empty));
            continue;
        }

        let remaining = char_suffix(high_fidelity_text, cursor);
        let remaining_len = total_len - cursor;
        let max_search_distance = default_search_distance(needle_len);
        // A guaranteed small step so a failing unit cannot loop on the
        // same window forever.
        let fallback_step = needle_len.min(config.max_fallback_step);

        let match_result = fuzzy_substring_search(
            remaining,
            &group.text,
            config.min_similarity,
            Some(max_search_distance),
        );

        let hallucinated =
            is_hallucination(&group.text, match_result.as_ref(), remaining_len, config);
        let m = match match_result {
            Some(m) if !hallucinated => m,
            _ => {
                debug!(
                    speaker = %group.speaker,
                    cursor,
                    "group rejected as hallucination, keeping diarized text"
                );
                records.push(group_record(
                    group,
                    strip_emoji(&group.text),
                    RecordSource::HallucinationFallback,
                ));
                cursor = (cursor + fallback_step).min(total_len);
                continue;
            }
        };

        if m.start_pos as f64 > max_search_distance as f64 * 0.8 {
            // Matched right at the search boundary; more likely a
            // coincidental hit than a true alignment.
            debug!(
                speaker = %group.speaker,
                start_pos = m.start_pos,
                max_search_distance,
                "match too close to search boundary, keeping diarized text"
            );
            records.push(group_record(
                group,
                strip_emoji(&group.text),
                RecordSource::SuspiciousFallback,
            ));
            cursor = (cursor + fallback_step).min(total_len);
            continue;
        }

        let matched = m.text.trim();
        let text = if matched.is_empty() {
            strip_emoji(&group.text)
        } else {
            matched.to_string()
        };
        debug!(
            speaker = %group.speaker,
            similarity = m.similarity,
            cursor,
            advance_to = cursor + m.end_pos,
            "group matched"
        );
        records.push(group_record(group, text, RecordSource::FuzzyMatch));
        cursor = (cursor + m.end_pos).min(total_len);
    }

    records
}

/// Expand one speaker group into its output record. Multi-member groups
/// stay merged; splitting fused text back across the original sentence
/// boundaries is not attempted, there is no reliable signal to split on.
fn group_record(group: &SpeakerGroup, text: String, source: RecordSource) -> AlignmentRecord {
    AlignmentRecord::new(&group.speaker, group.start_ms, group.end_ms, text, source)
        .with_merged_count(group.member_count())
}

/// Degrade every sentence in a segment to its own diarized text with the
/// given provenance tag. Used when the high-fidelity side produced
/// nothing usable for the whole segment.
pub fn fallback_records(sentences: &[Sentence], source: RecordSource) -> Vec<AlignmentRecord> {
    sentences
        .iter()
        .map(|s| {
            AlignmentRecord::new(&s.speaker, s.start_ms, s.end_ms, strip_emoji(&s.text), source)
        })
        .collect()
}
