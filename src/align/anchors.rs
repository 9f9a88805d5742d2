//! Anchor detection: splitting the diarized timeline into alignment
//! segments.
//!
//! Each segment between two anchors is aligned independently from a fresh
//! cursor, so fuzzy-match drift in one segment cannot propagate into the
//! next. Anchors fall on natural break points: long silence, speaker
//! change, or a forced cap on segment duration.

use super::models::Sentence;
use super::AlignmentConfig;

/// Find anchor indices for a sentence list sorted by start time.
///
/// Returns a strictly increasing sequence starting at 0 and ending at
/// `sentences.len()`; adjacent anchors delimit non-empty segments. Empty
/// input yields `[0, 0]` (zero segments).
pub fn find_anchors(sentences: &[Sentence], config: &AlignmentConfig) -> Vec<usize> {
    if sentences.is_empty() {
        return vec![0, 0];
    }

    let mut anchors = vec![0];
    let mut last_anchor_time = sentences[0].start_ms;

    for i in 1..sentences.len() {
        let prev = &sentences[i - 1];
        let curr = &sentences[i];

        // Long silence; saturating because minor overlap is tolerated.
        let gap = curr.start_ms.saturating_sub(prev.end_ms);
        if gap > config.min_silence_gap_ms {
            anchors.push(i);
            last_anchor_time = curr.start_ms;
            continue;
        }

        if prev.speaker != curr.speaker {
            anchors.push(i);
            last_anchor_time = curr.start_ms;
            continue;
        }

        // Forced split so a single segment never exceeds the duration cap.
        if curr.start_ms.saturating_sub(last_anchor_time) > config.max_segment_duration_ms {
            anchors.push(i);
            last_anchor_time = curr.start_ms;
        }
    }

    anchors.push(sentences.len());
    anchors.dedup();
    anchors
}
