//! Speaker grouping: fold consecutive same-speaker sentences into one
//! matching unit.

use super::models::{Sentence, SpeakerGroup};

/// Merge consecutive sentences sharing a speaker into groups, preserving
/// order. A single differing speaker starts a new group immediately; this
/// is a linear fold, not a global re-sort.
pub fn group_by_speaker(sentences: &[Sentence]) -> Vec<SpeakerGroup> {
    let mut groups: Vec<SpeakerGroup> = Vec::new();

    for sentence in sentences {
        match groups.last_mut() {
            Some(group) if group.speaker == sentence.speaker => {
                group.end_ms = sentence.end_ms;
                group.text.push_str(&sentence.text);
                group.members.push(sentence.clone());
            }
            _ => groups.push(SpeakerGroup {
                speaker: sentence.speaker.clone(),
                start_ms: sentence.start_ms,
                end_ms: sentence.end_ms,
                text: sentence.text.clone(),
                members: vec![sentence.clone()],
            }),
        }
    }

    groups
}
