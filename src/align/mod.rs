//! The alignment engine.
//!
//! Merges a diarized sentence stream (speaker labels and timestamps,
//! lower text fidelity) with a high-fidelity transcription stream (better
//! text, no speakers or usable timestamps) into one record list carrying
//! both. Anchor detection bounds how far fuzzy-match drift can travel;
//! within a segment, a monotonic cursor plus a search-distance cap keep
//! each diarized unit from claiming unrelated text; hallucination
//! heuristics decide when to distrust the match and keep the diarized
//! engine's own words.
//!
//! The engine is pure: it consumes plain data produced by external
//! engines (see [`crate::engines`]) and holds no mutable state beyond the
//! per-call cursor, so independent segments and files can be aligned
//! concurrently.

mod anchors;
mod fuzzy;
mod grouping;
mod hallucination;
mod models;
mod sequential;
pub mod text;

pub use anchors::find_anchors;
pub use fuzzy::{default_search_distance, fuzzy_substring_search, similarity_ratio};
pub use grouping::group_by_speaker;
pub use hallucination::is_hallucination;
pub use models::{
    AlignmentRecord, MatchResult, RecordSource, Sentence, SourceStats, SpeakerGroup,
};
pub use sequential::{align_segment, fallback_records, sequential_fuzzy_match};

use serde::{Deserialize, Serialize};

/// Tunable constants for the alignment engine.
///
/// An explicit value struct rather than module state, so concurrent files
/// can run with different settings. The thresholds are tuned, not proven;
/// the defaults come from field use of the cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Silence longer than this (ms) places an anchor.
    pub min_silence_gap_ms: u64,
    /// Forced anchor interval (ms); a segment never spans longer.
    pub max_segment_duration_ms: u64,
    /// Minimum similarity for a fuzzy match to be considered at all.
    pub min_similarity: f64,
    /// Similarity below which a found match still counts as hallucinated.
    pub hallucination_similarity: f64,
    /// Largest cursor step taken when a unit falls back to diarized text.
    pub max_fallback_step: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            min_silence_gap_ms: 2000,
            max_segment_duration_ms: 5 * 60 * 1000,
            min_similarity: 0.5,
            hallucination_similarity: 0.4,
            max_fallback_step: 20,
        }
    }
}
