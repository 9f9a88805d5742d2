//! Data models for the alignment engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A diarized sentence: time-stamped, speaker-labeled text from the
/// diarization engine. Ordered by `start_ms`; minor overlap between
/// neighbours is tolerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    /// Start time in milliseconds.
    pub start_ms: u64,
    /// End time in milliseconds.
    pub end_ms: u64,
    /// Sentence text as produced by the diarization engine.
    pub text: String,
    /// Speaker label assigned by the diarization engine.
    pub speaker: String,
}

impl Sentence {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
            speaker: speaker.into(),
        }
    }
}

/// Consecutive same-speaker sentences merged into one matching unit.
///
/// Grouping shortens the list of units that need fuzzy matching and gives
/// each needle more text to match on.
#[derive(Debug, Clone)]
pub struct SpeakerGroup {
    pub speaker: String,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Member texts concatenated in order.
    pub text: String,
    /// The original sentences folded into this group.
    pub members: Vec<Sentence>,
}

impl SpeakerGroup {
    /// Number of sentences merged into this group.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// A fuzzy match inside a (restricted) haystack.
///
/// Positions are char offsets into the searched slice of the original,
/// punctuated text.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The matched substring, in original-text form.
    pub text: String,
    /// Start char offset in the searched slice.
    pub start_pos: usize,
    /// End char offset (exclusive) in the searched slice.
    pub end_pos: usize,
    /// Similarity ratio in [0, 1].
    pub similarity: f64,
}

/// Provenance of an output record's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Fuzzy match against the high-fidelity text accepted.
    FuzzyMatch,
    /// Single-unit segment; high-fidelity text taken verbatim.
    Direct,
    /// Single-speaker multi-sentence segment kept as one merged record.
    Merged,
    /// The unit's diarized text normalized to nothing.
    Empty,
    /// Match rejected as a likely hallucination; diarized text used.
    HallucinationFallback,
    /// Match too close to the search boundary; diarized text used.
    SuspiciousFallback,
    /// High-fidelity engine returned nothing for the segment.
    SourceEmpty,
    /// Audio extraction failed for the segment.
    ExtractFailed,
}

impl RecordSource {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::FuzzyMatch => "fuzzy_match",
            RecordSource::Direct => "direct",
            RecordSource::Merged => "merged",
            RecordSource::Empty => "empty",
            RecordSource::HallucinationFallback => "hallucination_fallback",
            RecordSource::SuspiciousFallback => "suspicious_fallback",
            RecordSource::SourceEmpty => "source_empty",
            RecordSource::ExtractFailed => "extract_failed",
        }
    }

    /// Whether the record text came from the high-fidelity stream.
    pub fn is_high_fidelity(&self) -> bool {
        matches!(
            self,
            RecordSource::FuzzyMatch | RecordSource::Direct | RecordSource::Merged
        )
    }
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output record: diarized structure carrying the chosen text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentRecord {
    /// Speaker label from the diarized stream.
    pub speaker: String,
    /// Start time in milliseconds.
    pub start_ms: u64,
    /// End time in milliseconds.
    pub end_ms: u64,
    /// The chosen text for this time span.
    pub text: String,
    /// Where the text came from.
    pub source: RecordSource,
    /// How many diarized sentences this record covers (>= 1).
    pub merged_count: usize,
}

impl AlignmentRecord {
    pub fn new(
        speaker: impl Into<String>,
        start_ms: u64,
        end_ms: u64,
        text: impl Into<String>,
        source: RecordSource,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            start_ms,
            end_ms,
            text: text.into(),
            source,
            merged_count: 1,
        }
    }

    /// Mark this record as covering several merged sentences.
    pub fn with_merged_count(mut self, count: usize) -> Self {
        self.merged_count = count.max(1);
        self
    }
}

/// Per-source record counts, for observability and audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceStats {
    counts: BTreeMap<RecordSource, usize>,
}

impl SourceStats {
    /// Tally the sources of a record list.
    pub fn from_records(records: &[AlignmentRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            *stats.counts.entry(record.source).or_insert(0) += 1;
        }
        stats
    }

    /// Count for one source tag.
    pub fn count(&self, source: RecordSource) -> usize {
        self.counts.get(&source).copied().unwrap_or(0)
    }

    /// Total number of records tallied.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of records whose text came from the high-fidelity stream.
    pub fn high_fidelity(&self) -> usize {
        self.counts
            .iter()
            .filter(|(source, _)| source.is_high_fidelity())
            .map(|(_, n)| n)
            .sum()
    }

    /// Iterate over `(source, count)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordSource, usize)> + '_ {
        self.counts.iter().map(|(s, n)| (*s, *n))
    }
}
