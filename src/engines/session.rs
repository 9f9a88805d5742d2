//! Offline session adapters.
//!
//! A session file captures what the two engines produced for a recording:
//! the diarized sentence stream, and the high-fidelity engine's text per
//! coarse audio window. The adapters here replay such a capture through
//! the engine traits, so the cascade can run (and re-run, with different
//! tuning) without any model runtime present.

use super::{Diarizer, HighFidelitySource};
use crate::align::Sentence;
use crate::error::{Result, WeftError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One coarse high-fidelity transcription window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptWindow {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl TranscriptWindow {
    /// Whether this window overlaps `[start_ms, end_ms)`.
    fn overlaps(&self, start_ms: u64, end_ms: u64) -> bool {
        self.start_ms < end_ms && self.end_ms > start_ms
    }
}

/// Captured engine output for one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    /// Identifier for the recording (defaults to the file stem).
    #[serde(default)]
    pub media_id: Option<String>,
    /// Diarized sentence stream.
    pub sentences: Vec<Sentence>,
    /// High-fidelity text per coarse window, ordered by start time.
    #[serde(default)]
    pub windows: Vec<TranscriptWindow>,
}

impl SessionFile {
    /// Load a session file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut session: SessionFile = serde_json::from_str(&content)
            .map_err(|e| WeftError::Session(format!("{}: {}", path.display(), e)))?;

        if session.media_id.is_none() {
            session.media_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string());
        }
        session
            .sentences
            .sort_by_key(|s| (s.start_ms, s.end_ms));
        session.windows.sort_by_key(|w| (w.start_ms, w.end_ms));

        Ok(session)
    }

    pub fn media_id(&self) -> &str {
        self.media_id.as_deref().unwrap_or("unknown")
    }
}

/// Replays a session file's diarized sentences.
pub struct SessionDiarizer {
    sentences: Vec<Sentence>,
}

impl SessionDiarizer {
    pub fn new(session: &SessionFile) -> Self {
        Self {
            sentences: session.sentences.clone(),
        }
    }
}

#[async_trait]
impl Diarizer for SessionDiarizer {
    async fn diarize(&self, _media: &Path) -> Result<Vec<Sentence>> {
        Ok(self.sentences.clone())
    }
}

/// Serves captured high-fidelity windows as a [`HighFidelitySource`].
///
/// A requested range maps to the concatenation of every captured window
/// overlapping it, in order. The windows are coarse, so the returned text
/// usually covers a bit more than the range; the aligner's distance
/// constraint absorbs that.
pub struct WindowedTranscriptSource {
    windows: Vec<TranscriptWindow>,
}

impl WindowedTranscriptSource {
    pub fn new(session: &SessionFile) -> Self {
        Self {
            windows: session.windows.clone(),
        }
    }
}

#[async_trait]
impl HighFidelitySource for WindowedTranscriptSource {
    async fn transcribe_range(&self, _media: &Path, start_ms: u64, end_ms: u64) -> Result<String> {
        let parts: Vec<&str> = self
            .windows
            .iter()
            .filter(|w| w.overlaps(start_ms, end_ms))
            .map(|w| w.text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(parts.join(" "))
    }
}
