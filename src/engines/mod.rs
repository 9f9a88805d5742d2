//! External engine boundary.
//!
//! The alignment core never runs models itself; it consumes their output
//! through these traits. A diarization failure is fatal (there is nothing
//! to align without the sentence timeline), while extraction and
//! transcription failures degrade one segment only.

mod session;

pub use session::{SessionDiarizer, SessionFile, TranscriptWindow, WindowedTranscriptSource};

use crate::align::Sentence;
use crate::error::{Result, WeftError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A slice of decoded audio handed to the high-fidelity engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    /// Clip duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }
}

/// Produces the diarized sentence stream for a media file.
#[async_trait]
pub trait Diarizer: Send + Sync {
    /// Diarize a media file into time-stamped, speaker-labeled sentences.
    async fn diarize(&self, media: &Path) -> Result<Vec<Sentence>>;
}

/// Slices a time range out of a media file as raw samples.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract `[start_ms, end_ms)` from the media file.
    async fn extract(&self, media: &Path, start_ms: u64, end_ms: u64) -> Result<AudioClip>;
}

/// The high-fidelity transcription engine.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a clip of audio to plain text.
    async fn transcribe(&self, clip: &AudioClip) -> Result<String>;
}

/// The seam the pipeline consumes: high-fidelity text for a time range.
#[async_trait]
pub trait HighFidelitySource: Send + Sync {
    /// Produce high-fidelity text for `[start_ms, end_ms)` of the media.
    ///
    /// Errors distinguish extraction failures
    /// ([`WeftError::AudioExtract`]) from transcription failures so the
    /// pipeline can tag the degraded records accordingly.
    async fn transcribe_range(&self, media: &Path, start_ms: u64, end_ms: u64) -> Result<String>;
}

/// Padding added around an extracted range so the high-fidelity engine
/// sees sentence boundaries with a little context.
const EXTRACT_BUFFER_MS: u64 = 100;

/// Composes an [`AudioExtractor`] and a [`Transcriber`] behind the
/// [`HighFidelitySource`] seam.
pub struct ModelSource {
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
}

impl ModelSource {
    pub fn new(extractor: Arc<dyn AudioExtractor>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            extractor,
            transcriber,
        }
    }
}

#[async_trait]
impl HighFidelitySource for ModelSource {
    async fn transcribe_range(&self, media: &Path, start_ms: u64, end_ms: u64) -> Result<String> {
        let padded_start = start_ms.saturating_sub(EXTRACT_BUFFER_MS);
        let padded_end = end_ms + EXTRACT_BUFFER_MS;

        let clip = self.extractor.extract(media, padded_start, padded_end).await?;
        if clip.samples.is_empty() {
            return Err(WeftError::AudioExtract(format!(
                "empty clip for {}ms-{}ms",
                padded_start, padded_end
            )));
        }

        self.transcriber.transcribe(&clip).await
    }
}
