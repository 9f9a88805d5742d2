//! Pipeline orchestrator for Weft.
//!
//! Coordinates one recording end to end: diarize, place anchors, then for
//! each alignment segment fetch high-fidelity text and align it. Segments
//! share no mutable state (each alignment starts from its own fresh
//! cursor), so they are processed with bounded concurrency while the
//! output order is preserved.

use crate::align::{
    align_segment, fallback_records, find_anchors, AlignmentConfig, AlignmentRecord, RecordSource,
    Sentence, SourceStats,
};
use crate::align::text::{strip_emoji, strip_engine_tags};
use crate::config::Settings;
use crate::engines::{Diarizer, HighFidelitySource};
use crate::error::{Result, WeftError};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Receives pipeline progress events.
///
/// The core reports progress through this seam (and through `tracing`)
/// instead of calling into any UI; callers decide how to render it.
pub trait AlignmentObserver: Send + Sync {
    fn segment_started(&self, _index: usize, _total: usize) {}
    fn segment_finished(&self, _index: usize, _total: usize) {}
}

/// Observer that ignores every event.
pub struct NullObserver;

impl AlignmentObserver for NullObserver {}

/// The final product: ordered records plus provenance statistics.
#[derive(Debug, Clone)]
pub struct AlignedTranscript {
    pub media_id: String,
    pub records: Vec<AlignmentRecord>,
    pub stats: SourceStats,
}

impl AlignedTranscript {
    /// End time of the last record, in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.records.last().map(|r| r.end_ms).unwrap_or(0)
    }
}

/// The main orchestrator for the Weft cascade.
pub struct Pipeline {
    config: AlignmentConfig,
    max_concurrent_segments: usize,
    diarizer: Arc<dyn Diarizer>,
    source: Arc<dyn HighFidelitySource>,
    observer: Arc<dyn AlignmentObserver>,
}

impl Pipeline {
    /// Create a pipeline over the given engines.
    pub fn new(
        settings: &Settings,
        diarizer: Arc<dyn Diarizer>,
        source: Arc<dyn HighFidelitySource>,
    ) -> Self {
        Self {
            config: settings.alignment.clone(),
            max_concurrent_segments: settings.pipeline.max_concurrent_segments.max(1),
            diarizer,
            source,
            observer: Arc::new(NullObserver),
        }
    }

    /// Install a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn AlignmentObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Process one recording into an aligned transcript.
    ///
    /// Diarization failure (or an empty sentence stream) is fatal; every
    /// later failure degrades only its own segment and shows up as a
    /// `source` tag on the affected records.
    #[instrument(skip(self), fields(media = %media.display()))]
    pub async fn process(&self, media: &Path) -> Result<AlignedTranscript> {
        let sentences = self.diarizer.diarize(media).await?;
        if sentences.is_empty() {
            return Err(WeftError::Diarization(
                "no sentences detected in diarization output".to_string(),
            ));
        }
        info!("Diarized {} sentences", sentences.len());

        let anchors = find_anchors(&sentences, &self.config);
        let segments: Vec<(usize, usize)> = anchors.windows(2).map(|w| (w[0], w[1])).collect();
        let total = segments.len();
        info!("{} alignment segments", total);

        let mut results = stream::iter(segments.into_iter().enumerate())
            .map(|(index, (lo, hi))| {
                let segment = &sentences[lo..hi];
                async move {
                    self.observer.segment_started(index, total);
                    let records = self.process_segment(media, segment, index).await;
                    self.observer.segment_finished(index, total);
                    records
                }
            })
            .buffered(self.max_concurrent_segments);

        let mut records = Vec::new();
        while let Some(batch) = results.next().await {
            records.extend(batch);
        }

        let stats = SourceStats::from_records(&records);
        info!(
            "Alignment complete: {} records, {} from high-fidelity text",
            stats.total(),
            stats.high_fidelity()
        );
        for (source, count) in stats.iter() {
            debug!("  {}: {}", source, count);
        }

        let media_id = media
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(AlignedTranscript {
            media_id,
            records,
            stats,
        })
    }

    /// Align one segment, degrading to diarized text on engine failure.
    async fn process_segment(
        &self,
        media: &Path,
        sentences: &[Sentence],
        index: usize,
    ) -> Vec<AlignmentRecord> {
        let start_ms = sentences[0].start_ms;
        let end_ms = sentences[sentences.len() - 1].end_ms;
        debug!(
            "Segment {}: {} sentences, {}ms-{}ms",
            index,
            sentences.len(),
            start_ms,
            end_ms
        );

        match self.source.transcribe_range(media, start_ms, end_ms).await {
            Ok(raw) => {
                let text = strip_emoji(&strip_engine_tags(&raw));
                align_segment(&text, sentences, &self.config)
            }
            Err(WeftError::AudioExtract(e)) => {
                warn!("Segment {}: audio extraction failed: {}", index, e);
                fallback_records(sentences, RecordSource::ExtractFailed)
            }
            Err(e) => {
                warn!("Segment {}: high-fidelity transcription failed: {}", index, e);
                fallback_records(sentences, RecordSource::SourceEmpty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedDiarizer {
        sentences: Vec<Sentence>,
    }

    #[async_trait]
    impl Diarizer for FixedDiarizer {
        async fn diarize(&self, _media: &Path) -> Result<Vec<Sentence>> {
            Ok(self.sentences.clone())
        }
    }

    enum SourceBehavior {
        Text(String),
        ExtractError,
        TranscribeError,
    }

    struct ScriptedSource {
        /// Behavior per requested range, keyed by segment start time.
        script: Vec<(u64, SourceBehavior)>,
    }

    #[async_trait]
    impl HighFidelitySource for ScriptedSource {
        async fn transcribe_range(
            &self,
            _media: &Path,
            start_ms: u64,
            _end_ms: u64,
        ) -> Result<String> {
            for (start, behavior) in &self.script {
                if *start == start_ms {
                    return match behavior {
                        SourceBehavior::Text(t) => Ok(t.clone()),
                        SourceBehavior::ExtractError => {
                            Err(WeftError::AudioExtract("no samples".to_string()))
                        }
                        SourceBehavior::TranscribeError => {
                            Err(WeftError::Transcription("engine crashed".to_string()))
                        }
                    };
                }
            }
            Ok(String::new())
        }
    }

    fn pipeline(sentences: Vec<Sentence>, script: Vec<(u64, SourceBehavior)>) -> Pipeline {
        Pipeline::new(
            &Settings::default(),
            Arc::new(FixedDiarizer { sentences }),
            Arc::new(ScriptedSource { script }),
        )
    }

    #[tokio::test]
    async fn test_empty_diarization_is_fatal() {
        let p = pipeline(Vec::new(), Vec::new());
        let err = p.process(Path::new("a.wav")).await.unwrap_err();
        assert!(matches!(err, WeftError::Diarization(_)));
    }

    #[tokio::test]
    async fn test_single_segment_direct() {
        let p = pipeline(
            vec![Sentence::new(0, 1000, "你好世界", "A")],
            vec![(0, SourceBehavior::Text("<|zh|>你好，世界。".to_string()))],
        );
        let result = p.process(Path::new("meeting.wav")).await.unwrap();

        assert_eq!(result.media_id, "meeting");
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].source, RecordSource::Direct);
        // Engine markup is stripped before alignment.
        assert_eq!(result.records[0].text, "你好，世界。");
        assert_eq!(result.duration_ms(), 1000);
    }

    #[tokio::test]
    async fn test_segment_failures_stay_local() {
        // Speaker change at index 1 splits into two segments; the first
        // segment's extraction fails, the second still aligns.
        let p = pipeline(
            vec![
                Sentence::new(0, 1000, "你好世界", "A"),
                Sentence::new(1000, 2000, "今天天气很不错", "B"),
            ],
            vec![
                (0, SourceBehavior::ExtractError),
                (1000, SourceBehavior::Text("今天天气很不错。".to_string())),
            ],
        );
        let result = p.process(Path::new("a.wav")).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].source, RecordSource::ExtractFailed);
        assert_eq!(result.records[0].text, "你好世界");
        assert_eq!(result.records[1].source, RecordSource::Direct);
        assert_eq!(result.stats.count(RecordSource::ExtractFailed), 1);
    }

    #[tokio::test]
    async fn test_transcription_failure_tags_source_empty() {
        let p = pipeline(
            vec![Sentence::new(0, 1000, "你好世界", "A")],
            vec![(0, SourceBehavior::TranscribeError)],
        );
        let result = p.process(Path::new("a.wav")).await.unwrap();
        assert_eq!(result.records[0].source, RecordSource::SourceEmpty);
        assert_eq!(result.records[0].text, "你好世界");
    }

    #[tokio::test]
    async fn test_end_to_end_with_session_adapters() {
        use crate::engines::{SessionDiarizer, SessionFile, TranscriptWindow, WindowedTranscriptSource};

        // A two-speaker exchange in one coarse window, then silence, then
        // a closing remark in a second window.
        let session = SessionFile {
            media_id: Some("standup".to_string()),
            sentences: vec![
                Sentence::new(0, 2000, "今天天气怎么样", "A"),
                Sentence::new(2000, 4000, "今天天气很不错", "B"),
                Sentence::new(10_000, 12_000, "那我们出发吧", "A"),
            ],
            windows: vec![
                TranscriptWindow {
                    start_ms: 0,
                    end_ms: 8000,
                    text: "今天天气怎么样？今天天气很不错。".to_string(),
                },
                TranscriptWindow {
                    start_ms: 8000,
                    end_ms: 16_000,
                    text: "那我们出发吧。".to_string(),
                },
            ],
        };

        let p = Pipeline::new(
            &Settings::default(),
            Arc::new(SessionDiarizer::new(&session)),
            Arc::new(WindowedTranscriptSource::new(&session)),
        );
        let result = p.process(Path::new("standup.json")).await.unwrap();

        assert_eq!(result.records.len(), 3);
        // Speaker change splits the first window's exchange; each side
        // gets its own high-fidelity text.
        assert_eq!(result.records[0].source, RecordSource::Direct);
        assert_eq!(result.records[0].text, "今天天气怎么样？今天天气很不错。");
        // The second segment shares the same coarse window and, being a
        // single-sentence segment, also takes its text verbatim.
        assert_eq!(result.records[1].source, RecordSource::Direct);
        assert_eq!(result.records[2].source, RecordSource::Direct);
        assert_eq!(result.records[2].text, "那我们出发吧。");
        assert!(result
            .records
            .windows(2)
            .all(|w| w[0].start_ms <= w[1].start_ms));
    }

    #[tokio::test]
    async fn test_records_ordered_across_segments() {
        let p = pipeline(
            vec![
                Sentence::new(0, 1000, "第一段的内容在这里", "A"),
                Sentence::new(5000, 6000, "第二段的内容在这里", "A"),
                Sentence::new(9000, 10000, "第三段的内容在这里", "B"),
            ],
            vec![
                (0, SourceBehavior::Text("第一段的内容在这里。".to_string())),
                (5000, SourceBehavior::Text("第二段的内容在这里。".to_string())),
                (9000, SourceBehavior::Text("第三段的内容在这里。".to_string())),
            ],
        );
        let result = p.process(Path::new("a.wav")).await.unwrap();

        assert_eq!(result.records.len(), 3);
        assert!(result
            .records
            .windows(2)
            .all(|w| w[0].start_ms <= w[1].start_ms));
        assert_eq!(result.stats.count(RecordSource::Direct), 3);
    }
}
