//! Weft - Cascaded Transcript Alignment
//!
//! Merges two independently produced transcriptions of the same audio: a
//! **diarized stream** (time-stamped sentences with speaker labels, lower
//! text fidelity) and a **high-fidelity stream** (better word accuracy,
//! produced per coarse audio window, no speakers or usable timestamps).
//! The result is one ordered list of `(speaker, start, end, text)`
//! records with the diarized stream's structure and the high-fidelity
//! stream's words, plus a provenance tag per record.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `align` - the alignment engine: anchors, speaker grouping, fuzzy
//!   matching, hallucination detection, the sequential aligner
//! - `engines` - traits for the external diarization/extraction/
//!   transcription collaborators, plus offline session adapters
//! - `pipeline` - per-recording orchestration and degradation policy
//! - `config` - configuration management
//! - `format` - transcript rendering (text, JSON, SRT)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use weft::config::Settings;
//! use weft::engines::{SessionDiarizer, SessionFile, WindowedTranscriptSource};
//! use weft::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = SessionFile::load(Path::new("meeting.json"))?;
//!     let pipeline = Pipeline::new(
//!         &Settings::load()?,
//!         Arc::new(SessionDiarizer::new(&session)),
//!         Arc::new(WindowedTranscriptSource::new(&session)),
//!     );
//!
//!     let transcript = pipeline.process(Path::new("meeting.json")).await?;
//!     println!("{} aligned records", transcript.records.len());
//!
//!     Ok(())
//! }
//! ```

pub mod align;
pub mod cli;
pub mod config;
pub mod engines;
pub mod error;
pub mod format;
pub mod pipeline;

pub use error::{Result, WeftError};
