//! Align command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::engines::{SessionDiarizer, SessionFile, WindowedTranscriptSource};
use crate::format::{format_transcript, OutputFormat};
use crate::pipeline::{AlignmentObserver, Pipeline};
use anyhow::Result;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bridges pipeline progress events onto an indicatif bar.
struct ProgressObserver {
    bar: ProgressBar,
}

impl AlignmentObserver for ProgressObserver {
    fn segment_started(&self, _index: usize, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn segment_finished(&self, _index: usize, _total: usize) {
        self.bar.inc(1);
    }
}

/// Run the align command.
pub async fn run_align(
    input: &str,
    output: Option<String>,
    format: &str,
    stats: bool,
    settings: Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let input_path = Path::new(input);
    let session = SessionFile::load(input_path)?;
    Output::info(&format!(
        "Aligning '{}' ({} sentences, {} windows)",
        session.media_id(),
        session.sentences.len(),
        session.windows.len()
    ));

    let pipeline = Pipeline::new(
        &settings,
        Arc::new(SessionDiarizer::new(&session)),
        Arc::new(WindowedTranscriptSource::new(&session)),
    );

    let bar = Output::progress_bar(0, "Aligning segments");
    let pipeline = pipeline.with_observer(Arc::new(ProgressObserver { bar: bar.clone() }));

    let result = pipeline.process(input_path).await;
    bar.finish_and_clear();

    let mut transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("Alignment failed: {}", e));
            return Err(e.into());
        }
    };
    transcript.media_id = session.media_id().to_string();

    if stats {
        Output::header("Text provenance");
        for (source, count) in transcript.stats.iter() {
            Output::kv(source.as_str(), &count.to_string());
        }
        Output::kv(
            "high-fidelity share",
            &format!(
                "{}/{}",
                transcript.stats.high_fidelity(),
                transcript.stats.total()
            ),
        );
    }

    let rendered = format_transcript(&transcript, format);

    match resolve_output(output, &settings, &transcript.media_id, format) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            Output::success(&format!(
                "Wrote {} records to {}",
                transcript.records.len(),
                path.display()
            ));
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Explicit `--output` wins; otherwise a configured output directory gets
/// `<media_id>.<ext>`; otherwise stdout.
fn resolve_output(
    output: Option<String>,
    settings: &Settings,
    media_id: &str,
    format: OutputFormat,
) -> Option<PathBuf> {
    if let Some(path) = output {
        return Some(Settings::expand_path(&path));
    }
    settings.output_dir().map(|dir| {
        let ext = match format {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
        };
        dir.join(format!("{}.{}", media_id, ext))
    })
}
