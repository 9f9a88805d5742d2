//! Aligned transcript rendering (text, JSON, SRT).
//!
//! Presentation only; the record list itself is the core contract.

use crate::align::{AlignmentRecord, SourceStats};
use crate::pipeline::AlignedTranscript;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            _ => Err(format!("Unknown format: {}. Use text, json, or srt.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport<'a> {
    pub media_id: &'a str,
    pub duration_ms: u64,
    pub records: &'a [AlignmentRecord],
    pub stats: &'a SourceStats,
}

/// Format an aligned transcript for output.
pub fn format_transcript(transcript: &AlignedTranscript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_text(transcript),
        OutputFormat::Json => format_json(transcript),
        OutputFormat::Srt => format_srt(transcript),
    }
}

/// One speaker turn in the text rendering: consecutive non-empty records
/// with the same speaker, joined.
struct Turn<'a> {
    speaker: &'a str,
    texts: Vec<&'a str>,
    merged: usize,
}

fn turns(records: &[AlignmentRecord]) -> Vec<Turn<'_>> {
    let mut turns: Vec<Turn> = Vec::new();
    for record in records {
        let text = record.text.trim();
        if text.is_empty() {
            continue;
        }
        match turns.last_mut() {
            Some(turn) if turn.speaker == record.speaker => {
                turn.texts.push(text);
                turn.merged += record.merged_count;
            }
            _ => turns.push(Turn {
                speaker: &record.speaker,
                texts: vec![text],
                merged: record.merged_count,
            }),
        }
    }
    turns
}

/// Human-readable rendering: one line per speaker turn.
fn format_text(transcript: &AlignedTranscript) -> String {
    let turns = turns(&transcript.records);
    if turns.is_empty() {
        return "(no speech detected)\n".to_string();
    }

    let mut output = String::new();
    for turn in turns {
        output.push_str(&format!("Speaker {}: {}", turn.speaker, turn.texts.join(" ")));
        if turn.merged > 1 {
            output.push_str(&format!(" [merged {}]", turn.merged));
        }
        output.push('\n');
    }
    output
}

/// Format as JSON, including provenance tags and statistics.
fn format_json(transcript: &AlignedTranscript) -> String {
    let export = TranscriptExport {
        media_id: &transcript.media_id,
        duration_ms: transcript.duration_ms(),
        records: &transcript.records,
        stats: &transcript.stats,
    };
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip), one cue per non-empty record.
fn format_srt(transcript: &AlignedTranscript) -> String {
    let mut output = String::new();
    let mut cue = 0;

    for record in &transcript.records {
        let text = record.text.trim();
        if text.is_empty() {
            continue;
        }
        cue += 1;
        output.push_str(&format!("{}\n", cue));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(record.start_ms),
            format_srt_timestamp(record.end_ms)
        ));
        output.push_str(&format!("[{}] {}\n\n", record.speaker, text));
    }

    output
}

/// Format a millisecond timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1000;
    let millis = ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::RecordSource;

    fn sample_transcript() -> AlignedTranscript {
        let records = vec![
            AlignmentRecord::new("1", 0, 2500, "你好。", RecordSource::FuzzyMatch),
            AlignmentRecord::new("1", 2500, 6000, "今天天气很好。", RecordSource::Merged)
                .with_merged_count(3),
            AlignmentRecord::new("2", 6000, 8000, "", RecordSource::Empty),
            AlignmentRecord::new("2", 8000, 10000, "是的。", RecordSource::Direct),
        ];
        let stats = SourceStats::from_records(&records);
        AlignedTranscript {
            media_id: "meeting".to_string(),
            records,
            stats,
        }
    }

    #[test]
    fn test_format_text_groups_turns() {
        let text = format_transcript(&sample_transcript(), OutputFormat::Text);
        assert_eq!(
            text,
            "Speaker 1: 你好。 今天天气很好。 [merged 4]\nSpeaker 2: 是的。\n"
        );
    }

    #[test]
    fn test_format_text_empty() {
        let transcript = AlignedTranscript {
            media_id: "m".to_string(),
            records: Vec::new(),
            stats: SourceStats::default(),
        };
        assert_eq!(
            format_transcript(&transcript, OutputFormat::Text),
            "(no speech detected)\n"
        );
    }

    #[test]
    fn test_format_json_carries_provenance() {
        let json = format_transcript(&sample_transcript(), OutputFormat::Json);
        assert!(json.contains("\"media_id\": \"meeting\""));
        assert!(json.contains("\"fuzzy_match\""));
        assert!(json.contains("\"merged_count\": 3"));
    }

    #[test]
    fn test_format_srt_skips_empty_records() {
        let srt = format_transcript(&sample_transcript(), OutputFormat::Srt);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500"));
        assert!(srt.contains("[1] 你好。"));
        // Cue 3 follows cue 2 directly; the empty record is dropped.
        assert!(srt.contains("3\n00:00:08,000 --> 00:00:10,000"));
        assert!(!srt.contains("4\n"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("srt".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(61_500), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3_661_123), "01:01:01,123");
    }
}
