//! CLI module for Weft.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Weft - Cascaded Transcript Alignment
///
/// Merges a diarized transcription stream (speakers and timestamps) with
/// a high-fidelity transcription stream (better text) into one
/// speaker-labeled transcript.
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align a captured session (diarized sentences + high-fidelity windows)
    Align {
        /// Path to a session JSON file
        input: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (text, json, srt)
        #[arg(long, default_value = "text")]
        format: String,

        /// Print per-source record statistics after alignment
        #[arg(long)]
        stats: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
