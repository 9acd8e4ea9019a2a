use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::session::{SummaryStyle, WORD_LIMIT_MAX, WORD_LIMIT_MIN};

pub mod interactive;

#[derive(Parser)]
#[command(
    name = "yt-summary",
    about = "YouTube Summary - Summarize YouTube videos from their transcripts with Gemini",
    version,
    long_about = "Fetches the English transcript of a YouTube video, asks Gemini for a summary in the chosen style and length, and saves it as text or PDF."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./config.yaml or the user config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a single video
    Summarize {
        /// YouTube video link, e.g. https://www.youtube.com/watch?v=dQw4w9WgXcQ
        #[arg(value_name = "LINK")]
        link: String,

        /// Style and focus of the summary
        #[arg(short, long, value_enum, default_value_t = SummaryStyle::Balanced)]
        style: SummaryStyle,

        /// Custom word limit for the summary
        #[arg(short, long, value_name = "WORDS", value_parser = clap::value_parser!(u32).range(WORD_LIMIT_MIN as i64..=WORD_LIMIT_MAX as i64))]
        word_limit: Option<u32>,

        /// Directory to save the downloads in (falls back to the configured one)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Save the .txt download
        #[arg(long)]
        txt: bool,

        /// Save the .pdf download
        #[arg(long)]
        pdf: bool,
    },

    /// Fill in the summary form interactively
    Interactive,

    /// List the available summary styles
    Styles,

    /// Show the configuration, or write a default config file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
