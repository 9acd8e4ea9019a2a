//! YouTube Summary - A Rust CLI tool for summarizing YouTube videos
//!
//! This library fetches a video's captions, asks a Gemini model for a summary in a
//! chosen style and length, and exports the result as plain text or PDF.

pub mod cli;
pub mod config;
pub mod output;
pub mod session;
pub mod summarize;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use session::{reduce, Action, Session, SummaryStyle};
pub use summarize::{SummaryOutcome, SummaryWorkflow, TextGenerator};
pub use transcript::{TranscriptProvider, TranscriptSegment};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Ways the Summarize action can fail.
///
/// The message is what the user sees; the source keeps the underlying cause.
#[derive(thiserror::Error, Debug)]
pub enum SummaryError {
    #[error(transparent)]
    InvalidInput(#[from] session::ValidationError),

    #[error("Failed to fetch transcript. Please ensure the link is valid and the video has public English subtitles. Error: {detail}")]
    TranscriptFailed {
        detail: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Error during summarization.")]
    SummarizationFailed {
        #[source]
        source: anyhow::Error,
    },
}

impl SummaryError {
    /// Input problems are shown as warnings, everything else as errors
    pub fn is_warning(&self) -> bool {
        matches!(self, SummaryError::InvalidInput(_))
    }
}
