use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::session::{self, Action, Session};
use crate::transcript::{self, TranscriptProvider};
use crate::{Result, SummaryError};

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiGenerator;
pub use prompt::build_prompt;

/// Generative-text model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> String;
}

/// Session after a summarize attempt, plus what went wrong if anything
#[derive(Debug)]
pub struct SummaryOutcome {
    pub session: Session,
    pub error: Option<SummaryError>,
}

/// Link → transcript → prompt → model pipeline
pub struct SummaryWorkflow {
    transcripts: Box<dyn TranscriptProvider>,
    generator: Box<dyn TextGenerator>,
    show_progress: bool,
}

impl SummaryWorkflow {
    pub fn new(transcripts: Box<dyn TranscriptProvider>, generator: Box<dyn TextGenerator>) -> Self {
        Self {
            transcripts,
            generator,
            show_progress: true,
        }
    }

    /// Hide the busy spinners
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Run the Summarize action against `session`.
    ///
    /// Every failure hides the summary section; only a successful generation
    /// stores a new summary.
    pub async fn summarize(&self, session: Session) -> SummaryOutcome {
        match self.run(&session).await {
            Ok(summary) => {
                let session = session::reduce(session, Action::SummaryReady(summary));
                tracing::info!(
                    "Summary ready: {} words (style: {})",
                    session.actual_word_count,
                    session.selected_summary_type
                );
                SummaryOutcome { session, error: None }
            }
            Err(error) => {
                let action = match error {
                    SummaryError::InvalidInput(_) => Action::ValidationFailed,
                    _ => Action::SummaryFailed,
                };
                SummaryOutcome {
                    session: session::reduce(session, action),
                    error: Some(error),
                }
            }
        }
    }

    async fn run(&self, session: &Session) -> std::result::Result<String, SummaryError> {
        session::validate(session)?;

        let transcript = self
            .fetch_transcript(&session.video_link)
            .await
            .map_err(|source| {
                tracing::warn!("Transcript retrieval failed: {:#}", source);
                SummaryError::TranscriptFailed {
                    detail: format!("{:#}", source),
                    source,
                }
            })?;

        let prompt = build_prompt(
            &transcript,
            session.selected_summary_type,
            session.word_limit(),
        );

        let spinner = self.spinner("Generating summary...");
        let result = self.generator.generate(&prompt).await;
        spinner.finish_and_clear();

        result.map_err(|source| {
            tracing::error!(
                "Summarization with {} failed: {:#}",
                self.generator.model_name(),
                source
            );
            SummaryError::SummarizationFailed { source }
        })
    }

    async fn fetch_transcript(&self, link: &str) -> Result<String> {
        let video_id = transcript::extract_video_id(link)
            .ok_or_else(|| anyhow::anyhow!("No 'v=' video id found in link: {}", link))?;

        tracing::info!(
            "Fetching transcript for video {} from {}",
            video_id,
            self.transcripts.provider_name()
        );

        let spinner = self.spinner("Fetching transcript...");
        let segments = self.transcripts.fetch_transcript(video_id).await;
        spinner.finish_and_clear();
        let segments = segments?;

        if let Some(last) = segments.last() {
            tracing::debug!(
                "Fetched {} caption segments covering {}",
                segments.len(),
                crate::utils::format_duration(last.start + last.duration)
            );
        }

        let transcript = transcript::join_segments(&segments);
        if transcript.trim().is_empty() {
            anyhow::bail!("Transcript is empty for video {}", video_id);
        }

        Ok(transcript)
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SummaryStyle, ValidationError};
    use crate::transcript::{MockTranscriptProvider, TranscriptSegment};
    use mockall::predicate::eq;

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment {
                text: "and then".to_string(),
                start: 2.0,
                duration: 1.0,
            },
            TranscriptSegment {
                text: "first we".to_string(),
                start: 0.0,
                duration: 2.0,
            },
        ]
    }

    fn form(link: &str, style: SummaryStyle) -> Session {
        [Action::SetLink(link.to_string()), Action::SelectStyle(style)]
            .into_iter()
            .fold(Session::default(), session::reduce)
    }

    fn untouched_providers() -> (MockTranscriptProvider, MockTextGenerator) {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_fetch_transcript().never();
        transcripts.expect_provider_name().return_const("mock");
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();
        generator.expect_model_name().return_const("mock-model".to_string());
        (transcripts, generator)
    }

    fn workflow(transcripts: MockTranscriptProvider, generator: MockTextGenerator) -> SummaryWorkflow {
        SummaryWorkflow::new(Box::new(transcripts), Box::new(generator)).quiet()
    }

    #[tokio::test]
    async fn test_concise_without_limit_end_to_end() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_provider_name().return_const("mock");
        transcripts
            .expect_fetch_transcript()
            .with(eq("ABC123"))
            .times(1)
            .returning(|_| Ok(segments()));

        let mut generator = MockTextGenerator::new();
        generator.expect_model_name().return_const("mock-model".to_string());
        generator
            .expect_generate()
            .withf(|prompt: &str| {
                prompt.contains("first we and then")
                    && prompt.contains(SummaryStyle::Concise.instruction())
                    && prompt.contains("comprehensive but concise")
                    && !prompt.contains("words or less")
            })
            .times(1)
            .returning(|_| Ok("The video covers  three\nkey ideas.".to_string()));

        let session = form("https://www.youtube.com/watch?v=ABC123&t=5s", SummaryStyle::Concise);
        let outcome = workflow(transcripts, generator).summarize(session).await;

        assert!(outcome.error.is_none());
        assert!(outcome.session.show_summary_section);
        assert_eq!(outcome.session.summary_text, "The video covers  three\nkey ideas.");
        assert_eq!(outcome.session.actual_word_count, 6);
    }

    #[tokio::test]
    async fn test_word_limit_reaches_prompt() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_provider_name().return_const("mock");
        transcripts
            .expect_fetch_transcript()
            .returning(|_| Ok(segments()));

        let mut generator = MockTextGenerator::new();
        generator.expect_model_name().return_const("mock-model".to_string());
        generator
            .expect_generate()
            .withf(|prompt: &str| prompt.contains("300 words or less."))
            .times(1)
            .returning(|_| Ok("short".to_string()));

        let session = [Action::SetUseWordLimit(true), Action::SetWordLimitValue(300)]
            .into_iter()
            .fold(form("https://www.youtube.com/watch?v=x", SummaryStyle::Balanced), session::reduce);
        let outcome = workflow(transcripts, generator).summarize(session).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.session.actual_word_count, 1);
    }

    #[tokio::test]
    async fn test_empty_link_makes_no_calls() {
        let (transcripts, generator) = untouched_providers();
        let outcome = workflow(transcripts, generator)
            .summarize(Session::default())
            .await;

        assert!(matches!(
            outcome.error,
            Some(SummaryError::InvalidInput(ValidationError::EmptyLink))
        ));
        assert!(!outcome.session.show_summary_section);
    }

    #[tokio::test]
    async fn test_small_word_limit_makes_no_calls() {
        let (transcripts, generator) = untouched_providers();
        let session = [Action::SetUseWordLimit(true), Action::SetWordLimitValue(20)]
            .into_iter()
            .fold(form("https://www.youtube.com/watch?v=x", SummaryStyle::Casual), session::reduce);

        let outcome = workflow(transcripts, generator).summarize(session).await;
        assert!(matches!(
            outcome.error,
            Some(SummaryError::InvalidInput(ValidationError::WordLimitTooSmall(20)))
        ));
    }

    #[tokio::test]
    async fn test_transcript_failure_shows_detail() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_provider_name().return_const("mock");
        transcripts
            .expect_fetch_transcript()
            .returning(|_| Err(anyhow::anyhow!("Subtitles are disabled for video x")));
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let mut session = form("https://www.youtube.com/watch?v=x", SummaryStyle::Balanced);
        session = session::reduce(session, Action::SummaryReady("previous".to_string()));

        let outcome = workflow(transcripts, generator).summarize(session).await;
        let message = outcome.error.expect("should fail").to_string();

        assert!(message.starts_with("Failed to fetch transcript."));
        assert!(message.contains("Subtitles are disabled for video x"));
        assert!(!outcome.session.show_summary_section);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_not_summarized() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_provider_name().return_const("mock");
        transcripts
            .expect_fetch_transcript()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let session = form("https://www.youtube.com/watch?v=quiet", SummaryStyle::Balanced);
        let outcome = workflow(transcripts, generator).summarize(session).await;

        let message = outcome.error.expect("should fail").to_string();
        assert!(message.starts_with("Failed to fetch transcript."));
        assert!(message.contains("Transcript is empty"));
        assert!(!outcome.session.show_summary_section);
    }

    #[tokio::test]
    async fn test_blank_segments_are_not_summarized() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_provider_name().return_const("mock");
        transcripts.expect_fetch_transcript().returning(|_| {
            Ok(vec![TranscriptSegment {
                text: "   ".to_string(),
                start: 0.0,
                duration: 1.0,
            }])
        });
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let session = form("https://www.youtube.com/watch?v=blank", SummaryStyle::Casual);
        let outcome = workflow(transcripts, generator).summarize(session).await;
        assert!(matches!(outcome.error, Some(SummaryError::TranscriptFailed { .. })));
    }

    #[tokio::test]
    async fn test_link_without_video_id() {
        let (transcripts, generator) = untouched_providers();
        let session = form("https://youtu.be/dQw4w9WgXcQ", SummaryStyle::Balanced);

        let outcome = workflow(transcripts, generator).summarize(session).await;
        assert!(matches!(outcome.error, Some(SummaryError::TranscriptFailed { .. })));
    }

    #[tokio::test]
    async fn test_summarization_failure_hides_detail() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_provider_name().return_const("mock");
        transcripts
            .expect_fetch_transcript()
            .returning(|_| Ok(segments()));
        let mut generator = MockTextGenerator::new();
        generator.expect_model_name().return_const("mock-model".to_string());
        generator
            .expect_generate()
            .returning(|_| Err(anyhow::anyhow!("Gemini API error 429: quota exceeded")));

        let session = form("https://www.youtube.com/watch?v=x", SummaryStyle::Detailed);
        let outcome = workflow(transcripts, generator).summarize(session).await;
        let error = outcome.error.expect("should fail");

        assert_eq!(error.to_string(), "Error during summarization.");
        // cause kept for diagnostics
        let source = std::error::Error::source(&error).expect("source");
        assert!(source.to_string().contains("quota exceeded"));
        assert!(!outcome.session.show_summary_section);
        assert_eq!(outcome.session.actual_word_count, 0);
    }
}
