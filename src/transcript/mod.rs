use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

use crate::Result;

/// One caption line as delivered by the transcript provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Display duration in seconds
    pub duration: f64,
}

/// Source of video captions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the default-language caption track for a video
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Extract the video id from a watch link.
///
/// Takes whatever follows the first `v=` up to the next `&`. The link is not
/// otherwise validated, so `youtu.be/` style links yield `None`.
pub fn extract_video_id(link: &str) -> Option<&str> {
    let (_, rest) = link.split_once("v=")?;
    Some(match rest.find('&') {
        Some(end) => &rest[..end],
        None => rest,
    })
}

/// Join caption segments into one transcript, in timestamp order
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    let mut ordered: Vec<&TranscriptSegment> = segments.iter().collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    ordered
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
