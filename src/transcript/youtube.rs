use anyhow::{anyhow, Context};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::json;

use super::{TranscriptProvider, TranscriptSegment};
use crate::config::TranscriptConfig;
use crate::Result;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";

/// Client identity sent to Innertube
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// YouTube caption fetcher using the watch page and the Innertube player API
pub struct YoutubeTranscriptProvider {
    client: reqwest::Client,
    language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: TracklistRenderer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

impl YoutubeTranscriptProvider {
    pub fn new(config: &TranscriptConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT_LANGUAGE,
                    reqwest::header::HeaderValue::from_static("en-US"),
                );
                headers
            });

        if let Some(proxy) = &config.proxy {
            tracing::debug!("Routing YouTube requests through proxy: {}", proxy);
            builder = builder.proxy(
                reqwest::Proxy::all(proxy.as_str())
                    .with_context(|| format!("Invalid proxy URL: {}", proxy))?,
            );
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            language: config.language.clone(),
        })
    }

    /// Fetch the watch page and pull the Innertube API key out of it
    async fn fetch_api_key(&self, video_id: &str) -> Result<String> {
        let url = format!("{}?v={}", WATCH_URL, urlencoding::encode(video_id));
        tracing::debug!("Fetching watch page: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("YouTube watch page returned HTTP {}", response.status());
        }
        let html = response.text().await?;

        extract_api_key(&html)
    }

    /// Ask the player endpoint for the video's caption tracks
    async fn fetch_caption_tracks(&self, video_id: &str, api_key: &str) -> Result<Vec<CaptionTrack>> {
        let url = format!("{}?key={}", INNERTUBE_PLAYER_URL, api_key);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "context": {
                    "client": {
                        "clientName": INNERTUBE_CLIENT_NAME,
                        "clientVersion": INNERTUBE_CLIENT_VERSION,
                    }
                },
                "videoId": video_id,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("YouTube player API returned HTTP {}", response.status());
        }

        let player: PlayerResponse = response
            .json()
            .await
            .context("Unexpected YouTube player response")?;

        caption_tracks(player, video_id)
    }

    /// Download and parse one caption track
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>> {
        let url = track.base_url.replace("&fmt=srv3", "");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Caption download returned HTTP {}", response.status());
        }
        let xml = response.text().await?;

        parse_timedtext(&xml)
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        if video_id.trim().is_empty() {
            anyhow::bail!("Empty video id");
        }

        let api_key = self.fetch_api_key(video_id).await?;
        let tracks = self.fetch_caption_tracks(video_id, &api_key).await?;
        let track = select_track(&tracks, &self.language)?;

        tracing::info!(
            "Using {} caption track '{}' for video {}",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code,
            video_id
        );

        let segments = self.fetch_track(track).await?;
        if segments.is_empty() {
            anyhow::bail!("Caption track for video {} is empty", video_id);
        }

        Ok(segments)
    }

    fn provider_name(&self) -> &'static str {
        "YouTube"
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    if html.contains("action=\"https://consent.youtube.com/s\"") {
        anyhow::bail!("YouTube requires cookie consent for this request");
    }
    if html.contains("class=\"g-recaptcha\"") {
        anyhow::bail!("YouTube is blocking requests from this IP (captcha requested)");
    }

    let re = Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| anyhow!("Could not find Innertube API key in watch page"))
}

fn caption_tracks(player: PlayerResponse, video_id: &str) -> Result<Vec<CaptionTrack>> {
    if let Some(status) = &player.playability_status {
        if status.status != "OK" {
            anyhow::bail!(
                "Video {} is unplayable ({}): {}",
                video_id,
                status.status,
                status.reason.as_deref().unwrap_or("no reason given")
            );
        }
    }

    let tracks = player
        .captions
        .map(|c| c.player_captions_tracklist_renderer.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        anyhow::bail!("Subtitles are disabled for video {}", video_id);
    }

    Ok(tracks)
}

/// Prefer a manually created track over an auto-generated one
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Result<&'a CaptionTrack> {
    let matches = |t: &&CaptionTrack| t.language_code.eq_ignore_ascii_case(language);

    tracks
        .iter()
        .filter(matches)
        .find(|t| !t.is_generated())
        .or_else(|| tracks.iter().find(matches))
        .ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            anyhow!(
                "No transcript found for language '{}' (available: {})",
                language,
                available.join(", ")
            )
        })
}

/// Parse timedtext XML into segments sorted by start time
fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>> {
    let selector = Selector::parse("text").map_err(|e| anyhow!("Invalid selector: {}", e))?;
    let document = Html::parse_fragment(xml);

    let mut segments: Vec<TranscriptSegment> = document
        .select(&selector)
        .filter_map(|element| {
            // Caption text is HTML escaped inside the XML, so parse it once more
            let markup: String = element.text().collect();
            let text: String = Html::parse_fragment(&markup).root_element().text().collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment {
                text: text.to_string(),
                start: seconds_attr(&element, "start"),
                duration: seconds_attr(&element, "dur"),
            })
        })
        .collect();

    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok(segments)
}

fn seconds_attr(element: &ElementRef<'_>, name: &str) -> f64 {
    element
        .value()
        .attr(name)
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(0.0)
}
