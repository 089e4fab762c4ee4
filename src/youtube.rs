use std::sync::LazyLock;

use async_trait::async_trait;
use eyre::{Result, WrapErr, bail};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::{Segment, Transcript, TranscriptSource};

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

static API_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("api key pattern compiles")
});

static API_KEY_FALLBACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("api key fallback pattern compiles")
});

static FORMATTING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Transcript source backed by YouTube's built-in captions via the InnerTube API
#[derive(Debug, Clone)]
pub struct CaptionClient {
    client: reqwest::Client,
    base_url: String,
    languages: Vec<String>,
}

impl CaptionClient {
    pub fn new(client: reqwest::Client, languages: Vec<String>) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL, languages)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            languages,
        }
    }

    /// Fetch the caption track for `video_id` in the first preferred language available
    pub async fn fetch_captions(&self, video_id: &str) -> Result<Transcript> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("{}/youtubei/v1/player?key={api_key}&prettyPrint=false", self.base_url);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .wrap_err("unexpected InnerTube player response")?;

        if let Some(status) = &resp.playability_status {
            let state = status.status.as_deref().unwrap_or("OK");
            if state != "OK" {
                let reason = status.reason.as_deref().unwrap_or(state);
                bail!("video {video_id} is unavailable: {reason}");
            }
        }

        let tracks = resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            bail!("transcripts are disabled for video {video_id}");
        }

        let Some(track) = select_track(&tracks, &self.languages) else {
            let available = tracks
                .iter()
                .map(|t| t.language_code.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "no transcript found for video {video_id} in languages [{}] (available: {available})",
                self.languages.join(", ")
            );
        };

        debug!(
            "Using caption track: lang={} generated={}",
            track.language_code,
            track.is_generated()
        );

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .client
            .get(track.base_url.replace("&fmt=srv3", ""))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_caption_xml(&caption_xml)?;

        Ok(Transcript {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            segments,
        })
    }
}

#[async_trait]
impl TranscriptSource for CaptionClient {
    async fn fetch(&self, video_id: &str) -> Result<Transcript> {
        self.fetch_captions(video_id).await
    }
}

/// Preferred languages are tried in order; within a language a manual track beats an auto-generated one.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut matching = tracks.iter().filter(|t| &t.language_code == lang);
        let first = matching.next()?;
        if first.is_generated() {
            matching.find(|t| !t.is_generated()).or(Some(first))
        } else {
            Some(first)
        }
    })
}

fn extract_api_key(html: &str) -> Result<String> {
    if let Some(caps) = API_KEY_PATTERN.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    if let Some(caps) = API_KEY_FALLBACK_PATTERN.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

fn clean_caption_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    FORMATTING_TAG.replace_all(&decoded, "").to_string()
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    // (start, duration, accumulated text) of the <text> element being read
    let mut current: Option<(f64, f64, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = 0.0;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().unwrap_or(0.0);
                        }
                        _ => {}
                    }
                }
                current = start.map(|s| (s, dur, String::new()));
            }
            Ok(Event::Text(ref e)) => {
                if let Some((_, _, buf)) = current.as_mut() {
                    match e.unescape() {
                        Ok(text) => buf.push_str(&text),
                        Err(err) => bail!("error decoding caption text: {err}"),
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                if let Some((start, duration, raw)) = current.take() {
                    let text = clean_caption_text(&raw);
                    if !text.is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(segments)
}
