use std::time::Duration;

use eyre::{Result, eyre};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::watch_url;

pub const DEFAULT_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Upper bound on a single oEmbed request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Title and channel of a video, as reported by oEmbed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct OembedClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OembedClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Look up title and author for `video_id`
    pub async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let url = watch_url(video_id);
        debug!("Fetching oEmbed metadata for {url}");

        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url.as_str()), ("format", "json")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fields = body
            .as_object()
            .ok_or_else(|| eyre!("unexpected oEmbed response: expected a JSON object, got {body}"))?;

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: string_field(fields, "title"),
            channel: string_field(fields, "author_name"),
            url,
        })
    }
}

// Missing, null or non-string fields read as empty
fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}
