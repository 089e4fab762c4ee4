pub mod config;
pub mod oembed;
pub mod output;
pub mod server;
pub mod youtube;

use std::sync::LazyLock;

use async_trait::async_trait;
use eyre::Result;
use regex::Regex;
use serde::Serialize;

/// A single captioned segment
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Transcript for a video, as returned by a [`TranscriptSource`]
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

/// Anything that can produce a transcript for a video ID
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Transcript>;
}

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})")
        .expect("url pattern compiles")
});

static BARE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9_-]{11})$").expect("bare id pattern compiles"));

/// Extract video ID from a `watch?v=`, `youtu.be` or `embed` URL.
///
/// Input that matches neither a known URL shape nor a bare 11-character ID is
/// returned unchanged.
pub fn extract_video_id(input: &str) -> &str {
    [&*URL_PATTERN, &*BARE_ID_PATTERN]
        .into_iter()
        .find_map(|re| re.captures(input).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
        .unwrap_or(input)
}

/// Canonical watch URL for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDS: &[&str] = &["dQw4w9WgXcQ", "a_b-C1d2E3f", "___________", "-----------"];

    #[test]
    fn test_bare_video_id() {
        for id in IDS {
            assert_eq!(extract_video_id(id), *id);
        }
    }

    #[test]
    fn test_watch_url() {
        for id in IDS {
            assert_eq!(extract_video_id(&format!("https://www.youtube.com/watch?v={id}")), *id);
        }
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_url() {
        for id in IDS {
            assert_eq!(extract_video_id(&format!("https://youtu.be/{id}")), *id);
        }
    }

    #[test]
    fn test_embed_url() {
        for id in IDS {
            assert_eq!(extract_video_id(&format!("https://www.youtube.com/embed/{id}")), *id);
        }
    }

    #[test]
    fn test_url_without_scheme() {
        assert_eq!(extract_video_id("youtu.be/dQw4w9WgXcQ?si=abc"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_unrecognized_input_passes_through() {
        for input in [
            "not-a-valid-id",
            "",
            "  dQw4w9WgXcQ  ",
            "dQw4w9WgXcQx",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://vimeo.com/123456",
        ] {
            assert_eq!(extract_video_id(input), input);
        }
    }

    #[test]
    fn test_canonical_watch_url() {
        assert_eq!(watch_url("dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
