//! HTTP surface: `/transcript`, `/metadata` and `/health`.
//!
//! Handlers are stateless. Every upstream failure is flattened into a
//! `400 {"error": "..."}` body carrying the failure's description.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use eyre::{Result, eyre};
use log::{info, warn};
use serde::Serialize;

use crate::oembed::{OembedClient, VideoMetadata};
use crate::{Transcript, TranscriptSource, extract_video_id, output};

const MISSING_VIDEO_ID: &str = "Missing video ID parameter \"v\"";

/// Read-only collaborators shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub transcripts: Arc<dyn TranscriptSource>,
    pub oembed: OembedClient,
    pub transcript_timeout: Duration,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn missing_video_id() -> Self {
        Self::bad_request(MISSING_VIDEO_ID)
    }
}

impl From<eyre::Report> for ApiError {
    fn from(err: eyre::Report) -> Self {
        Self::bad_request(format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Query string as ordered pairs; a repeated key resolves to its first value
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn first(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn video_ref(&self) -> &str {
        self.first("v").unwrap_or_default()
    }

    fn timestamps(&self) -> bool {
        self.first("timestamps")
            .is_some_and(|t| t.eq_ignore_ascii_case("true"))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Self(pairs))
    }
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    video_id: String,
    transcript: String,
    segments: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/transcript", get(transcript))
        .route("/metadata", get(metadata))
        .route("/health", get(health))
        .with_state(state)
}

async fn transcript(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<TranscriptResponse>> {
    let video_id = extract_video_id(params.video_ref());
    if video_id.is_empty() {
        return Err(ApiError::missing_video_id());
    }
    let timestamps = params.timestamps();
    info!("GET /transcript video_id={video_id} timestamps={timestamps}");

    let transcript = fetch_transcript(&state, video_id)
        .await
        .inspect_err(|e| warn!("Transcript fetch failed for {video_id}: {e:#}"))?;

    info!(
        "Fetched {} segments for {video_id} (lang={})",
        transcript.segments.len(),
        transcript.language
    );

    Ok(Json(TranscriptResponse {
        video_id: video_id.to_string(),
        transcript: output::render(&transcript.segments, timestamps),
        segments: transcript.segments.len(),
    }))
}

async fn fetch_transcript(state: &AppState, video_id: &str) -> Result<Transcript> {
    match tokio::time::timeout(state.transcript_timeout, state.transcripts.fetch(video_id)).await {
        Ok(result) => result,
        Err(_) => Err(eyre!("transcript fetch timed out after {:?}", state.transcript_timeout)),
    }
}

async fn metadata(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<VideoMetadata>> {
    let video_id = extract_video_id(params.video_ref());
    if video_id.is_empty() {
        return Err(ApiError::missing_video_id());
    }
    info!("GET /metadata video_id={video_id}");

    let metadata = state
        .oembed
        .fetch_metadata(video_id)
        .await
        .inspect_err(|e| warn!("oEmbed lookup failed for {video_id}: {e:#}"))?;

    Ok(Json(metadata))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
