//! Request handlers for the six pipeline endpoints.
//!
//! Every handler authenticates the bearer token, validates input
//! locally, then delegates to `mnema-pipeline`. Responses use
//! camelCase keys throughout.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use mnema_core::defaults::MIN_QUERY_CHARS;
use mnema_core::{ContentAnalysis, ImageAnalysis, QueryAnswer, RelevanceResult, Suggestion};
use mnema_pipeline::endpoints::media::TranscriptionOutcome;
use mnema_pipeline::endpoints::search::VectorSearchHit;
use mnema_pipeline::endpoints::{analyze, media, query as query_ep, search, suggestions as sugg};

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// AUTH & VALIDATION
// =============================================================================

/// Resolve the caller from the `Authorization: Bearer` header.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let identity = state.collab.identity.verify(token).await?;
    Ok(identity.caller_id)
}

/// Reject queries shorter than the minimum before any pipeline work.
fn validate_query(query: &str) -> Result<(), ApiError> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Err(ApiError::bad_request(format!(
            "Query must be at least {} characters",
            MIN_QUERY_CHARS
        )));
    }
    Ok(())
}

/// Nil UUIDs are a client bug, not a lookup miss.
fn validate_id(name: &str, id: Uuid) -> Result<(), ApiError> {
    if id.is_nil() {
        return Err(ApiError::bad_request(format!("{} must not be nil", name)));
    }
    Ok(())
}

fn validate_item(req: &ItemRequest) -> Result<(), ApiError> {
    validate_id("scopeId", req.scope_id)?;
    validate_id("candidateId", req.candidate_id)
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub scope_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub scope_id: Uuid,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub candidate_id: Uuid,
    pub scope_id: Uuid,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// GET /health
///
/// Reports "degraded" when any model backend fails its health check;
/// the server itself stays up since every endpoint has a fallback
/// path.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (generation, perception, speech) = tokio::join!(
        state.collab.generation.health_check(),
        state.collab.perception.health_check(),
        state.collab.speech.health_check(),
    );
    let generation = generation.unwrap_or(false);
    let perception = perception.unwrap_or(false);
    let speech = speech.unwrap_or(false);

    let status = if generation && perception && speech {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "backends": {
            "generation": generation,
            "perception": perception,
            "speech": speech,
        },
    }))
}

/// POST /api/v1/query
pub async fn query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryAnswer>, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_id("scopeId", req.scope_id)?;
    validate_query(&req.query)?;

    let answer = query_ep::run_query(&state.collab, caller_id, req.scope_id, &req.query).await?;
    info!(scope_id = %req.scope_id, sources = answer.sources.len(), "Query answered");
    Ok(Json(answer))
}

/// POST /api/v1/search/semantic
pub async fn semantic_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_id("scopeId", req.scope_id)?;
    validate_query(&req.query)?;

    let results: Vec<RelevanceResult> = search::run_semantic_search(
        &state.collab,
        caller_id,
        req.scope_id,
        &req.query,
        req.limit,
    )
    .await?;
    info!(scope_id = %req.scope_id, result_count = results.len(), "Semantic search complete");
    Ok(Json(json!({ "results": results })))
}

/// POST /api/v1/search/vector
pub async fn vector_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_id("scopeId", req.scope_id)?;
    validate_query(&req.query)?;

    let results: Vec<VectorSearchHit> = search::run_vector_search(
        &state.collab,
        caller_id,
        req.scope_id,
        &req.query,
        req.limit,
    )
    .await?;
    info!(scope_id = %req.scope_id, result_count = results.len(), "Vector search complete");
    Ok(Json(json!({ "results": results })))
}

/// POST /api/v1/suggestions
pub async fn suggestions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_item(&req)?;

    let items: Vec<Suggestion> =
        sugg::run_suggestions(&state.collab, caller_id, req.scope_id, req.candidate_id).await?;
    Ok(Json(json!({ "suggestions": items })))
}

/// POST /api/v1/analyze/content
pub async fn analyze_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<ContentAnalysis>, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_item(&req)?;

    let analysis =
        analyze::run_content_analysis(&state.collab, caller_id, req.scope_id, req.candidate_id)
            .await?;
    Ok(Json(analysis))
}

/// POST /api/v1/analyze/image
pub async fn analyze_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<ImageAnalysis>, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_item(&req)?;

    let analysis =
        media::run_image_analysis(&state.collab, caller_id, req.scope_id, req.candidate_id)
            .await?;
    Ok(Json(analysis))
}

fn transcription_response(outcome: TranscriptionOutcome) -> Response {
    match outcome {
        TranscriptionOutcome::Complete(payload) => (StatusCode::OK, Json(payload)).into_response(),
        TranscriptionOutcome::Pending { job_id } => (
            StatusCode::ACCEPTED,
            Json(json!({ "jobId": job_id, "status": "IN_PROGRESS" })),
        )
            .into_response(),
    }
}

/// POST /api/v1/transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller_id = authenticate(&state, &headers).await?;
    let Json(req) = body?;
    validate_item(&req)?;

    let outcome =
        media::run_transcription(&state.collab, caller_id, req.scope_id, req.candidate_id).await?;
    Ok(transcription_response(outcome))
}

/// GET /api/v1/transcribe/:job_id
///
/// Job ids are opaque upstream handles with no stored owner mapping,
/// so any authenticated caller may poll any job. Fine for the
/// single-token deployment in `main.rs`; a multi-user identity
/// provider would need a job-to-owner record here.
pub async fn poll_transcription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    authenticate(&state, &headers).await?;

    let outcome = media::poll_transcription(&state.collab, &job_id).await?;
    Ok(transcription_response(outcome))
}
