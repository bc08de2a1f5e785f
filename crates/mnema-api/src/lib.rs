//! # mnema-api
//!
//! HTTP API server for mnema: routing, bearer-token authentication,
//! request validation, and translation of pipeline errors into the
//! client-facing status taxonomy.

pub mod error;
pub mod handlers;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use mnema_pipeline::Collaborators;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub collab: Collaborators,
}

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically across
/// log lines.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router with all endpoints and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/query", post(handlers::query))
        .route("/api/v1/search/semantic", post(handlers::semantic_search))
        .route("/api/v1/search/vector", post(handlers::vector_search))
        .route("/api/v1/suggestions", post(handlers::suggestions))
        .route("/api/v1/analyze/content", post(handlers::analyze_content))
        .route("/api/v1/analyze/image", post(handlers::analyze_image))
        .route("/api/v1/transcribe", post(handlers::transcribe))
        .route("/api/v1/transcribe/:job_id", get(handlers::poll_transcription))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]),
        )
        // JSON-only bodies; 1 MB is generous.
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}
