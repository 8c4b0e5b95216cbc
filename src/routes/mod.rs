//! Router assembly: HTTP endpoints, rate limiting, CORS allow-list,
//! security headers, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;

pub mod http;

/// Inline styles are allowed, inline scripts are not; connect-src covers the
/// upstream API host. Served on every response.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; style-src 'self' 'unsafe-inline'; \
     script-src 'self'; img-src 'self' data:; connect-src 'self' https://api.anthropic.com";

/// Slightly above the 10MB upload cap so the multipart envelope fits and the
/// handler can answer the over-limit case itself.
const BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Build the application router with:
/// - REST API under `/api/...` plus `/health`
/// - Per-IP rate limiting (analysis/conversion/pdf buckets)
/// - CORS restricted to the configured allow-list (credentialed)
/// - Security headers on every response
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let origins = state.settings.allowed_origins();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origins.iter().any(|allowed| allowed == o))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(http::health))
        .route("/api/analyze", post(http::analyze))
        .route("/api/analyze-2ar", post(http::analyze_2ar))
        .route("/api/process-document", post(http::process_document))
        .route("/api/islenskubraut/pdf", get(http::flashcard_pdf))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), require_origin))
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-dns-prefetch-control"),
            HeaderValue::from_static("off"),
        ))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// In production, `/api` requests must carry an Origin header; requests
/// without one (curl, scripts) are only accepted in dev mode.
async fn require_origin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let is_api = request.uri().path().starts_with("/api/");
    if state.settings.production && is_api && request.headers().get(header::ORIGIN).is_none() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Uppruni beiðninnar er ekki leyfður." })),
        )
            .into_response();
    }
    next.run(request).await
}
