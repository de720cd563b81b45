//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the service endpoints besides `POST /chat`,
//! and the master definition for the OpenAPI specification.

use crate::web::{
    chat,
    playground::PLAYGROUND_HTML,
    protocol::{ChatRequestBody, ChatResponseBody, ErrorBody, HealthResponse, UsageBody},
    state::AppState,
};
use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json},
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use utoipa::OpenApi;

/// Header values never echoed back by `/debug`.
const REDACTED_HEADERS: [&str; 2] = ["authorization", "cookie"];

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        health_handler,
        debug_handler,
        playground_handler,
        chat::chat_handler,
    ),
    components(
        schemas(ChatRequestBody, ChatResponseBody, UsageBody, ErrorBody, HealthResponse)
    ),
    tags(
        (name = "Sungura API", description = "Gateway between the Sungura study app and the LLM provider.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "The service is up", body = String))
)]
pub async fn root_handler() -> &'static str {
    "Sungura API is running 🐰"
}

/// Health status, including whether the provider key is configured.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>, uri: Uri) -> impl IntoResponse {
    let body = HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        api_key_set: app_state.config.api_key_set(),
        url: uri.to_string(),
    };
    (StatusCode::OK, Json(body))
}

/// Diagnostic echo of configuration flags and the incoming request.
///
/// Unauthenticated; credential headers are redacted.
#[utoipa::path(
    get,
    path = "/debug",
    responses((status = 200, description = "Diagnostic information"))
)]
pub async fn debug_handler(
    State(app_state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    OriginalUri(original_uri): OriginalUri,
    headers: HeaderMap,
) -> Json<Value> {
    let mut echoed = Map::new();
    for (name, value) in headers.iter() {
        let value = if REDACTED_HEADERS.contains(&name.as_str()) {
            "[redacted]".to_string()
        } else {
            value.to_str().unwrap_or("[non-ascii]").to_string()
        };
        echoed.insert(name.as_str().to_string(), Value::String(value));
    }

    Json(json!({
        "env": app_state.config.app_env,
        "apiKeySet": app_state.config.api_key_set(),
        "persistenceEnabled": app_state.persistence_enabled(),
        "headers": echoed,
        "url": uri.to_string(),
        "method": method.as_str(),
        "originalUrl": original_uri.to_string(),
    }))
}

/// A minimal browser page for trying the chat endpoint by hand.
#[utoipa::path(
    get,
    path = "/chat",
    responses((status = 200, description = "HTML test page", content_type = "text/html"))
)]
pub async fn playground_handler() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(PLAYGROUND_HTML),
    )
}
