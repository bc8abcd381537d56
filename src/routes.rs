// HTTP surface: report endpoint behind a shared-key check

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::sampler::Sampler;
use crate::version::{NAME, VERSION};

#[derive(Clone)]
struct AppState {
    sampler: Sampler,
    config: AppConfig,
}

pub fn app(sampler: Sampler, config: AppConfig) -> Router {
    let state = AppState { sampler, config };
    Router::new()
        .route("/", get(|| async { "hoststat: host metrics agent" })) // GET /
        .route("/version", get(version_handler)) // GET /version
        .route("/stat", get(stat_handler)) // GET /stat
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

#[derive(Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

/// Clients may send the key as a `key` header or a `key` query parameter.
fn key_matches(expected: &str, headers: &HeaderMap, query: &KeyQuery) -> bool {
    let header_key = headers
        .get("key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let query_key = query.key.as_deref().unwrap_or("");
    header_key == expected || query_key == expected
}

/// GET /version — service name and version (from Cargo.toml at build time).
async fn version_handler() -> impl IntoResponse {
    axum::Json(json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /stat — one full sampling pass. The response keeps the legacy
/// `{success, data}` envelope, including its 500-on-bad-key quirk.
async fn stat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<KeyQuery>,
) -> impl IntoResponse {
    if !key_matches(&state.config.server.key, &headers, &query) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({"success": false, "data": "Api key Incorrect"})),
        );
    }
    match state.sampler.report().await {
        Ok(report) => (
            StatusCode::OK,
            axum::Json(json!({"success": true, "data": report})),
        ),
        Err(e) => {
            tracing::warn!(error = %e, operation = "get_report", "report collection failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({"success": false, "data": e.to_string()})),
            )
        }
    }
}
