use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::data_models::Message;
use crate::sinks::counter::CounterSnapshot;

use super::AppState;
use super::models::{HealthResponse, SearchParams};

/// `GET /search?q=...` answers with the fetched messages as soon as the
/// provider returns; the sinks keep running after the response is sent.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Message>>, (StatusCode, String)> {
    let raw = params.q.unwrap_or_default();

    let dispatch = state.pipeline.handle(&raw).await.map_err(|e| {
        tracing::warn!(query = %raw, "search failed, error: {:#}", e);
        (StatusCode::BAD_GATEWAY, format!("Search error: {}", e))
    })?;

    dispatch.sinks.detach();
    Ok(Json(dispatch.messages))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Json<CounterSnapshot> {
    Json(state.counter.snapshot())
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
