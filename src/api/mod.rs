use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::pipeline::FanOutPipeline;
use crate::sinks::KeywordCounter;

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FanOutPipeline>,
    pub counter: Arc<KeywordCounter>,
}

pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handlers::search_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        // Static index page
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors)
}
