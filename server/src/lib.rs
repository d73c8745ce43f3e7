pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod transient;
pub mod validation;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::upload_form).post(routes::upload_endpoint))
        .route("/health", get(routes::health_check))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
