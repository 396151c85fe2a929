//! HTTP API for route search and ranking.

pub mod request_id;
mod routes;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use routes::{RankRequest, RouteListResponse, SearchRequest};

/// Full application router with tracing, CORS and request ids applied.
pub fn app(state: Arc<AppState>) -> Router {
    routes::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id::with_request_id))
}
