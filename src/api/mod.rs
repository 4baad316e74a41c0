//! HTTP API for address resolution.

mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::resolver::AddressResolver;

pub use handlers::{
    health_handler, resolve_handler, search_handler, ApiError, HealthResponse, ResolveResponse,
    SearchResponse,
};

/// Application state shared across handlers
pub struct AppState {
    pub resolver: AddressResolver,
}

impl AppState {
    pub fn new(resolver: AddressResolver) -> Arc<Self> {
        Arc::new(Self { resolver })
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/address/resolve", post(resolve_handler))
        .route("/subzones/search", post(search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
