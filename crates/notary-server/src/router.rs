use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all notary endpoints.
///
/// Upload bodies larger than `max_upload_size` are cut off while streaming,
/// which the upload path treats as a transport fault.
pub fn build_router(state: AppState, max_upload_size: usize) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/documents", post(handler::upload_handler))
        .route("/v1/documents/:id", get(handler::query_handler))
        .route("/v1/documents/:id/verify", get(handler::verify_handler))
        .route("/v1/documents/:id/commit", post(handler::recommit_handler))
        .layer(RequestBodyLimitLayer::new(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
