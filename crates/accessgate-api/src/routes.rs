//! API route definitions.

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, credentials, grants, health};
use crate::middleware::{cors_layer, deadline, request_id};
use crate::state::AppState;

/// Create the broker router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.request_timeout;
    Router::new()
        .route("/ListGrants", get(grants::list_grants))
        .route("/FetchCredentials", get(credentials::fetch_credentials))
        .route("/health", get(health::health))
        .fallback(handlers::unknown_resource)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(from_fn_with_state(request_timeout, deadline))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id))
        .layer(cors_layer())
        .with_state(state)
}
