//! Grant listing handler.

use crate::error::ApiError;
use crate::handlers::BearerToken;
use crate::response::Envelope;
use crate::state::AppState;
use accessgate_core::Grant;
use axum::extract::State;
use std::sync::Arc;

/// `GET /ListGrants`: grants held by the caller, empty when the caller
/// cannot be resolved.
pub async fn list_grants(
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
) -> Result<Envelope<Vec<Grant>>, ApiError> {
    let claims = state.validator.validate(&token).await?;
    let user_id = state.resolver.resolve(&claims).await;
    let grants = state.catalog.list_grants(user_id.as_ref()).await;
    Ok(Envelope(grants))
}
