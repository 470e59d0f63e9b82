//! Credential fetch handler.

use crate::error::ApiError;
use crate::handlers::BearerToken;
use crate::response::Envelope;
use crate::state::AppState;
use accessgate_core::{Permission, TemporaryCredentials, ValidationError};
use axum::extract::{Query, State, rejection::QueryRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct FetchCredentialsParams {
    #[serde(rename = "Permission")]
    pub permission: Option<String>,
    #[serde(rename = "Scope")]
    pub scope: Option<String>,
}

impl FetchCredentialsParams {
    fn require(value: Option<String>, name: &'static str) -> Result<String, ValidationError> {
        value
            .filter(|v| !v.is_empty())
            .ok_or(ValidationError::MissingParameter(name))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FetchCredentialsResponse {
    pub credentials: TemporaryCredentials,
    pub matched_grant_target: String,
    pub permission: Permission,
    pub console_url: String,
}

/// `GET /FetchCredentials?Permission=..&Scope=..`
pub async fn fetch_credentials(
    BearerToken(token): BearerToken,
    State(state): State<Arc<AppState>>,
    params: Result<Query<FetchCredentialsParams>, QueryRejection>,
) -> Result<Envelope<FetchCredentialsResponse>, ApiError> {
    state.validator.validate(&token).await?;

    let params = params.map(|Query(p)| p).unwrap_or_default();
    let permission: Permission =
        FetchCredentialsParams::require(params.permission, "Permission")?.parse()?;
    let scope = FetchCredentialsParams::require(params.scope, "Scope")?;

    let scoped = state.exchanger.exchange(&token, &scope, permission).await?;
    let console_url = state
        .console
        .build_url(
            &scoped.credentials,
            &scoped.target.bucket,
            scoped.target.prefix.as_deref(),
        )
        .await?;

    info!(%permission, "Credentials fetched");
    Ok(Envelope(FetchCredentialsResponse {
        credentials: scoped.credentials,
        matched_grant_target: scoped.matched_grant_target,
        permission: scoped.permission,
        console_url,
    }))
}
