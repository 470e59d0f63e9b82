//! Boundary translation of pipeline failures.

use crate::response::envelope;
use accessgate_core::{AuthError, BrokerError, ExchangeError, ValidationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Body text of every denied request.
pub const ACCESS_DENIED: &str = "Access denied";

/// Any failure that reaches the HTTP boundary.
///
/// Every variant renders the same 403 envelope; the cause only appears in
/// the server log.
#[derive(Debug)]
pub struct ApiError(pub BrokerError);

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(kind = self.0.kind(), error = %self.0, "Request denied");
        envelope(StatusCode::FORBIDDEN, ACCESS_DENIED)
    }
}
