//! Request handlers organized by resource.

pub mod credentials;
pub mod grants;
pub mod health;

use crate::error::ApiError;
use accessgate_auth::bearer_token;
use accessgate_core::{AuthError, BrokerError};
use axum::{
    extract::FromRequestParts,
    http::{Uri, header, request::Parts},
};

/// Raw token from the `Authorization` header, with or without a `Bearer` scheme.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

/// Any path other than the two resources.
pub async fn unknown_resource(uri: Uri) -> ApiError {
    BrokerError::UnknownResource(uri.path().to_string()).into()
}

/// A known resource reached with a method other than GET.
pub async fn method_not_allowed(uri: Uri) -> ApiError {
    BrokerError::UnknownResource(uri.path().to_string()).into()
}
