//! Error types for AccessGate.
//!
//! Every variant here stays on the server side. The API boundary collapses
//! all of them into one generic response so a caller cannot tell which link
//! of the trust chain rejected it.

use std::time::Duration;
use thiserror::Error;

/// Failures while authenticating the bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Audience mismatch")]
    InvalidAudience,

    #[error("Token expired")]
    Expired,
}

/// Missing or unusable request parameters.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unsupported permission: {0}")]
    InvalidPermission(String),
}

/// Identity resolution failures. Never fatal: callers degrade to "no grants".
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Username claim {0} missing from token")]
    MissingUsernameClaim(String),

    #[error("No directory user named {0}")]
    UserNotFound(String),

    #[error("Directory lookup failed: {0}")]
    Directory(#[from] ServiceError),
}

/// Failures anywhere in the multi-hop credential exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("OIDC token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Identity context unavailable: {0}")]
    MissingIdentityContext(String),

    #[error("Transient role assumption failed: {0}")]
    RoleAssumption(String),

    #[error("Data access request failed: {0}")]
    DataAccess(String),

    #[error("Invalid grant target: {0}")]
    InvalidTarget(String),

    #[error("Console link construction failed: {0}")]
    ConsoleLink(String),
}

/// Error reported by an upstream service adapter.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },

    #[error("{service} response missing {field}")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },
}

impl ServiceError {
    pub fn request(service: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Request {
            service,
            message: message.into(),
        }
    }

    pub fn missing(service: &'static str, field: &'static str) -> Self {
        ServiceError::MissingField { service, field }
    }
}

/// Top-level error propagated to the request boundary.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Request exceeded {0:?}")]
    Timeout(Duration),
}

impl BrokerError {
    /// Short label for the failing stage, safe for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerError::Auth(_) => "auth",
            BrokerError::Validation(_) => "validation",
            BrokerError::Exchange(_) => "exchange",
            BrokerError::UnknownResource(_) => "routing",
            BrokerError::Timeout(_) => "timeout",
        }
    }
}
