//! Temporary credentials produced along the exchange chain.

use crate::grant::{GrantTarget, Permission};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Short-lived key triple issued by the credential-assumption service or the
/// storage-control service.
#[derive(Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Signed assertion naming the resolved directory user, taken from the
/// exchanged ID token and handed to role assumption as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityContext(String);

impl IdentityContext {
    pub fn new(assertion: impl Into<String>) -> Self {
        Self(assertion.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityContext(<redacted>)")
    }
}

/// Raw result of a data-access request.
#[derive(Debug, Clone)]
pub struct DataAccess {
    pub credentials: TemporaryCredentials,
    pub matched_grant_target: String,
}

/// Final credentials, bound to exactly one grant target and permission.
#[derive(Debug, Clone)]
pub struct ScopedCredentials {
    pub credentials: TemporaryCredentials,
    pub matched_grant_target: String,
    pub permission: Permission,
    pub target: GrantTarget,
}
