//! Typed claims extracted from a validated identity token.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The `aud` claim, which IdPs emit either as a string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of an IdP token that passed signature and mandatory-claim checks.
///
/// Only the validator constructs this, so holding a `Claims` means the token
/// was genuine, unexpired and addressed to this deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: Audience,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Everything else, e.g. `preferred_username` from Entra ID.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Look up a string-valued claim by name, including the registered ones.
    pub fn string_claim(&self, name: &str) -> Option<&str> {
        match name {
            "sub" => Some(self.sub.as_str()),
            "iss" => Some(self.iss.as_str()),
            _ => self.extra.get(name).and_then(Value::as_str),
        }
    }
}
