//! Bearer token validation.

use crate::jwks::KeySource;
use accessgate_core::{AuthError, Claims};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Claims every accepted token must carry.
pub const REQUIRED_CLAIMS: [&str; 4] = ["exp", "iss", "sub", "aud"];

/// Verifies IdP-issued RS256 tokens against a key source.
pub struct TokenValidator {
    audience: String,
    keys: Arc<dyn KeySource>,
}

impl TokenValidator {
    pub fn new(audience: impl Into<String>, keys: Arc<dyn KeySource>) -> Self {
        Self {
            audience: audience.into(),
            keys,
        }
    }

    /// Verify the signature and mandatory claims of `token`.
    ///
    /// Claims are only decoded into [`Claims`] after the signature check, so
    /// nothing read from an unverified token ever leaves this function.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::Malformed(format!(
                "Unsupported algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| AuthError::Malformed("Missing key id".to_string()))?;

        let jwk = self.keys.find_key(kid).await?;
        let decoding_key =
            DecodingKey::from_jwk(&jwk).map_err(|e| AuthError::KeyUnavailable(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.set_audience(&[self.audience.as_str()]);
        validation.leeway = 0;

        let token_data = decode::<Value>(token, &decoding_key, &validation).map_err(map_jwt_error)?;
        let claims: Claims = serde_json::from_value(token_data.claims)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;

        // The library accepts exp == now; the token is dead at its expiry instant.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        debug!(iss = %claims.iss, kid, "Token validated");
        Ok(claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed(err.to_string()),
    }
}

/// Strip an optional `Bearer ` scheme from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let value = header_value.trim();
    let token = match value.get(..6) {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("bearer")
                && value[6..].chars().next().is_none_or(char::is_whitespace) =>
        {
            value[6..].trim()
        }
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}
