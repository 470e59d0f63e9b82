//! OIDC token exchange constants and exchanged ID token handling.

use accessgate_core::{ExchangeError, IdentityContext};
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

/// Grant type for exchanging an IdP assertion.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claim carrying the identity context in an exchanged ID token.
pub const IDENTITY_CONTEXT_CLAIM: &str = "sts:identity_context";

/// Context provider that vouches for identity contexts during role assumption.
pub const IDENTITY_CENTER_CONTEXT_PROVIDER: &str =
    "arn:aws:iam:aws::contextProvider/IdentityCenter";

#[derive(Debug, Deserialize)]
struct ExchangedIdToken {
    #[serde(rename = "sts:identity_context")]
    identity_context: Option<String>,
}

/// Read the identity context from an ID token returned by the token exchange.
///
/// The signature is not checked: the token arrives directly from the
/// exchange service over an authenticated channel and is never user input.
pub fn identity_context(id_token: &str) -> Result<IdentityContext, ExchangeError> {
    let header =
        decode_header(id_token).map_err(|e| ExchangeError::MissingIdentityContext(e.to_string()))?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token = decode::<ExchangedIdToken>(id_token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ExchangeError::MissingIdentityContext(e.to_string()))?;

    token
        .claims
        .identity_context
        .filter(|context| !context.is_empty())
        .map(IdentityContext::new)
        .ok_or_else(|| {
            ExchangeError::MissingIdentityContext(format!("{} claim absent", IDENTITY_CONTEXT_CLAIM))
        })
}
