//! RSA test keys and an IdP token builder for tests.

use crate::jwks::StaticKeySource;
use crate::oidc::IDENTITY_CONTEXT_CLAIM;
use chrono::{Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value, json};

/// Private half of the key published in [`JWKS_JSON`].
pub const SIGNING_KEY_PEM: &str = include_str!("../tests/fixtures/signing.pem");
/// A valid RSA key that is not in the published key set.
pub const ROGUE_KEY_PEM: &str = include_str!("../tests/fixtures/rogue.pem");
pub const JWKS_JSON: &str = include_str!("../tests/fixtures/jwks.json");

pub const TEST_KID: &str = "test-key-1";
pub const TEST_ISSUER: &str = "https://idp.example.com/oauth2/default";
pub const TEST_AUDIENCE: &str = "api://accessgate";
pub const TEST_SUBJECT: &str = "jdoe@example.com";

pub fn jwks() -> JwkSet {
    serde_json::from_str(JWKS_JSON).expect("fixture JWKS")
}

pub fn static_key_source() -> StaticKeySource {
    StaticKeySource::new(jwks())
}

/// Builder for IdP-style bearer tokens.
pub struct TokenBuilder {
    claims: Map<String, Value>,
    kid: Option<String>,
    key_pem: &'static str,
    algorithm: Algorithm,
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBuilder {
    /// A token that passes validation with [`TEST_AUDIENCE`].
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("iss".into(), json!(TEST_ISSUER));
        claims.insert("sub".into(), json!(TEST_SUBJECT));
        claims.insert("aud".into(), json!(TEST_AUDIENCE));
        claims.insert("iat".into(), json!(now.timestamp()));
        claims.insert("exp".into(), json!((now + Duration::minutes(5)).timestamp()));

        Self {
            claims,
            kid: Some(TEST_KID.to_string()),
            key_pem: SIGNING_KEY_PEM,
            algorithm: Algorithm::RS256,
        }
    }

    pub fn subject(self, subject: &str) -> Self {
        self.claim("sub", json!(subject))
    }

    pub fn audience(self, audience: &str) -> Self {
        self.claim("aud", json!(audience))
    }

    pub fn expires_at(self, exp: i64) -> Self {
        self.claim("exp", json!(exp))
    }

    pub fn expired(self) -> Self {
        let exp = (Utc::now() - Duration::minutes(10)).timestamp();
        self.expires_at(exp)
    }

    pub fn identity_context(self, context: &str) -> Self {
        self.claim(IDENTITY_CONTEXT_CLAIM, json!(context))
    }

    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_string);
        self
    }

    /// Sign with a key the IdP never published, keeping the published `kid`.
    pub fn forged(mut self) -> Self {
        self.key_pem = ROGUE_KEY_PEM;
        self
    }

    /// Sign with HS256 using a guessable secret instead of the RSA key.
    pub fn symmetric(mut self) -> Self {
        self.algorithm = Algorithm::HS256;
        self
    }

    pub fn sign(self) -> String {
        let mut header = Header::new(self.algorithm);
        header.kid = self.kid;

        let key = match self.algorithm {
            Algorithm::HS256 => EncodingKey::from_secret(b"secret"),
            _ => EncodingKey::from_rsa_pem(self.key_pem.as_bytes()).expect("fixture RSA key"),
        };
        encode(&header, &Value::Object(self.claims), &key).expect("sign test token")
    }
}
