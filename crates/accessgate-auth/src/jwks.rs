//! IdP signing keys.
//!
//! The key set is fetched from the IdP's published JWKS endpoint and cached
//! for a fixed TTL. A token naming a `kid` that is not in the cached set
//! triggers one refresh, which covers IdP key rotation.

use accessgate_core::AuthError;
use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of token signing keys.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Return the key with id `kid`.
    async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError>;
}

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: Arc<JwkSet>,
    expires_at: Instant,
}

/// HTTP-backed key source with a TTL cache.
pub struct JwksKeySource {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    cache: DashMap<String, CachedJwks>,
}

impl JwksKeySource {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), url, ttl)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            ttl,
            cache: DashMap::new(),
        }
    }

    async fn get_jwks(&self) -> Result<Arc<JwkSet>, AuthError> {
        let cached = self
            .cache
            .get(&self.url)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.jwks.clone());

        match cached {
            Some(jwks) => Ok(jwks),
            None => self.refresh().await,
        }
    }

    async fn refresh(&self) -> Result<Arc<JwkSet>, AuthError> {
        debug!(url = %self.url, "Fetching JWKS");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AuthError::KeyUnavailable(e.to_string()))?;

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeyUnavailable(format!("Failed to parse JWKS: {}", e)))?;

        let jwks = Arc::new(jwks);
        self.cache.insert(
            self.url.clone(),
            CachedJwks {
                jwks: jwks.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(jwks)
    }
}

#[async_trait]
impl KeySource for JwksKeySource {
    async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(key) = jwks.find(kid) {
            return Ok(key.clone());
        }

        debug!(kid, "Key id not in cached JWKS, refreshing");
        let jwks = self.refresh().await?;
        jwks.find(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyUnavailable(format!("No key with id {}", kid)))
    }
}

/// Fixed key set, for tests and air-gapped deployments.
pub struct StaticKeySource {
    jwks: JwkSet,
}

impl StaticKeySource {
    pub fn new(jwks: JwkSet) -> Self {
        Self { jwks }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        self.jwks
            .find(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyUnavailable(format!("No key with id {}", kid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JWKS_JSON: &str = include_str!("../tests/fixtures/jwks.json");

    fn jwks_body() -> serde_json::Value {
        serde_json::from_str(JWKS_JSON).unwrap()
    }

    #[tokio::test]
    async fn test_caches_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
            .expect(1)
            .mount(&server)
            .await;

        let source = JwksKeySource::new(format!("{}/keys", server.uri()), Duration::from_secs(60));
        source.find_key("test-key-1").await.unwrap();
        source.find_key("test-key-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_refreshes_on_unknown_kid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
            .expect(2)
            .mount(&server)
            .await;

        let source = JwksKeySource::new(format!("{}/keys", server.uri()), Duration::from_secs(60));
        source.find_key("test-key-1").await.unwrap();
        let err = source.find_key("rotated-away").await.unwrap_err();
        assert!(matches!(err, AuthError::KeyUnavailable(_)));
    }

    #[tokio::test]
    async fn test_expired_cache_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
            .expect(2)
            .mount(&server)
            .await;

        let source = JwksKeySource::new(format!("{}/keys", server.uri()), Duration::ZERO);
        source.find_key("test-key-1").await.unwrap();
        source.find_key("test-key-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_is_key_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = JwksKeySource::new(format!("{}/keys", server.uri()), Duration::from_secs(60));
        let err = source.find_key("test-key-1").await.unwrap_err();
        assert!(matches!(err, AuthError::KeyUnavailable(_)));
    }
}
