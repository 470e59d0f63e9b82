//! Broker configuration.
//!
//! Built once at startup and shared read-only. Required fields default to an
//! empty string so that [`BrokerConfig::validate`] can report every missing
//! field at once instead of failing on the first.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Deployment parameters for the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Expected `aud` claim of inbound tokens.
    #[serde(default)]
    pub audience: String,
    /// Identity store holding directory users.
    #[serde(default)]
    pub identity_store_id: String,
    /// Claim carrying the directory user name (`sub` for Okta,
    /// `preferred_username` for Entra ID).
    #[serde(default = "default_username_attribute")]
    pub username_attribute: String,
    /// Application trusted to exchange IdP tokens.
    #[serde(default)]
    pub token_exchange_app_arn: String,
    /// Role assumed on behalf of the resolved identity.
    #[serde(default)]
    pub transient_role_arn: String,
    /// IdP key set endpoint.
    #[serde(default)]
    pub jwks_url: String,
    /// Account owning the access grants instance.
    #[serde(default)]
    pub account_id: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_federation_url")]
    pub federation_url: String,
    /// Issuer shown on the federated console login.
    #[serde(default = "default_console_issuer")]
    pub console_issuer: String,
    /// Page size for grant listing.
    #[serde(default = "default_max_grants")]
    pub max_grants: i32,
}

fn default_username_attribute() -> String {
    "sub".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

fn default_request_timeout() -> u64 {
    60
}

fn default_federation_url() -> String {
    "https://signin.aws.amazon.com/federation".to_string()
}

fn default_console_issuer() -> String {
    "https://s3ag-workshop.local".to_string()
}

fn default_max_grants() -> i32 {
    100
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            audience: String::new(),
            identity_store_id: String::new(),
            username_attribute: default_username_attribute(),
            token_exchange_app_arn: String::new(),
            transient_role_arn: String::new(),
            jwks_url: String::new(),
            account_id: String::new(),
            region: default_region(),
            listen_addr: default_listen_addr(),
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
            request_timeout_secs: default_request_timeout(),
            federation_url: default_federation_url(),
            console_issuer: default_console_issuer(),
            max_grants: default_max_grants(),
        }
    }
}

impl BrokerConfig {
    /// Check that every required field is present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("audience", &self.audience),
            ("identity_store_id", &self.identity_store_id),
            ("username_attribute", &self.username_attribute),
            ("token_exchange_app_arn", &self.token_exchange_app_arn),
            ("transient_role_arn", &self.transient_role_arn),
            ("jwks_url", &self.jwks_url),
            ("account_id", &self.account_id),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        if !(1..=1000).contains(&self.max_grants) {
            return Err(ConfigError::Invalid(format!(
                "max_grants must be between 1 and 1000, got {}",
                self.max_grants
            )));
        }
        Ok(())
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session name used for the transient role.
    pub fn transient_session_name(&self) -> String {
        format!("transient-s3ag-{}", self.identity_store_id)
    }
}
