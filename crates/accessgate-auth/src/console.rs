//! Console sign-in links for a bucket/prefix view.

use accessgate_core::ports::SigninService;
use accessgate_core::{BrokerConfig, ExchangeError, TemporaryCredentials};
use std::sync::Arc;
use url::Url;

/// Console session lifetime requested from the federation endpoint (12 hours).
pub const SESSION_DURATION_SECS: u32 = 43_200;

/// Builds pre-authenticated console URLs from scoped credentials.
pub struct ConsoleLinkBuilder {
    signin: Arc<dyn SigninService>,
    federation_url: String,
    issuer: String,
    region: String,
}

impl ConsoleLinkBuilder {
    pub fn new(signin: Arc<dyn SigninService>, config: &BrokerConfig) -> Self {
        Self {
            signin,
            federation_url: config.federation_url.clone(),
            issuer: config.console_issuer.clone(),
            region: config.region.clone(),
        }
    }

    /// Obtain a sign-in token for `credentials` and wrap it in a login URL
    /// that lands on `bucket`, opened at `prefix` when one is given.
    pub async fn build_url(
        &self,
        credentials: &TemporaryCredentials,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<String, ExchangeError> {
        let token = self
            .signin
            .signin_token(credentials, SESSION_DURATION_SECS)
            .await
            .map_err(|e| ExchangeError::ConsoleLink(e.to_string()))?;

        let destination = self.destination(bucket, prefix)?;

        let mut url = Url::parse(&self.federation_url)
            .map_err(|e| ExchangeError::ConsoleLink(format!("Invalid federation URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("Action", "login")
            .append_pair("Issuer", &self.issuer)
            .append_pair("Destination", destination.as_str())
            .append_pair("SigninToken", &token);

        Ok(url.into())
    }

    fn destination(&self, bucket: &str, prefix: Option<&str>) -> Result<Url, ExchangeError> {
        let mut url = Url::parse(&format!(
            "https://{}.console.aws.amazon.com/s3/buckets/{}",
            self.region, bucket
        ))
        .map_err(|e| ExchangeError::ConsoleLink(format!("Invalid console destination: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("region", &self.region)
                .append_pair("bucketType", "general");
            if let Some(prefix) = prefix {
                query.append_pair("prefix", prefix);
            }
            query.append_pair("showversions", "false");
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgate_core::ServiceError;
    use accessgate_core::ports::ServiceResult;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeSignin {
        token: Option<&'static str>,
    }

    #[async_trait]
    impl SigninService for FakeSignin {
        async fn signin_token(
            &self,
            _credentials: &TemporaryCredentials,
            session_duration_secs: u32,
        ) -> ServiceResult<String> {
            assert_eq!(session_duration_secs, SESSION_DURATION_SECS);
            self.token
                .map(str::to_string)
                .ok_or_else(|| ServiceError::request("federation", "HTTP 400"))
        }
    }

    fn credentials() -> TemporaryCredentials {
        TemporaryCredentials {
            access_key_id: "ASIASCOPED".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
            expiration: None,
        }
    }

    fn builder(token: Option<&'static str>) -> ConsoleLinkBuilder {
        let config = BrokerConfig {
            region: "eu-west-1".to_string(),
            ..Default::default()
        };
        ConsoleLinkBuilder::new(Arc::new(FakeSignin { token }), &config)
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[tokio::test]
    async fn test_login_url_with_prefix() {
        let link = builder(Some("signin-abc"))
            .build_url(&credentials(), "bucket", Some("team-a/"))
            .await
            .unwrap();

        let url = Url::parse(&link).unwrap();
        assert_eq!(url.host_str(), Some("signin.aws.amazon.com"));
        assert_eq!(url.path(), "/federation");

        let params = query(&url);
        assert_eq!(params["Action"], "login");
        assert_eq!(params["Issuer"], "https://s3ag-workshop.local");
        assert_eq!(params["SigninToken"], "signin-abc");

        let destination = Url::parse(&params["Destination"]).unwrap();
        assert_eq!(
            destination.host_str(),
            Some("eu-west-1.console.aws.amazon.com")
        );
        assert_eq!(destination.path(), "/s3/buckets/bucket");
        let dest_params = query(&destination);
        assert_eq!(dest_params["region"], "eu-west-1");
        assert_eq!(dest_params["bucketType"], "general");
        assert_eq!(dest_params["prefix"], "team-a/");
        assert_eq!(dest_params["showversions"], "false");
    }

    #[tokio::test]
    async fn test_login_url_without_prefix() {
        let link = builder(Some("signin-abc"))
            .build_url(&credentials(), "bucket", None)
            .await
            .unwrap();

        let url = Url::parse(&link).unwrap();
        let destination = Url::parse(&query(&url)["Destination"]).unwrap();
        assert!(!query(&destination).contains_key("prefix"));
    }

    #[tokio::test]
    async fn test_signin_failure() {
        let err = builder(None)
            .build_url(&credentials(), "bucket", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ConsoleLink(_)));
    }
}
