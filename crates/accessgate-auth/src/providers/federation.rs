//! Federation endpoint sign-in tokens.

use accessgate_core::ports::{ServiceResult, SigninService};
use accessgate_core::{ServiceError, TemporaryCredentials};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const FEDERATION: &str = "federation";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Session<'a> {
    session_id: &'a str,
    session_key: &'a str,
    session_token: &'a str,
}

#[derive(Deserialize)]
struct SigninTokenResponse {
    #[serde(rename = "SigninToken")]
    signin_token: String,
}

/// `Action=getSigninToken` against the federation endpoint.
pub struct FederationSignin {
    client: reqwest::Client,
    url: String,
}

impl FederationSignin {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SigninService for FederationSignin {
    async fn signin_token(
        &self,
        credentials: &TemporaryCredentials,
        session_duration_secs: u32,
    ) -> ServiceResult<String> {
        let session = serde_json::to_string(&Session {
            session_id: &credentials.access_key_id,
            session_key: &credentials.secret_access_key,
            session_token: &credentials.session_token,
        })
        .map_err(|e| ServiceError::request(FEDERATION, e.to_string()))?;
        let duration = session_duration_secs.to_string();

        debug!(url = %self.url, "Requesting federation sign-in token");
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("Action", "getSigninToken"),
                ("SessionDuration", duration.as_str()),
                ("Session", session.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::request(FEDERATION, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::request(
                FEDERATION,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: SigninTokenResponse = response
            .json()
            .await
            .map_err(|_| ServiceError::missing(FEDERATION, "SigninToken"))?;
        Ok(body.signin_token)
    }
}
