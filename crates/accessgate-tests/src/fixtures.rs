//! Test fixtures for creating sample data.

use accessgate_core::{BrokerConfig, Grant};

pub const IDENTITY_STORE_ID: &str = "d-1234567890";
pub const ACCOUNT_ID: &str = "111111111111";
pub const DIRECTORY_USER_ID: &str = "94482488-3041-7026-18f3-be45837cd0e4";

/// Factory for access grants.
pub struct GrantFixture;

impl GrantFixture {
    pub fn new(scope: &str, permission: &str) -> Grant {
        Grant {
            grantee_identifier: DIRECTORY_USER_ID.to_string(),
            permission: permission.to_string(),
            access_grants_location_id: "default".into(),
            grant_scope: scope.to_string(),
        }
    }

    /// A read grant and a read-write grant on different prefixes.
    pub fn pair() -> Vec<Grant> {
        vec![
            Self::new("s3://bucket/team-a/*", "READ"),
            Self::new("s3://bucket/team-b/*", "READWRITE"),
        ]
    }
}

/// Broker configuration pointing at the test IdP.
pub fn test_config() -> BrokerConfig {
    BrokerConfig {
        audience: accessgate_auth::test_util::TEST_AUDIENCE.to_string(),
        identity_store_id: IDENTITY_STORE_ID.to_string(),
        token_exchange_app_arn: format!(
            "arn:aws:sso::{ACCOUNT_ID}:application/ssoins-1111111111111111/apl-1111111111111111"
        ),
        transient_role_arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/s3ag-transient"),
        jwks_url: "https://idp.example.com/oauth2/default/v1/keys".to_string(),
        account_id: ACCOUNT_ID.to_string(),
        ..Default::default()
    }
}
