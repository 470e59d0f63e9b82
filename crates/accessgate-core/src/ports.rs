//! Port traits (hexagonal architecture).
//!
//! These traits are the only way the pipeline reaches external services.
//! Production adapters live in `accessgate-auth`; tests substitute doubles.

use crate::credentials::{DataAccess, TemporaryCredentials};
use crate::error::ServiceError;
use crate::grant::{Grant, Permission};
use crate::ids::DirectoryUserId;
use async_trait::async_trait;
use std::fmt;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Directory lookup by unique attribute.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Find the user whose `userName` equals `user_name`.
    /// Returns `Ok(None)` when the directory has no such user.
    async fn find_user_id(
        &self,
        identity_store_id: &str,
        user_name: &str,
    ) -> ServiceResult<Option<DirectoryUserId>>;
}

/// Storage-control grant listing and data-access minting.
#[async_trait]
pub trait AccessGrantsService: Send + Sync {
    /// List grants held by a directory user, one page of at most `max_results`.
    async fn list_grants(
        &self,
        account_id: &str,
        grantee: &DirectoryUserId,
        max_results: i32,
    ) -> ServiceResult<Vec<Grant>>;

    /// Mint credentials for one target, signing the request with `credentials`
    /// rather than the broker's own identity.
    async fn get_data_access(
        &self,
        credentials: &TemporaryCredentials,
        account_id: &str,
        target: &str,
        permission: Permission,
    ) -> ServiceResult<DataAccess>;
}

/// OIDC token exchange for a trusted application.
#[async_trait]
pub trait TokenExchangeService: Send + Sync {
    /// Exchange an IdP assertion and return the issued ID token.
    async fn create_token_with_iam(
        &self,
        client_id: &str,
        grant_type: &str,
        assertion: &str,
    ) -> ServiceResult<String>;
}

/// Parameters for assuming the transient role.
#[derive(Clone)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub context_provider_arn: String,
    pub context_assertion: String,
}

impl fmt::Debug for AssumeRoleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssumeRoleRequest")
            .field("role_arn", &self.role_arn)
            .field("session_name", &self.session_name)
            .field("context_provider_arn", &self.context_provider_arn)
            .field("context_assertion", &"<redacted>")
            .finish()
    }
}

/// Short-term credential assumption.
#[async_trait]
pub trait RoleAssumptionService: Send + Sync {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> ServiceResult<TemporaryCredentials>;
}

/// Federation sign-in token issuance.
#[async_trait]
pub trait SigninService: Send + Sync {
    /// Exchange temporary credentials for a console sign-in token.
    async fn signin_token(
        &self,
        credentials: &TemporaryCredentials,
        session_duration_secs: u32,
    ) -> ServiceResult<String>;
}
