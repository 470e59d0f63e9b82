//! AWS SDK adapters for the directory, storage-control, token exchange and
//! role assumption ports.

use accessgate_core::ports::{
    AccessGrantsService, AssumeRoleRequest, DirectoryService, RoleAssumptionService,
    ServiceResult, TokenExchangeService,
};
use accessgate_core::{
    DataAccess, DirectoryUserId, Grant, Permission, ServiceError, TemporaryCredentials,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_identitystore::types::{AlternateIdentifier, UniqueAttribute};
use aws_sdk_s3control::types::GranteeType;
use aws_sdk_sts::types::ProvidedContext;
use aws_smithy_types::Document;
use aws_smithy_types::error::display::DisplayErrorContext;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

const IDENTITY_STORE: &str = "identitystore";
const S3_CONTROL: &str = "s3control";
const SSO_OIDC: &str = "sso-oidc";
const STS: &str = "sts";

/// Directory attribute matched against the username claim.
const USER_NAME_ATTRIBUTE_PATH: &str = "userName";

/// Provider name recorded on credentials built from transient role output.
const TRANSIENT_PROVIDER_NAME: &str = "accessgate-transient";

/// Load the shared SDK configuration for `region` from the environment.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

fn sdk_error<E>(service: &'static str, err: E) -> ServiceError
where
    E: std::error::Error,
{
    ServiceError::request(service, DisplayErrorContext(err).to_string())
}

fn to_chrono(time: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

/// Identity store lookups by `userName`.
pub struct IdentityStoreDirectory {
    client: aws_sdk_identitystore::Client,
}

impl IdentityStoreDirectory {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_identitystore::Client::new(config),
        }
    }
}

#[async_trait]
impl DirectoryService for IdentityStoreDirectory {
    async fn find_user_id(
        &self,
        identity_store_id: &str,
        user_name: &str,
    ) -> ServiceResult<Option<DirectoryUserId>> {
        let attribute = UniqueAttribute::builder()
            .attribute_path(USER_NAME_ATTRIBUTE_PATH)
            .attribute_value(Document::String(user_name.to_string()))
            .build()
            .map_err(|e| sdk_error(IDENTITY_STORE, e))?;

        let result = self
            .client
            .get_user_id()
            .identity_store_id(identity_store_id)
            .alternate_identifier(AlternateIdentifier::UniqueAttribute(attribute))
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(DirectoryUserId::new(output.user_id()))),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(sdk_error(IDENTITY_STORE, err)),
        }
    }
}

/// S3 Access Grants listing and data-access minting.
pub struct S3ControlAccessGrants {
    client: aws_sdk_s3control::Client,
    config: SdkConfig,
}

impl S3ControlAccessGrants {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3control::Client::new(config),
            config: config.clone(),
        }
    }

    /// Client that signs with `credentials` instead of the broker's identity.
    fn client_for(&self, credentials: &TemporaryCredentials) -> aws_sdk_s3control::Client {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            credentials.expiration.map(SystemTime::from),
            TRANSIENT_PROVIDER_NAME,
        );
        let config = aws_sdk_s3control::config::Builder::from(&self.config)
            .credentials_provider(provider)
            .build();
        aws_sdk_s3control::Client::from_conf(config)
    }
}

#[async_trait]
impl AccessGrantsService for S3ControlAccessGrants {
    async fn list_grants(
        &self,
        account_id: &str,
        grantee: &DirectoryUserId,
        max_results: i32,
    ) -> ServiceResult<Vec<Grant>> {
        let output = self
            .client
            .list_access_grants()
            .account_id(account_id)
            .grantee_type(GranteeType::DirectoryUser)
            .grantee_identifier(grantee.as_str())
            .max_results(max_results)
            .send()
            .await
            .map_err(|e| sdk_error(S3_CONTROL, e))?;

        let grants = output
            .access_grants_list()
            .iter()
            .map(|entry| Grant {
                grantee_identifier: entry
                    .grantee()
                    .and_then(|g| g.grantee_identifier())
                    .unwrap_or_default()
                    .to_string(),
                permission: entry
                    .permission()
                    .map(|p| p.as_str())
                    .unwrap_or_default()
                    .to_string(),
                access_grants_location_id: entry
                    .access_grants_location_id()
                    .unwrap_or_default()
                    .into(),
                grant_scope: entry.grant_scope().unwrap_or_default().to_string(),
            })
            .collect::<Vec<_>>();

        debug!(count = grants.len(), "Listed access grants");
        Ok(grants)
    }

    async fn get_data_access(
        &self,
        credentials: &TemporaryCredentials,
        account_id: &str,
        target: &str,
        permission: Permission,
    ) -> ServiceResult<DataAccess> {
        let output = self
            .client_for(credentials)
            .get_data_access()
            .account_id(account_id)
            .target(target)
            .permission(aws_sdk_s3control::types::Permission::from(permission.as_str()))
            .send()
            .await
            .map_err(|e| sdk_error(S3_CONTROL, e))?;

        let issued = output
            .credentials()
            .ok_or_else(|| ServiceError::missing(S3_CONTROL, "Credentials"))?;
        let matched_grant_target = output
            .matched_grant_target()
            .ok_or_else(|| ServiceError::missing(S3_CONTROL, "MatchedGrantTarget"))?;

        Ok(DataAccess {
            credentials: TemporaryCredentials {
                access_key_id: issued
                    .access_key_id()
                    .ok_or_else(|| ServiceError::missing(S3_CONTROL, "AccessKeyId"))?
                    .to_string(),
                secret_access_key: issued
                    .secret_access_key()
                    .ok_or_else(|| ServiceError::missing(S3_CONTROL, "SecretAccessKey"))?
                    .to_string(),
                session_token: issued
                    .session_token()
                    .ok_or_else(|| ServiceError::missing(S3_CONTROL, "SessionToken"))?
                    .to_string(),
                expiration: issued.expiration().and_then(to_chrono),
            },
            matched_grant_target: matched_grant_target.to_string(),
        })
    }
}

/// SSO OIDC `CreateTokenWithIAM`.
pub struct SsoOidcTokenExchange {
    client: aws_sdk_ssooidc::Client,
}

impl SsoOidcTokenExchange {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssooidc::Client::new(config),
        }
    }
}

#[async_trait]
impl TokenExchangeService for SsoOidcTokenExchange {
    async fn create_token_with_iam(
        &self,
        client_id: &str,
        grant_type: &str,
        assertion: &str,
    ) -> ServiceResult<String> {
        let output = self
            .client
            .create_token_with_iam()
            .client_id(client_id)
            .grant_type(grant_type)
            .assertion(assertion)
            .send()
            .await
            .map_err(|e| sdk_error(SSO_OIDC, e))?;

        output
            .id_token()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::missing(SSO_OIDC, "idToken"))
    }
}

/// STS `AssumeRole` with an identity context.
pub struct StsRoleAssumption {
    client: aws_sdk_sts::Client,
}

impl StsRoleAssumption {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(config),
        }
    }
}

#[async_trait]
impl RoleAssumptionService for StsRoleAssumption {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> ServiceResult<TemporaryCredentials> {
        let context = ProvidedContext::builder()
            .provider_arn(&request.context_provider_arn)
            .context_assertion(&request.context_assertion)
            .build();

        let output = self
            .client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .provided_contexts(context)
            .send()
            .await
            .map_err(|e| sdk_error(STS, e))?;

        let issued = output
            .credentials()
            .ok_or_else(|| ServiceError::missing(STS, "Credentials"))?;

        Ok(TemporaryCredentials {
            access_key_id: issued.access_key_id().to_string(),
            secret_access_key: issued.secret_access_key().to_string(),
            session_token: issued.session_token().to_string(),
            expiration: to_chrono(issued.expiration()),
        })
    }
}

/// All AWS-backed ports built from one SDK configuration.
pub struct AwsServices {
    pub directory: Arc<IdentityStoreDirectory>,
    pub access_grants: Arc<S3ControlAccessGrants>,
    pub token_exchange: Arc<SsoOidcTokenExchange>,
    pub roles: Arc<StsRoleAssumption>,
}

impl AwsServices {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            directory: Arc::new(IdentityStoreDirectory::new(config)),
            access_grants: Arc::new(S3ControlAccessGrants::new(config)),
            token_exchange: Arc::new(SsoOidcTokenExchange::new(config)),
            roles: Arc::new(StsRoleAssumption::new(config)),
        }
    }
}
