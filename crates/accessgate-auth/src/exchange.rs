//! Multi-hop credential exchange.
//!
//! IdP token → exchanged ID token → identity context → transient role
//! credentials → data-access credentials for one grant target. Every hop
//! depends on the previous one and narrows what the holder can do. This
//! module performs no authorization of its own: the storage-control service
//! decides whether the resolved identity holds a matching grant.

use crate::oidc::{self, IDENTITY_CENTER_CONTEXT_PROVIDER, JWT_BEARER_GRANT_TYPE};
use accessgate_core::ports::{
    AccessGrantsService, AssumeRoleRequest, RoleAssumptionService, TokenExchangeService,
};
use accessgate_core::{BrokerConfig, ExchangeError, GrantTarget, Permission, ScopedCredentials};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns an IdP bearer token into scoped storage credentials.
pub struct CredentialExchanger {
    token_exchange: Arc<dyn TokenExchangeService>,
    roles: Arc<dyn RoleAssumptionService>,
    grants: Arc<dyn AccessGrantsService>,
    client_id: String,
    role_arn: String,
    session_name: String,
    account_id: String,
}

impl CredentialExchanger {
    pub fn new(
        token_exchange: Arc<dyn TokenExchangeService>,
        roles: Arc<dyn RoleAssumptionService>,
        grants: Arc<dyn AccessGrantsService>,
        config: &BrokerConfig,
    ) -> Self {
        Self {
            token_exchange,
            roles,
            grants,
            client_id: config.token_exchange_app_arn.clone(),
            role_arn: config.transient_role_arn.clone(),
            session_name: config.transient_session_name(),
            account_id: config.account_id.clone(),
        }
    }

    pub async fn exchange(
        &self,
        raw_token: &str,
        target: &str,
        permission: Permission,
    ) -> Result<ScopedCredentials, ExchangeError> {
        debug!("Exchanging IdP token with CreateTokenWithIAM");
        let id_token = self
            .token_exchange
            .create_token_with_iam(&self.client_id, JWT_BEARER_GRANT_TYPE, raw_token)
            .await
            .map_err(|e| ExchangeError::TokenExchange(e.to_string()))?;

        let context = oidc::identity_context(&id_token)?;

        let request = AssumeRoleRequest {
            role_arn: self.role_arn.clone(),
            session_name: self.session_name.clone(),
            context_provider_arn: IDENTITY_CENTER_CONTEXT_PROVIDER.to_string(),
            context_assertion: context.as_str().to_string(),
        };
        let transient = self
            .roles
            .assume_role(&request)
            .await
            .map_err(|e| ExchangeError::RoleAssumption(e.to_string()))?;
        info!(role_arn = %self.role_arn, "Assumed transient role");

        let access = self
            .grants
            .get_data_access(&transient, &self.account_id, target, permission)
            .await
            .map_err(|e| ExchangeError::DataAccess(e.to_string()))?;

        let parsed = GrantTarget::parse(&access.matched_grant_target)?;
        info!(
            matched_grant_target = %access.matched_grant_target,
            %permission,
            "Issued scoped credentials"
        );

        Ok(ScopedCredentials {
            credentials: access.credentials,
            matched_grant_target: access.matched_grant_target,
            permission,
            target: parsed,
        })
    }
}
