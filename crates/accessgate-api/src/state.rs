//! Application state shared across handlers.

use accessgate_auth::{
    ConsoleLinkBuilder, CredentialExchanger, GrantCatalog, IdentityResolver, KeySource,
    TokenValidator,
};
use accessgate_core::BrokerConfig;
use accessgate_core::ports::{
    AccessGrantsService, DirectoryService, RoleAssumptionService, SigninService,
    TokenExchangeService,
};
use std::sync::Arc;
use std::time::Duration;

/// Clients for every upstream service the pipeline calls.
#[derive(Clone)]
pub struct Ports {
    pub keys: Arc<dyn KeySource>,
    pub directory: Arc<dyn DirectoryService>,
    pub access_grants: Arc<dyn AccessGrantsService>,
    pub token_exchange: Arc<dyn TokenExchangeService>,
    pub roles: Arc<dyn RoleAssumptionService>,
    pub signin: Arc<dyn SigninService>,
}

/// Pipeline components, built once at startup and shared read-only.
pub struct AppState {
    pub validator: TokenValidator,
    pub resolver: IdentityResolver,
    pub catalog: GrantCatalog,
    pub exchanger: CredentialExchanger,
    pub console: ConsoleLinkBuilder,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &BrokerConfig, ports: Ports) -> Self {
        Self {
            validator: TokenValidator::new(config.audience.clone(), ports.keys),
            resolver: IdentityResolver::new(
                ports.directory,
                config.identity_store_id.clone(),
                config.username_attribute.clone(),
            ),
            catalog: GrantCatalog::new(
                ports.access_grants.clone(),
                config.account_id.clone(),
                config.max_grants,
            ),
            exchanger: CredentialExchanger::new(
                ports.token_exchange,
                ports.roles,
                ports.access_grants,
                config,
            ),
            console: ConsoleLinkBuilder::new(ports.signin, config),
            request_timeout: config.request_timeout(),
        }
    }
}
