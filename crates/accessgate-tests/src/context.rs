//! Router wired to doubles, with access to every double's counters.

use crate::doubles::{FakeAccessGrants, FakeDirectory, FakeRoles, FakeSignin, FakeTokenExchange};
use crate::fixtures::test_config;
use crate::helpers::{TestResponse, send};
use accessgate_api::{AppState, Ports, create_router};
use accessgate_auth::KeySource;
use accessgate_auth::test_util::static_key_source;
use accessgate_core::ports::SigninService;
use accessgate_core::{BrokerConfig, DirectoryUserId, Grant};
use axum::Router;
use axum::http::Method;
use std::sync::Arc;
use std::sync::atomic::Ordering;

pub struct TestBroker {
    pub config: BrokerConfig,
    pub directory: Arc<FakeDirectory>,
    pub access_grants: Arc<FakeAccessGrants>,
    pub token_exchange: Arc<FakeTokenExchange>,
    pub roles: Arc<FakeRoles>,
    pub signin: Arc<FakeSignin>,
    router: Router,
}

impl TestBroker {
    pub fn builder() -> TestBrokerBuilder {
        TestBrokerBuilder::default()
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, authorization).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
    ) -> TestResponse {
        send(self.router.clone(), method, uri, authorization).await
    }

    /// Calls made along the credential exchange chain.
    pub fn exchange_calls(&self) -> usize {
        self.token_exchange.calls.load(Ordering::SeqCst)
            + self.roles.calls.load(Ordering::SeqCst)
            + self.access_grants.data_access_calls.load(Ordering::SeqCst)
            + self.signin.calls.load(Ordering::SeqCst)
    }

    /// Calls made to any upstream service.
    pub fn upstream_calls(&self) -> usize {
        self.exchange_calls()
            + self.directory.calls.load(Ordering::SeqCst)
            + self.access_grants.list_calls.load(Ordering::SeqCst)
    }
}

pub struct TestBrokerBuilder {
    config: BrokerConfig,
    directory: FakeDirectory,
    access_grants: FakeAccessGrants,
    token_exchange: FakeTokenExchange,
    roles: FakeRoles,
    keys: Option<Arc<dyn KeySource>>,
    signin: Option<Arc<dyn SigninService>>,
}

impl Default for TestBrokerBuilder {
    fn default() -> Self {
        Self {
            config: test_config(),
            directory: FakeDirectory::default(),
            access_grants: FakeAccessGrants::default(),
            token_exchange: FakeTokenExchange::default(),
            roles: FakeRoles::default(),
            keys: None,
            signin: None,
        }
    }
}

impl TestBrokerBuilder {
    pub fn config(mut self, configure: impl FnOnce(&mut BrokerConfig)) -> Self {
        configure(&mut self.config);
        self
    }

    /// Enroll `user_name` in the directory.
    pub fn user(mut self, user_name: &str, user_id: &str) -> Self {
        self.directory
            .users
            .insert(user_name.to_string(), DirectoryUserId::new(user_id));
        self
    }

    pub fn grants(mut self, grants: Vec<Grant>) -> Self {
        self.access_grants.grants = grants;
        self
    }

    pub fn matched_target(mut self, target: &str) -> Self {
        self.access_grants.matched_target = Some(target.to_string());
        self
    }

    pub fn failing_directory(mut self) -> Self {
        self.directory.fail = true;
        self
    }

    pub fn failing_grant_listing(mut self) -> Self {
        self.access_grants.fail_listing = true;
        self
    }

    pub fn rejecting_token_exchange(mut self) -> Self {
        self.token_exchange.reject = true;
        self
    }

    pub fn failing_role_assumption(mut self) -> Self {
        self.roles.fail = true;
        self
    }

    pub fn keys(mut self, keys: Arc<dyn KeySource>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Replace the sign-in double, e.g. with a real client against a mock.
    pub fn signin(mut self, signin: Arc<dyn SigninService>) -> Self {
        self.signin = Some(signin);
        self
    }

    pub fn build(self) -> TestBroker {
        let directory = Arc::new(self.directory);
        let access_grants = Arc::new(self.access_grants);
        let token_exchange = Arc::new(self.token_exchange);
        let roles = Arc::new(self.roles);
        let signin = Arc::new(FakeSignin::default());

        let ports = Ports {
            keys: self
                .keys
                .unwrap_or_else(|| Arc::new(static_key_source()) as Arc<dyn KeySource>),
            directory: directory.clone(),
            access_grants: access_grants.clone(),
            token_exchange: token_exchange.clone(),
            roles: roles.clone(),
            signin: self
                .signin
                .unwrap_or_else(|| signin.clone() as Arc<dyn SigninService>),
        };
        let router = create_router(Arc::new(AppState::new(&self.config, ports)));

        TestBroker {
            config: self.config,
            directory,
            access_grants,
            token_exchange,
            roles,
            signin,
            router,
        }
    }
}
