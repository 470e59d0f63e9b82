//! Token validation and credential exchange for AccessGate.
//!
//! Validates IdP bearer tokens against the published key set, resolves the
//! caller to a directory user, lists their grants and walks the exchange
//! chain that ends in grant-scoped storage credentials and a console link.

pub mod catalog;
pub mod console;
pub mod exchange;
pub mod identity;
pub mod jwks;
pub mod jwt;
pub mod oidc;
pub mod providers;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use catalog::GrantCatalog;
pub use console::{ConsoleLinkBuilder, SESSION_DURATION_SECS};
pub use exchange::CredentialExchanger;
pub use identity::IdentityResolver;
pub use jwks::{JwksKeySource, KeySource, StaticKeySource};
pub use jwt::{TokenValidator, bearer_token};
pub use providers::{AwsServices, FederationSignin, load_sdk_config};
