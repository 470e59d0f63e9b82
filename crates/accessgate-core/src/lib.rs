//! AccessGate Core
//!
//! Domain types, error taxonomy, configuration and port traits shared by the
//! token validation and credential exchange pipeline. Every external service
//! the broker talks to is reached through a trait in [`ports`].

pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod grant;
pub mod ids;
pub mod ports;

pub use claims::{Audience, Claims};
pub use config::{BrokerConfig, ConfigError};
pub use credentials::{DataAccess, IdentityContext, ScopedCredentials, TemporaryCredentials};
pub use error::{
    AuthError, BrokerError, ExchangeError, ResolutionError, ServiceError, ValidationError,
};
pub use grant::{Grant, GrantTarget, Permission};
pub use ids::*;
