//! Adapters binding the service ports to AWS.

pub mod aws;
pub mod federation;

pub use aws::{
    AwsServices, IdentityStoreDirectory, S3ControlAccessGrants, SsoOidcTokenExchange,
    StsRoleAssumption, load_sdk_config,
};
pub use federation::FederationSignin;
