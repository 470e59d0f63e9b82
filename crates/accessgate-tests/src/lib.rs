//! End-to-end test infrastructure for AccessGate.
//!
//! Drives the real router with in-process doubles for every upstream
//! service. Doubles count their calls so tests can assert that a rejected
//! request never reached past the trust boundary.
//!
//! # Usage
//!
//! ```ignore
//! use accessgate_tests::TestBroker;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let broker = TestBroker::builder().user("jdoe@example.com", "u-1").build();
//!     let response = broker.get("/ListGrants", Some(&token)).await;
//! }
//! ```

pub mod context;
pub mod doubles;
pub mod fixtures;
pub mod helpers;

pub use context::{TestBroker, TestBrokerBuilder};
pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,accessgate=debug")),
        )
        .with_test_writer()
        .try_init();
}
