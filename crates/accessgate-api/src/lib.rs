//! HTTP API for the AccessGate credential broker.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::{ACCESS_DENIED, ApiError};
pub use response::Envelope;
pub use routes::create_router;
pub use state::{AppState, Ports};
