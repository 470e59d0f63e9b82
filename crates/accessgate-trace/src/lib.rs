//! Logging and OpenTelemetry setup for AccessGate.
//!
//! Installs a `tracing` subscriber with an `EnvFilter`, plain-text or JSON
//! line output, and an optional OTLP span exporter.

pub mod tracer;

pub use tracer::{LogFormat, TracerError, TracingConfig, init_tracer, shutdown_tracer};
