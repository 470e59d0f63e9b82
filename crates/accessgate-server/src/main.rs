//! AccessGate server entrypoint.

use accessgate_api::{AppState, Ports, create_router};
use accessgate_auth::{AwsServices, FederationSignin, JwksKeySource, load_sdk_config};
use accessgate_core::BrokerConfig;
use accessgate_trace::{LogFormat, TracingConfig};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

mod settings;

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "accessgate")]
#[command(author, version, about = "Brokers IdP tokens into scoped S3 Access Grants credentials", long_about = None)]
struct Cli {
    /// YAML, TOML or JSON configuration file.
    #[arg(short, long, env = "ACCESSGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configured one.
    #[arg(short, long)]
    listen: Option<String>,

    #[arg(long, value_enum, env = "ACCESSGATE_LOG_FORMAT", default_value = "text")]
    log_format: LogFormatArg,

    /// Export spans to this OTLP gRPC endpoint.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,
}

impl Cli {
    fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: match self.log_format {
                LogFormatArg::Text => LogFormat::Text,
                LogFormatArg::Json => LogFormat::Json,
            },
            otlp_endpoint: self.otlp_endpoint.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    accessgate_trace::init_tracer(&cli.tracing_config())?;

    let mut config = settings::load(cli.config.as_deref()).context("invalid configuration")?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    let result = serve(config).await;
    accessgate_trace::shutdown_tracer();
    result
}

async fn serve(config: BrokerConfig) -> anyhow::Result<()> {
    let sdk_config = load_sdk_config(&config.region).await;
    let aws = AwsServices::new(&sdk_config);

    let ports = Ports {
        keys: Arc::new(JwksKeySource::new(
            config.jwks_url.clone(),
            config.jwks_cache_ttl(),
        )),
        directory: aws.directory,
        access_grants: aws.access_grants,
        token_exchange: aws.token_exchange,
        roles: aws.roles,
        signin: Arc::new(FederationSignin::new(config.federation_url.clone())),
    };

    let state = Arc::new(AppState::new(&config, ports));
    let app = create_router(state);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(
        addr = %config.listen_addr,
        region = %config.region,
        username_attribute = %config.username_attribute,
        "AccessGate listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AccessGate stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        let waiting = tokio::spawn(shutdown_signal());
        // Let the task register its signal handlers.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .expect("shutdown on SIGTERM")
            .unwrap();
    }
}
