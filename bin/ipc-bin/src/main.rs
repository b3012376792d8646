mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::cli::IpcCli;
use ipc_api::{AdminCredentials, ApiConfig, ApiService, AppState};
use ipc_source::{HttpDatasetSource, SourceConfig};

fn init_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Cancels `token` on Ctrl-C or SIGTERM.
fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Could not listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }
        tracing::info!("Shutdown signal received");
        token.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logger();

    let cli = IpcCli::parse();

    let source_config = SourceConfig {
        url: Url::parse(&cli.csv_url).context("Invalid IPC_CSV_URL")?,
        cache_dir: cli.cache_dir,
        cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
        fetch_timeout: Duration::from_secs(cli.fetch_timeout_secs),
    };
    tracing::info!(
        url = %source_config.url,
        cache_dir = %source_config.cache_dir.display(),
        ttl_secs = cli.cache_ttl_secs,
        "IPC dataset source configured"
    );
    let source = HttpDatasetSource::new(source_config).context("Could not build dataset source")?;

    let api_config = ApiConfig {
        admin: AdminCredentials {
            username: cli.admin_user,
            password: cli.admin_pass,
        },
        request_timeout: Duration::from_secs(cli.request_timeout_secs),
        cors_allowed_origins: cli.cors_allowed_origins,
    };
    if api_config.admin.password == "admin" {
        tracing::warn!("ADMIN_PASS is using the default value");
    }

    let app_state = AppState {
        source: Arc::new(source),
        config: Arc::new(api_config),
    };

    let token = CancellationToken::new();
    spawn_shutdown_listener(token.clone());

    ApiService::new(app_state, &cli.api_host, cli.api_port)
        .run(token)
        .await
}
