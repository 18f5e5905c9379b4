//! `serve`: run the HTTP API until interrupted.

use anyhow::{anyhow, Result};
use clap::Args;
use tracing::info;

use crate::adapters::http::{HttpConfig, HttpServer};
use crate::domain::models::Config;
use crate::infrastructure::setup::build_app_repository;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);

    let repository = build_app_repository(&config).await?;
    let server = HttpServer::new(repository, HttpConfig::from(&config.server));

    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("HTTP server failed: {e}"))
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
