//! `folio serve` - run the catalog HTTP API.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::auth::StaticTokenVerifier;
use crate::catalog::Catalog;
use crate::config::{Config, StoreBackend};
use crate::constants::IMAGE_FETCH_TIMEOUT_SECS;
use crate::http::{self, AppState};
use crate::store::DocStore;

/// Start the server and block until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the store or HTTP
/// client cannot be created, or the address cannot be bound.
pub async fn execute(config_path: Option<&Path>, port_override: Option<u16>) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(port) = port_override {
        config.server.port = port;
    }

    super::init_logging(&config.logging);

    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let store = open_store(&config)?;
    let verifier = StaticTokenVerifier::from_config(&config.auth)?;
    info!(users = verifier.len(), "Loaded admin tokens");

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(IMAGE_FETCH_TIMEOUT_SECS))
        .build()
        .context("Failed to create HTTP client")?;

    let mut state =
        AppState::new(Catalog::new(store), Arc::new(verifier)).with_http_client(http_client);
    match http::metrics::install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!(error = %e, "Metrics disabled"),
    }

    let app = http::build_router(Arc::new(state), &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("folio listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

fn open_store(config: &Config) -> Result<DocStore> {
    match config.store.backend {
        StoreBackend::Redb => {
            let path = config.store_path()?;
            info!(path = %path.display(), "Opening document store");
            DocStore::file(&path)
                .with_context(|| format!("Failed to open store at {}", path.display()))
        },
        StoreBackend::Memory => {
            warn!("Using in-memory store; data will not survive a restart");
            Ok(DocStore::memory())
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
