//! labelraster server: authenticated upscale and batch rasterization
//! endpoints over HTTP.
//!
//! Configuration via environment variables:
//! - `RUST_LOG`: log filter (e.g. `info`, `labelraster=debug`). Defaults to `info`.
//! - `LABELRASTER_HOST`: bind address. Defaults to `0.0.0.0`.
//! - `LABELRASTER_PORT`: bind port. Defaults to `3000`.
//! - `LABELRASTER_RASTER_URL`: the external ZPL rendering endpoint (required).
//! - `LABELRASTER_API_TOKENS`: `token=principal` pairs, comma separated (required).
//! - `LABELRASTER_HD`: set to `1` for high-density mode (lower concurrency).

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use labelraster::raster::{BatchConfig, ClientConfig, HttpRasterizer};
use labelraster::service::auth::TokenMap;
use labelraster::service::{AppState, router};

const HOST_ENV_VAR: &str = "LABELRASTER_HOST";
const PORT_ENV_VAR: &str = "LABELRASTER_PORT";
const RASTER_URL_ENV_VAR: &str = "LABELRASTER_RASTER_URL";
const TOKENS_ENV_VAR: &str = "LABELRASTER_API_TOKENS";
const HD_ENV_VAR: &str = "LABELRASTER_HD";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = std::env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port_str = std::env::var(PORT_ENV_VAR).unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let port = port_str
        .parse::<u16>()
        .context(format!("invalid {PORT_ENV_VAR} value: {port_str}"))?;
    let bind_addr = format!("{host}:{port}");

    let raster_url =
        std::env::var(RASTER_URL_ENV_VAR).context(format!("{RASTER_URL_ENV_VAR} must be set"))?;
    let token_spec =
        std::env::var(TOKENS_ENV_VAR).context(format!("{TOKENS_ENV_VAR} must be set"))?;
    let tokens = TokenMap::from_spec(&token_spec)
        .map_err(anyhow::Error::msg)
        .context(format!("invalid {TOKENS_ENV_VAR}"))?;

    let batch = if std::env::var(HD_ENV_VAR).is_ok_and(|v| v == "1") {
        BatchConfig::high_density()
    } else {
        BatchConfig::standard()
    };
    info!(endpoint = %raster_url, concurrency = batch.concurrency, "configured rasterizer");

    let rasterizer = HttpRasterizer::new(ClientConfig::new(raster_url))
        .context("failed to build rasterization client")?;
    let app = router(AppState::new(tokens, rasterizer, batch));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("failed to bind {bind_addr}"))?;
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        address = %listener.local_addr()?,
        "server listening"
    );

    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
        info!("shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("server error")?;

    info!("server shut down");
    Ok(())
}
