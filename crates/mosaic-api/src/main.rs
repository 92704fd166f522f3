use anyhow::{Context, Result};
use log::LevelFilter;
use std::sync::Arc;

use mosaic_api::config::{build_cli, ServerConfig};
use mosaic_api::routes::router;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MOSAIC_LOG", "error,mosaic=info"))
        .init();

    let matches = build_cli().get_matches();
    let config = ServerConfig::from_arguments(&matches)?;
    let address = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    log::info!("[Mosaic] Listening on http://{}", address);

    axum::serve(listener, router(Arc::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated with an error")?;

    log::info!("[Mosaic] Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
