use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ubee_client::{ReqwestPageFetcher, ScraperExtractor};
use ubee_core::ScrapeService;
use ubee_exporter::config::{Cli, ExporterConfig};
use ubee_exporter::routes;
use ubee_exporter::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ubee=info".parse()?))
        .with_target(false)
        .init();

    let config = ExporterConfig::try_from(Cli::parse())?;

    let service = ScrapeService::new(
        ReqwestPageFetcher::with_timeout(config.timeout),
        ScraperExtractor::new()?,
    );
    let listen_address = config.listen_address;
    tracing::info!(
        modem = %config.modem_address,
        metrics_path = %config.metrics_path,
        "Starting exporter on {listen_address}"
    );

    let state = Arc::new(AppState { service, config });
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(listen_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
