use anyhow::{Context, Result};
use clap::Parser;
use shub_server::{RefererValidator, RelayService, RoomIndex, ServerArgs};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = ServerArgs::parse();
    let environment = args.environment_config()?;
    info!("Environment: {}", args.environment);

    let service = RelayService::new(
        Arc::new(RoomIndex::new()),
        Arc::new(RefererValidator::new(environment.referer)),
    );

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("server starting on {}", args.bind);

    axum::serve(
        listener,
        service
            .router()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
