//! Fanout entry point: Fanout Plane scaffold. Will own delivery to online
//! recipients and offline catch-up once built out; today it only exercises
//! the health surface.

use fanout::config::FanoutConfig;
use fanout::{build_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = FanoutConfig::load()?;
    init_tracing(&config);

    tracing::info!(service = %config.service_name, "starting fanout");

    let port = config.common.port;
    let state = AppState {
        config: Arc::new(config),
    };
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(config: &FanoutConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .init();
}
