//! Gateway entry point: Connection Plane scaffold. Terminates WebSocket
//! connections and will demultiplex them into Ingest/Fanout traffic once the
//! dataplane is built out; today it only exercises the health surface and
//! the bearer-token claim shape shared with Chat Management.

use gateway::config::GatewayConfig;
use gateway::{build_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = GatewayConfig::load()?;
    init_tracing(&config);

    tracing::info!(service = %config.service_name, "starting gateway");

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

fn init_tracing(config: &GatewayConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .init();
}
