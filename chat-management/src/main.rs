//! Chat Management service entry point: the authentication and session
//! core, serving the four AuthService operations over both gRPC and an
//! HTTP+JSON bridge, the way the teacher's `auth-service` bootstraps its
//! own dual gRPC/HTTP surface.

use chat_management::adapters::memory::{MemoryAuthStore, MemoryRateLimiter, MemoryRevocationStore};
use chat_management::adapters::postgres::PostgresAuthStore;
use chat_management::adapters::redis::RedisStore;
use chat_management::adapters::sms::{LogOnlySmsProvider, VendorSmsProvider};
use chat_management::clock::SystemClock;
use chat_management::config::{ChatManagementConfig, SmsProviderKind};
use chat_management::db;
use chat_management::grpc::proto::auth_service_server::AuthServiceServer;
use chat_management::grpc::proto::FILE_DESCRIPTOR_SET;
use chat_management::grpc::AuthServiceImpl;
use chat_management::ports::{
    AuthTransactor, OtpStore, RateLimiter, RevocationStore, SessionStore, SmsProvider, UserStore,
};
use chat_management::services::auth_service::{AuthService, AuthServiceDeps};
use chat_management::services::metrics::Metrics;
use chat_management::token::keystore::{SharedKeyStore, StaticKeyStore};
use chat_management::token::minter::Minter;
use chat_management::{build_router, AppState};
use service_core::grpc::interceptors::trace_context_interceptor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tonic::transport::Server as GrpcServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ChatManagementConfig::from_env()
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;

    init_tracing(&config);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "starting chat-management"
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("postgres ready");

    let use_memory_backing = std::env::var("CHAT_MANAGEMENT_MEMORY_BACKING")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let (otp_store, user_store, session_store, transactor): (
        Arc<dyn OtpStore>,
        Arc<dyn UserStore>,
        Arc<dyn SessionStore>,
        Arc<dyn AuthTransactor>,
    ) = if use_memory_backing {
        tracing::warn!("CHAT_MANAGEMENT_MEMORY_BACKING=1: using in-memory persistence, data does not survive restarts");
        let store = Arc::new(MemoryAuthStore::default());
        (store.clone(), store.clone(), store.clone(), store)
    } else {
        let store = Arc::new(PostgresAuthStore::new(pool.clone()));
        (store.clone(), store.clone(), store.clone(), store)
    };

    let redis = RedisStore::new(&config.redis.url).await?;
    redis.health_check().await?;
    let (rate_limiter, revocation): (Arc<dyn RateLimiter>, Arc<dyn RevocationStore>) =
        if use_memory_backing {
            (
                Arc::new(MemoryRateLimiter::default()),
                Arc::new(MemoryRevocationStore::default()),
            )
        } else {
            let redis = Arc::new(redis);
            (redis.clone(), redis)
        };

    let sms: Arc<dyn SmsProvider> = match config.sms.provider {
        SmsProviderKind::LogOnly => Arc::new(LogOnlySmsProvider),
        SmsProviderKind::Vendor => Arc::new(VendorSmsProvider),
    };

    let clock = Arc::new(SystemClock);

    let keys: SharedKeyStore = match &config.jwt.private_key_path {
        Some(path) => {
            let pem = std::fs::read_to_string(path)?;
            Arc::new(StaticKeyStore::single(config.jwt.kid.clone(), &pem)?)
        }
        None => {
            tracing::warn!("JWT_PRIVATE_KEY_PATH not set, generating an ephemeral signing key (dev only)");
            Arc::new(StaticKeyStore::single(config.jwt.kid.clone(), &generate_dev_rsa_pem())?)
        }
    };

    let minter = Arc::new(Minter::new(
        keys.clone(),
        clock.clone() as Arc<dyn chat_management::clock::Clock>,
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
        std::time::Duration::from_secs(config.jwt.access_token_lifetime_seconds),
    ));

    let metrics = Arc::new(Metrics::new()?);

    let auth = Arc::new(AuthService::new(AuthServiceDeps {
        otp_store,
        user_store,
        session_store,
        transactor,
        rate_limiter,
        revocation,
        sms,
        clock: clock as Arc<dyn chat_management::clock::Clock>,
        minter,
        pepper: config.security.pepper.clone(),
        limits: config.rate_limit.to_limits(&config.jwt),
        metrics: metrics.clone(),
    }));

    let state = AppState {
        config: Arc::new(config.clone()),
        auth: auth.clone(),
        keys,
        metrics,
    };

    let http_port = config.common.port;
    let http_addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let http_router = build_router(state.clone());
    tracing::info!("HTTP+JSON bridge listening on {}", http_addr);
    let http_listener = TcpListener::bind(http_addr).await?;
    let http_server = axum::serve(
        http_listener,
        http_router.into_make_service_with_connect_info::<SocketAddr>(),
    );

    let grpc_port = http_port + 1;
    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], grpc_port));

    let auth_service_impl = AuthServiceImpl::new(state);

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let (mut health_reporter, grpc_health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthServiceImpl>>()
        .await;

    tracing::info!("gRPC server listening on {}", grpc_addr);
    let grpc_server = GrpcServer::builder()
        .add_service(grpc_health_service)
        .add_service(reflection_service)
        .add_service(AuthServiceServer::with_interceptor(
            auth_service_impl,
            trace_context_interceptor,
        ))
        .serve_with_shutdown(grpc_addr, shutdown_signal());

    tokio::select! {
        result = http_server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }
        }
        result = grpc_server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "gRPC server error");
            }
        }
    }

    tracing::info!("draining in-flight SMS dispatches");
    auth.wait_for_background_dispatches().await;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        },
    }
}

/// Initialize tracing with JSON output for log aggregation; exports traces
/// to an OTLP collector when configured, falling back to JSON-only logging.
fn init_tracing(config: &ChatManagementConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if let Some(ref otlp_endpoint) = config.otlp_endpoint {
        let otlp_exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(otlp_endpoint);

        match opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(otlp_exporter)
            .with_trace_config(opentelemetry_sdk::trace::Config::default().with_resource(
                opentelemetry_sdk::Resource::new(vec![
                    opentelemetry::KeyValue::new("service.name", config.service_name.clone()),
                    opentelemetry::KeyValue::new("service.version", config.service_version.clone()),
                ]),
            ))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
        {
            Ok(tracer) => {
                let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(telemetry)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_file(true)
                            .with_line_number(true)
                            .with_target(true)
                            .json()
                            .flatten_event(true),
                    )
                    .init();
                return;
            }
            Err(e) => {
                eprintln!(
                    "failed to initialize OTLP tracer (endpoint: {}): {}. falling back to JSON-only logging.",
                    otlp_endpoint, e
                );
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .json()
                .flatten_event(true),
        )
        .init();
}

/// Generates an ephemeral 2048-bit RSA key for local dev when no
/// `JWT_PRIVATE_KEY_PATH` is configured. Never used in production - config
/// validation requires the path when `ENVIRONMENT=prod`.
fn generate_dev_rsa_pem() -> String {
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::RsaPrivateKey;

    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 2048).expect("rsa key generation failed");
    key.to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .expect("pkcs1 pem encoding failed")
        .to_string()
}
