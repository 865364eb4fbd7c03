use anyhow::Result;
use axum::http::{Method, header};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webcheck_api::api::{self, AppState};
use webcheck_api::checks::{CheckRegistry, HttpProbe, Simulator};
use webcheck_api::config::{CheckMode, Config, LogFormat};
use webcheck_api::scan::ScanOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "Starting webcheck-api v{} ({:?}, {:?} checks)",
        env!("CARGO_PKG_VERSION"),
        config.environment,
        config.check_mode
    );

    let registry = match config.check_mode {
        CheckMode::Simulated => {
            let simulator = match config.simulation_seed {
                Some(seed) => {
                    tracing::info!("Simulated checks seeded with {}", seed);
                    Simulator::seeded(seed)
                }
                None => Simulator::from_entropy(),
            };
            CheckRegistry::simulated(simulator.with_latency(config.simulated_latency()))
        }
        CheckMode::Live => {
            let probe = if config.allow_private_targets {
                tracing::warn!("Live checks may reach loopback and private addresses");
                HttpProbe::with_private_targets(config.request_timeout())?
            } else {
                HttpProbe::new(config.request_timeout())?
            };
            CheckRegistry::live(probe)
        }
    };

    let orchestrator = ScanOrchestrator::new(registry, config.check_timeout());
    let app_state = AppState::new(orchestrator, config.check_mode);

    // Configure CORS - supports comma-separated list of origins
    let origins: Vec<header::HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|s| s.parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        // Cache preflight requests for 1 hour
        .max_age(std::time::Duration::from_secs(3600));

    tracing::info!("CORS configured for origins: {}", config.frontend_url);

    let app = api::router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors),
    );

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Starting server on {}", addr);

    // Graceful shutdown handling
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "webcheck_api=info,tower_http=info".into()),
    );

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
