use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use backend_application::AppState;
use backend_infrastructure::{schedule_retention_sweeps, AppConfig, CliOverrides};
use backend_interfaces_http::{build_cors_layer, build_router};

use crate::context::AppContext;
use crate::logging::init_logging;

fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(DefaultBodyLimit::disable())
        .layer(build_cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_standalone(overrides: &CliOverrides) -> Result<()> {
    let config = AppConfig::load(overrides).await?;
    let _log_guard = init_logging(config.log_dir.as_deref())?;
    match &config.loaded_from {
        Some(path) => info!(path = %path, "config loaded"),
        None => warn!("config file not found, using defaults"),
    }
    run_with_config(config).await
}

pub async fn run_with_config(config: AppConfig) -> Result<()> {
    let context = AppContext::new(&config).await?;
    let state = context.state;

    tokio::spawn(schedule_retention_sweeps(state.clone()));

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("sigterm handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
