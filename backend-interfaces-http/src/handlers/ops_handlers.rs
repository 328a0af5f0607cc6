use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

use crate::middleware::{authorize_read, CallerToken};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub ok: bool,
}

pub async fn health_live() -> Json<HealthStatus> {
    Json(HealthStatus { ok: true })
}

pub async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    let ok = match timeout(timeout_duration, state.attack_repo.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            false
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            false
        }
    };
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthStatus { ok }))
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerToken>,
) -> impl IntoResponse {
    if let Err(err) = authorize_read(&state.config, &caller) {
        return err.into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
