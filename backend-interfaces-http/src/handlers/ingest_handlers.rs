use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use tracing::warn;

use backend_application::commands::ingest_commands;
use backend_application::AppState;
use backend_domain::IngestResponse;

use crate::error::HttpError;
use crate::middleware::{authorize_write, parse_batch, CallerToken};

pub async fn ingest_attacks(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerToken>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, HttpError> {
    authorize_write(&state.config, &caller)?;

    let batch = parse_batch(&headers, &body, state.config.max_body_bytes).map_err(|err| {
        warn!("failed to parse attack batch: {}", err);
        state.metrics.record_ingest_error();
        HttpError::BadRequest(err.to_string())
    })?;

    let outcome =
        ingest_commands::process_attack_batch(&state, batch, caller.as_deref()).await?;
    Ok(Json(IngestResponse {
        ok: true,
        inserted: outcome.inserted,
        updated: outcome.updated,
    }))
}
