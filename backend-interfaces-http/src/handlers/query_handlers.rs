use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};

use backend_application::commands::purge_commands;
use backend_application::queries::attack_queries;
use backend_application::AppState;
use backend_domain::{AttackListResponse, AttackQuery, PurgeQuery, PurgeResponse};

use crate::error::HttpError;
use crate::middleware::{authorize_read, authorize_write, CallerToken};

pub async fn list_attacks(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerToken>,
    query: Result<Query<AttackQuery>, QueryRejection>,
) -> Result<Json<AttackListResponse>, HttpError> {
    authorize_read(&state.config, &caller)?;
    let Query(query) = query.map_err(|err| HttpError::BadRequest(err.body_text()))?;
    let response = attack_queries::list_attacks(&state, query).await?;
    Ok(Json(response))
}

/// Answers 404 outside development, before credentials are checked, so the
/// route looks absent in production.
pub async fn purge_attacks(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerToken>,
    query: Result<Query<PurgeQuery>, QueryRejection>,
) -> Result<Json<PurgeResponse>, HttpError> {
    if !state.config.purge_enabled() {
        return Err(HttpError::NotFound);
    }
    authorize_write(&state.config, &caller)?;
    let Query(query) = query.map_err(|err| HttpError::BadRequest(err.body_text()))?;
    let deleted = purge_commands::purge_attacks(&state, query).await?;
    Ok(Json(PurgeResponse { ok: true, deleted }))
}
