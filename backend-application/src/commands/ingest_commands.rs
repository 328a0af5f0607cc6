use tracing::{debug, error, info, warn};

use crate::commands::retention_commands;
use crate::{AppError, AppState};
use backend_domain::{prepare_attack, AttackBatch, NewAttack, UpsertOutcome, WorldId};

/// Validates a producer batch and upserts it as one transaction.
///
/// Validation happens before anything touches storage. A storage failure
/// leaves no part of the batch applied, so callers may retry the whole batch.
pub async fn process_attack_batch(
    state: &AppState,
    batch: AttackBatch,
    caller_token: Option<&str>,
) -> Result<UpsertOutcome, AppError> {
    let world = batch
        .world
        .as_deref()
        .and_then(WorldId::parse)
        .ok_or_else(|| AppError::BadRequest("world is required".to_string()))?;
    let raw_attacks = batch
        .attacks
        .ok_or_else(|| AppError::BadRequest("attacks must be a list".to_string()))?;

    if raw_attacks.is_empty() {
        debug!(world = %world, "empty attack batch, nothing to apply");
        state.metrics.record_ingest(UpsertOutcome::default());
        return Ok(UpsertOutcome::default());
    }

    let now = state.now_millis();
    let attacks = raw_attacks
        .into_iter()
        .map(|raw| prepare_attack(&world, raw, caller_token, now))
        .collect::<Vec<NewAttack>>();

    let outcome = match state.attack_repo.upsert_batch(&world, &attacks, now).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(world = %world, "failed to apply attack batch: {:#}", err);
            state.metrics.record_ingest_error();
            return Err(AppError::Internal(err));
        }
    };
    state.metrics.record_ingest(outcome);
    info!(
        world = %world,
        inserted = outcome.inserted,
        updated = outcome.updated,
        "attack batch applied"
    );

    if state.config.sweep_on_write {
        if let Err(err) = retention_commands::sweep_expired(state).await {
            warn!("retention sweep after ingest failed: {}", err);
        }
    }

    Ok(outcome)
}
