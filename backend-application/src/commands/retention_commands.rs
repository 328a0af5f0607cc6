use tracing::{debug, info};

use crate::{AppError, AppState};
use backend_domain::RetentionPolicy;

/// Deletes attacks that arrived more than the retention margin ago.
pub async fn sweep_expired(state: &AppState) -> Result<u64, AppError> {
    let policy = RetentionPolicy::from_minutes(state.config.retention_margin_minutes);
    let cutoff = policy.cutoff(state.now_millis());
    let deleted = state.attack_repo.delete_arrived_before(cutoff).await?;
    state.metrics.record_swept(deleted);
    if deleted > 0 {
        info!(deleted, cutoff_ms = cutoff, "expired attacks swept");
    } else {
        debug!(cutoff_ms = cutoff, "retention sweep found nothing to delete");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{record, state_with, MemoryAttackRepository, NOW_MS};
    use backend_domain::RuntimeConfig;

    const MINUTE: i64 = 60_000;

    #[tokio::test]
    async fn removes_only_rows_past_the_margin() {
        let repo = Arc::new(MemoryAttackRepository::default());
        repo.insert_record("cmd:old", record("br1", NOW_MS - 120 * MINUTE, NOW_MS));
        repo.insert_record("cmd:recent", record("br1", NOW_MS - 30 * MINUTE, NOW_MS));
        repo.insert_record("cmd:future", record("br1", NOW_MS + 30 * MINUTE, NOW_MS));
        let state = state_with(repo.clone(), RuntimeConfig::default());

        let deleted = sweep_expired(&state).await.expect("sweep");
        assert_eq!(deleted, 1);
        assert_eq!(repo.len(), 2);

        let again = sweep_expired(&state).await.expect("second sweep");
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn margin_comes_from_config() {
        let repo = Arc::new(MemoryAttackRepository::default());
        let config = RuntimeConfig {
            retention_margin_minutes: 15,
            ..RuntimeConfig::default()
        };
        let state = state_with(repo.clone(), config);
        sweep_expired(&state).await.expect("sweep");
        assert_eq!(
            repo.sweeps.lock().expect("sweeps").as_slice(),
            &[NOW_MS - 15 * MINUTE]
        );
    }
}
