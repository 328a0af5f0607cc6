use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use backend_application::commands::retention_commands::sweep_expired;
use backend_application::AppState;
use backend_domain::RuntimeConfig;

pub fn sweep_period(config: &RuntimeConfig) -> Option<Duration> {
    match config.retention_sweep_interval_seconds {
        0 => None,
        seconds => Some(Duration::from_secs(seconds)),
    }
}

/// Sweeps expired attacks on a fixed period, starting immediately.
pub async fn schedule_retention_sweeps(state: AppState) {
    let Some(period) = sweep_period(&state.config) else {
        info!("periodic retention sweep disabled");
        return;
    };
    info!(interval_secs = period.as_secs(), "retention sweep scheduled");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        run_retention_sweep(&state).await;
    }
}

pub async fn run_retention_sweep(state: &AppState) -> u64 {
    match sweep_expired(state).await {
        Ok(deleted) => deleted,
        Err(err) => {
            warn!("retention sweep failed: {}", err);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use backend_application::test_support::state_at;
    use backend_domain::{prepare_attack, AttackRepository, RawAttack, WorldId};

    use super::*;
    use crate::repositories::SqliteAttackRepository;

    const NOW: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60_000;

    #[test]
    fn zero_interval_disables_timer() {
        let disabled = RuntimeConfig {
            retention_sweep_interval_seconds: 0,
            ..RuntimeConfig::default()
        };
        assert!(sweep_period(&disabled).is_none());
        assert_eq!(
            sweep_period(&RuntimeConfig::default()),
            Some(Duration::from_secs(600))
        );
    }

    #[tokio::test]
    async fn sweep_removes_expired_rows_from_sqlite() {
        let repo = Arc::new(SqliteAttackRepository::open_in_memory().expect("open"));
        repo.ensure_schema().await.expect("schema");
        let world = WorldId::parse("br1").expect("world");
        let batch: Vec<_> = [("gone", NOW - 120 * MINUTE), ("kept", NOW - 30 * MINUTE)]
            .into_iter()
            .map(|(target, arrival_at)| {
                let raw = RawAttack {
                    target: Some(target.to_string()),
                    arrival_at: Some(arrival_at),
                    ..RawAttack::default()
                };
                prepare_attack(&world, raw, None, NOW)
            })
            .collect();
        repo.upsert_batch(&world, &batch, NOW).await.expect("upsert");

        let state = state_at(repo, RuntimeConfig::default(), NOW);

        assert_eq!(run_retention_sweep(&state).await, 1);
        assert_eq!(run_retention_sweep(&state).await, 0);
        assert!(state.metrics.render_prometheus().contains("tribewatch_attacks_swept_total 1"));
    }
}
