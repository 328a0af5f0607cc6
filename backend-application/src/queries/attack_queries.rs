use tracing::error;

use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text, AttackFilter, AttackListResponse, AttackQuery, RuntimeConfig,
    WorldId,
};

const MILLIS_PER_MINUTE: i64 = 60_000;

pub async fn list_attacks(
    state: &AppState,
    query: AttackQuery,
) -> Result<AttackListResponse, AppError> {
    let filter = build_filter(&state.config, &query, state.now_millis())?;
    state.metrics.record_query();
    let attacks = state
        .attack_repo
        .fetch_attacks(&filter)
        .await
        .map_err(|err| {
            error!(world = %filter.world, "failed to fetch attacks: {:#}", err);
            AppError::Internal(err)
        })?;
    Ok(AttackListResponse {
        world: filter.world,
        count: attacks.len(),
        attacks,
    })
}

fn build_filter(
    config: &RuntimeConfig,
    query: &AttackQuery,
    now_ms: i64,
) -> Result<AttackFilter, AppError> {
    let world = query
        .world
        .as_deref()
        .and_then(WorldId::parse)
        .ok_or_else(|| AppError::BadRequest("world is required".to_string()))?;

    let max_limit = config.max_query_limit.max(1);
    let limit = match query.limit {
        Some(requested) => usize::try_from(requested.max(1)).unwrap_or(max_limit),
        None => config.default_query_limit,
    }
    .clamp(1, max_limit);

    let arrival_before = query
        .min_eta_min
        .filter(|minutes| *minutes > 0)
        .map(|minutes| now_ms.saturating_add(minutes.saturating_mul(MILLIS_PER_MINUTE)));
    let updated_since = query.since.filter(|since| *since > 0);

    Ok(AttackFilter {
        world: world.into_inner(),
        arrival_before,
        updated_since,
        attacker: normalize_optional_text(query.attacker.clone()),
        attack_type: normalize_optional_text(query.attack_type.clone()),
        limit,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{record, state_with, MemoryAttackRepository, NOW_MS};

    fn query(world: Option<&str>) -> AttackQuery {
        AttackQuery {
            world: world.map(ToString::to_string),
            ..AttackQuery::default()
        }
    }

    #[test]
    fn filter_requires_world() {
        let err = build_filter(&RuntimeConfig::default(), &query(None), NOW_MS)
            .expect_err("missing world");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn limit_defaults_and_clamps() {
        let config = RuntimeConfig::default();
        let filter = build_filter(&config, &query(Some("br1")), NOW_MS).expect("filter");
        assert_eq!(filter.limit, 5_000);

        let mut big = query(Some("br1"));
        big.limit = Some(50_000);
        assert_eq!(build_filter(&config, &big, NOW_MS).expect("filter").limit, 10_000);

        let mut negative = query(Some("br1"));
        negative.limit = Some(-3);
        assert_eq!(build_filter(&config, &negative, NOW_MS).expect("filter").limit, 1);
    }

    #[test]
    fn eta_horizon_is_relative_to_now() {
        let mut q = query(Some("br1"));
        q.min_eta_min = Some(30);
        let filter = build_filter(&RuntimeConfig::default(), &q, NOW_MS).expect("filter");
        assert_eq!(filter.arrival_before, Some(NOW_MS + 30 * 60_000));

        q.min_eta_min = Some(0);
        let filter = build_filter(&RuntimeConfig::default(), &q, NOW_MS).expect("filter");
        assert!(filter.arrival_before.is_none());
    }

    #[test]
    fn since_ignores_non_positive_values() {
        let mut q = query(Some("br1"));
        q.since = Some(0);
        let filter = build_filter(&RuntimeConfig::default(), &q, NOW_MS).expect("filter");
        assert!(filter.updated_since.is_none());
        q.since = Some(123);
        let filter = build_filter(&RuntimeConfig::default(), &q, NOW_MS).expect("filter");
        assert_eq!(filter.updated_since, Some(123));
    }

    #[tokio::test]
    async fn eta_filter_excludes_later_arrivals() {
        let repo = Arc::new(MemoryAttackRepository::default());
        repo.insert_record("cmd:soon", record("br1", NOW_MS + 30 * 60_000, NOW_MS));
        repo.insert_record("cmd:late", record("br1", NOW_MS + 31 * 60_000, NOW_MS));
        let state = state_with(repo, RuntimeConfig::default());

        let mut q = query(Some("br1"));
        q.min_eta_min = Some(30);
        let response = list_attacks(&state, q).await.expect("list");
        assert_eq!(response.count, 1);
        assert_eq!(response.attacks[0].arrival_at, NOW_MS + 30 * 60_000);
    }

    #[test]
    fn blank_attribute_filters_are_ignored() {
        let mut q = query(Some("br1"));
        q.attacker = Some("  ".to_string());
        q.attack_type = Some(" noble ".to_string());
        let filter = build_filter(&RuntimeConfig::default(), &q, NOW_MS).expect("filter");
        assert!(filter.attacker.is_none());
        assert_eq!(filter.attack_type.as_deref(), Some("noble"));
    }

    #[tokio::test]
    async fn filters_by_attacker_and_type() {
        let repo = Arc::new(MemoryAttackRepository::default());
        let mut noble = record("br1", NOW_MS + 60_000, NOW_MS);
        noble.attacker = Some("A".to_string());
        noble.attack_type = Some("noble".to_string());
        let mut attack = record("br1", NOW_MS + 120_000, NOW_MS);
        attack.attacker = Some("B".to_string());
        attack.attack_type = Some("attack".to_string());
        repo.insert_record("cmd:noble", noble);
        repo.insert_record("cmd:attack", attack);
        let state = state_with(repo, RuntimeConfig::default());

        let mut by_type = query(Some("br1"));
        by_type.attack_type = Some("noble".to_string());
        let response = list_attacks(&state, by_type).await.expect("list");
        assert_eq!(response.count, 1);
        assert_eq!(response.attacks[0].attacker.as_deref(), Some("A"));

        let mut by_attacker = query(Some("br1"));
        by_attacker.attacker = Some("B".to_string());
        let response = list_attacks(&state, by_attacker).await.expect("list");
        assert_eq!(response.count, 1);
        assert_eq!(response.attacks[0].attack_type.as_deref(), Some("attack"));
    }

    #[tokio::test]
    async fn unknown_world_returns_empty_list() {
        let repo = Arc::new(MemoryAttackRepository::default());
        let state = state_with(repo, RuntimeConfig::default());
        let response = list_attacks(&state, query(Some("  BR9 "))).await.expect("list");
        assert_eq!(response.world, "br9");
        assert_eq!(response.count, 0);
        assert!(response.attacks.is_empty());
    }
}
