// In-memory doubles and fixtures for tests of this and downstream crates

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use backend_domain::{
    AttackFilter, AttackRecord, AttackRepository, NewAttack, RuntimeConfig, UpsertOutcome,
    WorldId,
};

use crate::{AppState, Metrics};

pub const NOW_MS: i64 = 1_700_000_000_000;

pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at_millis(ms: i64) -> Self {
        let instant = Utc
            .timestamp_millis_opt(ms)
            .single()
            .expect("valid fixture timestamp");
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
struct Rows {
    by_key: HashMap<(String, String), AttackRecord>,
}

/// Keeps rows in a map keyed by `(world, identity key)`.
#[derive(Default)]
pub struct MemoryAttackRepository {
    rows: Mutex<Rows>,
    fail_writes: bool,
    pub sweeps: Mutex<Vec<i64>>,
}

impl MemoryAttackRepository {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("rows").by_key.len()
    }

    pub fn insert_record(&self, key: &str, record: AttackRecord) {
        self.rows
            .lock()
            .expect("rows")
            .by_key
            .insert((record.world.clone(), key.to_string()), record);
    }
}

#[async_trait]
impl AttackRepository for MemoryAttackRepository {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn upsert_batch(
        &self,
        world: &WorldId,
        attacks: &[NewAttack],
        now_ms: i64,
    ) -> anyhow::Result<UpsertOutcome> {
        if self.fail_writes {
            return Err(anyhow!("disk full"));
        }
        let mut rows = self.rows.lock().expect("rows");
        let mut outcome = UpsertOutcome::default();
        for attack in attacks {
            let key = (world.as_str().to_string(), attack.identity.storage_key());
            let created_at = match rows.by_key.get(&key) {
                Some(existing) => {
                    outcome.updated += 1;
                    existing.created_at
                }
                None => {
                    outcome.inserted += 1;
                    now_ms
                }
            };
            rows.by_key.insert(
                key,
                AttackRecord {
                    world: world.as_str().to_string(),
                    command_id: attack.command_id.clone(),
                    attacker: attack.attacker.clone(),
                    defender: attack.defender.clone(),
                    origin: attack.origin.clone(),
                    target: attack.target.clone(),
                    attack_type: attack.attack_type.clone(),
                    distance: attack.distance.clone(),
                    arrival_text: attack.arrival_text.clone(),
                    arrival_at: attack.arrival_at,
                    source: Some(attack.source.clone()),
                    captured_at: attack.captured_at,
                    created_at,
                    updated_at: now_ms,
                    last_seen_at: now_ms,
                },
            );
        }
        Ok(outcome)
    }

    async fn fetch_attacks(&self, filter: &AttackFilter) -> anyhow::Result<Vec<AttackRecord>> {
        let rows = self.rows.lock().expect("rows");
        let mut out = rows
            .by_key
            .values()
            .filter(|record| record.world == filter.world)
            .filter(|record| {
                filter
                    .arrival_before
                    .map(|limit| record.arrival_at <= limit)
                    .unwrap_or(true)
            })
            .filter(|record| {
                filter
                    .updated_since
                    .map(|since| record.updated_at >= since)
                    .unwrap_or(true)
            })
            .filter(|record| {
                filter.attacker.is_none() || record.attacker == filter.attacker
            })
            .filter(|record| {
                filter.attack_type.is_none() || record.attack_type == filter.attack_type
            })
            .cloned()
            .collect::<Vec<_>>();
        out.sort_by_key(|record| (record.arrival_at, record.created_at));
        out.truncate(filter.limit);
        Ok(out)
    }

    async fn delete_arrived_before(&self, cutoff_ms: i64) -> anyhow::Result<u64> {
        self.sweeps.lock().expect("sweeps").push(cutoff_ms);
        let mut rows = self.rows.lock().expect("rows");
        let before = rows.by_key.len();
        rows.by_key.retain(|_, record| record.arrival_at >= cutoff_ms);
        Ok((before - rows.by_key.len()) as u64)
    }

    async fn purge(&self, world: Option<&WorldId>) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().expect("rows");
        let before = rows.by_key.len();
        match world {
            Some(world) => rows.by_key.retain(|(name, _), _| name != world.as_str()),
            None => rows.by_key.clear(),
        }
        Ok((before - rows.by_key.len()) as u64)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub fn state_with(repo: Arc<MemoryAttackRepository>, config: RuntimeConfig) -> AppState {
    state_at(repo, config, NOW_MS)
}

/// State over any repository with the clock pinned to `now_ms`.
pub fn state_at(
    repo: Arc<dyn AttackRepository>,
    config: RuntimeConfig,
    now_ms: i64,
) -> AppState {
    AppState {
        config,
        attack_repo: repo,
        clock: Arc::new(FixedClock::at_millis(now_ms)),
        metrics: Arc::new(Metrics::default()),
    }
}

pub fn record(world: &str, arrival_at: i64, updated_at: i64) -> AttackRecord {
    AttackRecord {
        world: world.to_string(),
        command_id: None,
        attacker: Some("raider".to_string()),
        defender: None,
        origin: None,
        target: None,
        attack_type: None,
        distance: None,
        arrival_text: None,
        arrival_at,
        source: Some("srv".to_string()),
        captured_at: updated_at,
        created_at: updated_at,
        updated_at,
        last_seen_at: updated_at,
    }
}
