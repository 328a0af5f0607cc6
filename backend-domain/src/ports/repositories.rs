use async_trait::async_trait;

use crate::entities::{AttackFilter, AttackRecord, NewAttack, UpsertOutcome};
use crate::value_objects::WorldId;

#[async_trait]
pub trait AttackRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;

    /// Applies the whole batch atomically. Either every row is inserted or
    /// updated, or nothing is.
    async fn upsert_batch(
        &self,
        world: &WorldId,
        attacks: &[NewAttack],
        now_ms: i64,
    ) -> anyhow::Result<UpsertOutcome>;

    /// Rows matching the filter ordered by ascending `arrival_at`.
    async fn fetch_attacks(&self, filter: &AttackFilter) -> anyhow::Result<Vec<AttackRecord>>;

    /// Deletes rows with `arrival_at < cutoff_ms` and returns how many went.
    async fn delete_arrived_before(&self, cutoff_ms: i64) -> anyhow::Result<u64>;

    /// Deletes every row, or every row of one world.
    async fn purge(&self, world: Option<&WorldId>) -> anyhow::Result<u64>;

    async fn ping(&self) -> anyhow::Result<()>;
}
