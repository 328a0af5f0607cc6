use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{
    named_params, params, params_from_iter, Connection, OptionalExtension, Row,
    TransactionBehavior,
};
use uuid::Uuid;

use backend_domain::{
    AttackFilter, AttackRecord, AttackRepository, DbConfig, NewAttack, UpsertOutcome, WorldId,
};

use crate::repositories::schema::{configure_connection, migrate};
use crate::utils::IN_MEMORY_DB_PATH;

const SELECT_RECORD_COLUMNS: &str = "SELECT world, command_id, attacker, defender, origin, target,
    attack_type, distance, arrival_text, arrival_at, source, captured_at, created_at, updated_at,
    last_seen_at FROM attacks";

const INSERT_ATTACK: &str = "INSERT INTO attacks (
    id, world, identity_key, command_id, content_hash, attacker, defender, origin, target,
    attack_type, distance, arrival_text, arrival_at, source, captured_at,
    created_at, updated_at, last_seen_at
) VALUES (
    :id, :world, :identity_key, :command_id, :content_hash, :attacker, :defender, :origin, :target,
    :attack_type, :distance, :arrival_text, :arrival_at, :source, :captured_at,
    :now, :now, :now
)";

// SET expressions see the pre-update row, so the CASE compares old content
// against the incoming values.
const UPDATE_ATTACK: &str = "UPDATE attacks SET
    updated_at = CASE
        WHEN attacker IS :attacker AND defender IS :defender AND origin IS :origin
            AND target IS :target AND attack_type IS :attack_type AND distance IS :distance
            AND arrival_text IS :arrival_text AND arrival_at = :arrival_at
        THEN updated_at
        ELSE :now
    END,
    command_id = :command_id,
    content_hash = :content_hash,
    attacker = :attacker,
    defender = :defender,
    origin = :origin,
    target = :target,
    attack_type = :attack_type,
    distance = :distance,
    arrival_text = :arrival_text,
    arrival_at = :arrival_at,
    source = :source,
    captured_at = :captured_at,
    last_seen_at = :now
WHERE id = :id";

/// Attack store on a single SQLite connection.
///
/// Every call runs on the blocking pool while holding the connection mutex,
/// so writers are serialized and the async executor never waits on disk.
#[derive(Clone)]
pub struct SqliteAttackRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAttackRepository {
    pub fn open(config: &DbConfig) -> Result<Self> {
        if config.db_path == IN_MEMORY_DB_PATH {
            return Self::open_in_memory();
        }
        let path = Path::new(&config.db_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite")?;
        configure_connection(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| anyhow!("sqlite connection mutex poisoned"))?;
            work(&mut guard)
        })
        .await
        .context("sqlite worker task failed")?
    }
}

#[async_trait]
impl AttackRepository for SqliteAttackRepository {
    async fn ensure_schema(&self) -> Result<()> {
        self.with_conn(|conn| migrate(conn)).await
    }

    async fn upsert_batch(
        &self,
        world: &WorldId,
        attacks: &[NewAttack],
        now_ms: i64,
    ) -> Result<UpsertOutcome> {
        if attacks.is_empty() {
            return Ok(UpsertOutcome::default());
        }
        let world = world.as_str().to_string();
        let attacks = attacks.to_vec();
        self.with_conn(move |conn| upsert_rows(conn, &world, &attacks, now_ms))
            .await
    }

    async fn fetch_attacks(&self, filter: &AttackFilter) -> Result<Vec<AttackRecord>> {
        let filter = filter.clone();
        self.with_conn(move |conn| select_rows(conn, &filter)).await
    }

    async fn delete_arrived_before(&self, cutoff_ms: i64) -> Result<u64> {
        self.with_conn(move |conn| {
            let deleted = conn
                .execute("DELETE FROM attacks WHERE arrival_at < ?1", params![cutoff_ms])
                .context("failed to delete expired attacks")?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn purge(&self, world: Option<&WorldId>) -> Result<u64> {
        let world = world.map(|world| world.as_str().to_string());
        self.with_conn(move |conn| {
            let deleted = match world {
                Some(world) => conn.execute("DELETE FROM attacks WHERE world = ?1", params![world]),
                None => conn.execute("DELETE FROM attacks", []),
            }
            .context("failed to purge attacks")?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .context("sqlite ping failed")?;
            Ok(())
        })
        .await
    }
}

fn upsert_rows(
    conn: &mut Connection,
    world: &str,
    attacks: &[NewAttack],
    now_ms: i64,
) -> Result<UpsertOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("failed to start upsert transaction")?;
    let mut outcome = UpsertOutcome::default();
    {
        let mut lookup =
            tx.prepare_cached("SELECT id FROM attacks WHERE world = ?1 AND identity_key = ?2")?;
        let mut insert = tx.prepare_cached(INSERT_ATTACK)?;
        let mut update = tx.prepare_cached(UPDATE_ATTACK)?;

        for attack in attacks {
            let identity_key = attack.identity.storage_key();
            let existing: Option<String> = lookup
                .query_row(params![world, identity_key], |row| row.get(0))
                .optional()
                .context("failed to look up attack identity")?;
            match existing {
                Some(id) => {
                    update
                        .execute(named_params! {
                            ":id": id,
                            ":command_id": attack.command_id,
                            ":content_hash": attack.content_hash,
                            ":attacker": attack.attacker,
                            ":defender": attack.defender,
                            ":origin": attack.origin,
                            ":target": attack.target,
                            ":attack_type": attack.attack_type,
                            ":distance": attack.distance,
                            ":arrival_text": attack.arrival_text,
                            ":arrival_at": attack.arrival_at,
                            ":source": attack.source,
                            ":captured_at": attack.captured_at,
                            ":now": now_ms,
                        })
                        .context("failed to update attack")?;
                    outcome.updated += 1;
                }
                None => {
                    insert
                        .execute(named_params! {
                            ":id": Uuid::new_v4().to_string(),
                            ":world": world,
                            ":identity_key": identity_key,
                            ":command_id": attack.command_id,
                            ":content_hash": attack.content_hash,
                            ":attacker": attack.attacker,
                            ":defender": attack.defender,
                            ":origin": attack.origin,
                            ":target": attack.target,
                            ":attack_type": attack.attack_type,
                            ":distance": attack.distance,
                            ":arrival_text": attack.arrival_text,
                            ":arrival_at": attack.arrival_at,
                            ":source": attack.source,
                            ":captured_at": attack.captured_at,
                            ":now": now_ms,
                        })
                        .context("failed to insert attack")?;
                    outcome.inserted += 1;
                }
            }
        }
    }
    tx.commit().context("failed to commit upsert transaction")?;
    Ok(outcome)
}

fn select_rows(conn: &Connection, filter: &AttackFilter) -> Result<Vec<AttackRecord>> {
    let mut sql = format!("{SELECT_RECORD_COLUMNS} WHERE world = ?");
    let mut values = vec![Value::Text(filter.world.clone())];
    if let Some(arrival_before) = filter.arrival_before {
        sql.push_str(" AND arrival_at <= ?");
        values.push(Value::Integer(arrival_before));
    }
    if let Some(updated_since) = filter.updated_since {
        sql.push_str(" AND updated_at >= ?");
        values.push(Value::Integer(updated_since));
    }
    if let Some(attacker) = &filter.attacker {
        sql.push_str(" AND attacker = ?");
        values.push(Value::Text(attacker.clone()));
    }
    if let Some(attack_type) = &filter.attack_type {
        sql.push_str(" AND attack_type = ?");
        values.push(Value::Text(attack_type.clone()));
    }
    sql.push_str(" ORDER BY arrival_at ASC, created_at ASC, id ASC LIMIT ?");
    values.push(Value::Integer(i64::try_from(filter.limit).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&sql).context("failed to prepare attack query")?;
    let rows = stmt
        .query_map(params_from_iter(values), map_record)
        .context("failed to query attacks")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read attack rows")
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<AttackRecord> {
    Ok(AttackRecord {
        world: row.get(0)?,
        command_id: row.get(1)?,
        attacker: row.get(2)?,
        defender: row.get(3)?,
        origin: row.get(4)?,
        target: row.get(5)?,
        attack_type: row.get(6)?,
        distance: row.get(7)?,
        arrival_text: row.get(8)?,
        arrival_at: row.get(9)?,
        source: row.get(10)?,
        captured_at: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        last_seen_at: row.get(14)?,
    })
}
