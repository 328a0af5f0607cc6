use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

pub const ATTACKS_SCHEMA_VERSION: i64 = 1;

const SCHEMA_ATTACKS_V1: &str = "
CREATE TABLE IF NOT EXISTS attacks (
    id TEXT PRIMARY KEY,
    world TEXT NOT NULL,
    identity_key TEXT NOT NULL,
    command_id TEXT,
    content_hash TEXT NOT NULL,
    attacker TEXT,
    defender TEXT,
    origin TEXT,
    target TEXT,
    attack_type TEXT,
    distance TEXT,
    arrival_text TEXT,
    arrival_at INTEGER NOT NULL,
    source TEXT,
    captured_at INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    last_seen_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_attacks_world_identity
    ON attacks (world, identity_key);
CREATE UNIQUE INDEX IF NOT EXISTS idx_attacks_world_command
    ON attacks (world, command_id) WHERE command_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_attacks_world_arrival
    ON attacks (world, arrival_at);
CREATE INDEX IF NOT EXISTS idx_attacks_arrival
    ON attacks (arrival_at);
";

pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )
    .context("failed to configure sqlite pragmas")
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("failed to read schema version")
}

pub fn migrate(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current > ATTACKS_SCHEMA_VERSION {
        return Err(anyhow!(
            "database schema version {current} is newer than supported {ATTACKS_SCHEMA_VERSION}"
        ));
    }

    if current < 1 {
        conn.execute_batch(SCHEMA_ATTACKS_V1)
            .context("failed to apply attacks schema")?;
        conn.execute("PRAGMA user_version = 1", [])
            .map(|_| ())
            .context("failed to record schema version")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        migrate(&conn).expect("first migrate");
        migrate(&conn).expect("second migrate");
        assert_eq!(schema_version(&conn).expect("version"), ATTACKS_SCHEMA_VERSION);
    }

    #[test]
    fn refuses_newer_schema() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute("PRAGMA user_version = 99", []).expect("bump");
        assert!(migrate(&conn).is_err());
    }

    #[test]
    fn identity_is_unique_per_world() {
        let conn = Connection::open_in_memory().expect("open");
        migrate(&conn).expect("migrate");
        let insert = "INSERT INTO attacks (id, world, identity_key, content_hash, arrival_at,
                      captured_at, created_at, updated_at, last_seen_at)
                      VALUES (?1, ?2, 'cmd:1', 'h', 1, 1, 1, 1, 1)";
        conn.execute(insert, ["a", "br1"]).expect("first row");
        conn.execute(insert, ["b", "br2"]).expect("other world");
        assert!(conn.execute(insert, ["c", "br1"]).is_err());
    }
}
