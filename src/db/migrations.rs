//! Ordered schema change-sets and the runner that applies them.

use super::DbError;
use rusqlite::{params, Connection};
use std::collections::HashSet;

/// One schema change-set, identified by a strictly increasing version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const SAMPLE_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 20240101000000,
        name: "create_posts",
        sql: "
        CREATE TABLE posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            body TEXT,
            inserted_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    },
    Migration {
        version: 20240101000100,
        name: "create_comments",
        sql: "
        CREATE TABLE comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            body TEXT NOT NULL,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            parent_id INTEGER REFERENCES comments(id) ON DELETE SET NULL,
            inserted_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX comments_post_id_index ON comments(post_id);
        CREATE INDEX comments_parent_id_index ON comments(parent_id);
        ",
    },
];

/// Apply every migration not yet recorded in `schema_migrations`.
///
/// Each change-set runs in its own transaction together with its version row.
/// Returns the newest applied version, or `None` if nothing has ever been applied.
pub fn migrate(conn: &mut Connection, migrations: &[Migration]) -> Result<Option<i64>, DbError> {
    check_order(migrations)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            inserted_at TEXT NOT NULL
        );
        ",
    )?;

    let applied = applied_versions(conn)?;
    for migration in migrations.iter().filter(|m| !applied.contains(&m.version)) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql).map_err(|source| DbError::Migration {
            version: migration.version,
            name: migration.name.to_string(),
            source,
        })?;
        tx.execute(
            "INSERT INTO schema_migrations(version, inserted_at) VALUES(?1, ?2)",
            params![migration.version, chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        tracing::info!("Applied migration {} ({})", migration.version, migration.name);
    }

    let latest: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))?;
    Ok(latest)
}

pub fn applied_versions(conn: &Connection) -> Result<HashSet<i64>, DbError> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt.query_map([], |row| row.get(0))?.collect::<Result<HashSet<i64>, _>>()?;
    Ok(versions)
}

fn check_order(migrations: &[Migration]) -> Result<(), DbError> {
    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(DbError::OutOfOrder {
                version: pair[1].version,
                name: pair[1].name.to_string(),
                previous: pair[0].version,
            });
        }
    }
    Ok(())
}
