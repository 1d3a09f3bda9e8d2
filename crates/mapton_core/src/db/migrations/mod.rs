//! Ordered schema migrations.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - All pending migrations apply in one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_bookmark.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_bookmark_marker.sql"),
    },
];

/// Latest schema version this binary knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies every migration newer than the connection's `user_version`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from={current} to={latest}");
    Ok(())
}

/// Fails unless the connection is migrated to exactly [`latest_version`].
pub fn ensure_current(conn: &Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current < latest {
        return Err(DbError::SchemaNotReady {
            db_version: current,
            expected: latest,
        });
    }
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
