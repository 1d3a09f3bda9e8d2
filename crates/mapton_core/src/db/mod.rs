//! Bookmark database: connection setup, `user_version` migrations and the
//! error type the bookmark repository reports through.
//!
//! Monitoring datasets never touch SQLite; only saved map bookmarks and
//! their categories are persisted here.
//!
//! # Invariants
//! - A connection handed out by [`open_db`] or [`open_db_in_memory`] is at
//!   the latest schema version with foreign keys enabled.
//! - A database written by a newer build is refused, not downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The connection was handed to a repository before migrations ran.
    SchemaNotReady {
        db_version: u32,
        expected: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaNotReady {
                db_version,
                expected,
            } => write!(
                f,
                "database schema version {db_version} is not migrated (expected {expected})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
