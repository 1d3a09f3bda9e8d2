//! Bookmark repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Keep every `bookmark` SQL statement inside the persistence boundary.
//!
//! # Invariants
//! - Writes call `Bookmark::validate()` before touching SQL.
//! - Reads reject rows that no longer validate instead of masking them.
//! - Listing order is decided here, in Rust: category, name, description.

use crate::db::migrations::ensure_current;
use crate::db::DbError;
use crate::model::bookmark::{Bookmark, BookmarkId, BookmarkValidationError};
use rusqlite::{params, Connection, Row};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOKMARK_SELECT_SQL: &str = "SELECT
    id,
    name,
    category,
    description,
    url,
    color,
    display_marker,
    latitude,
    longitude,
    zoom,
    created_at,
    accessed_at,
    modified_at
FROM bookmark";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(BookmarkValidationError),
    Db(DbError),
    NotFound(BookmarkId),
    /// Update or delete of a bookmark that was never inserted.
    MissingId,
    DuplicateName(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "bookmark not found: {id}"),
            Self::MissingId => write!(f, "bookmark has no id; insert it first"),
            Self::DuplicateName(name) => write!(f, "bookmark name already exists: {name}"),
            Self::InvalidData(message) => write!(f, "invalid persisted bookmark: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::MissingId | Self::DuplicateName(_) | Self::InvalidData(_) => {
                None
            }
        }
    }
}

impl From<BookmarkValidationError> for RepoError {
    fn from(value: BookmarkValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub trait BookmarkRepository {
    fn insert_bookmark(&self, bookmark: &Bookmark) -> RepoResult<BookmarkId>;
    fn update_bookmark(&self, bookmark: &Bookmark) -> RepoResult<()>;
    fn get_bookmark(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>>;
    fn load_bookmarks(&self) -> RepoResult<Vec<Bookmark>>;
    fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<()>;
    /// Deletes every bookmark of `category`; returns how many were removed.
    fn delete_category(&self, category: &str) -> RepoResult<usize>;
    fn touch_accessed(&self, id: BookmarkId, accessed_at: i64) -> RepoResult<()>;
}

pub struct SqliteBookmarkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookmarkRepository<'conn> {
    /// Wraps a connection that [`crate::db::open_db`] has already migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_current(conn)?;
        Ok(Self { conn })
    }
}

impl BookmarkRepository for SqliteBookmarkRepository<'_> {
    fn insert_bookmark(&self, bookmark: &Bookmark) -> RepoResult<BookmarkId> {
        bookmark.validate()?;

        self.conn
            .execute(
                "INSERT INTO bookmark (
                    name,
                    category,
                    description,
                    url,
                    color,
                    display_marker,
                    latitude,
                    longitude,
                    zoom,
                    created_at,
                    accessed_at,
                    modified_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
                params![
                    bookmark.name.as_str(),
                    bookmark.category.as_str(),
                    bookmark.description.as_str(),
                    bookmark.url.as_deref(),
                    bookmark.color.as_str(),
                    bool_to_int(bookmark.display_marker),
                    bookmark.latitude,
                    bookmark.longitude,
                    bookmark.zoom,
                    bookmark.created_at,
                    bookmark.accessed_at,
                    bookmark.modified_at,
                ],
            )
            .map_err(|err| map_write_error(err, &bookmark.name))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_bookmark(&self, bookmark: &Bookmark) -> RepoResult<()> {
        let id = bookmark.id.ok_or(RepoError::MissingId)?;
        bookmark.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE bookmark
                 SET
                    name = ?1,
                    category = ?2,
                    description = ?3,
                    url = ?4,
                    color = ?5,
                    display_marker = ?6,
                    latitude = ?7,
                    longitude = ?8,
                    zoom = ?9,
                    accessed_at = ?10,
                    modified_at = ?11
                 WHERE id = ?12;",
                params![
                    bookmark.name.as_str(),
                    bookmark.category.as_str(),
                    bookmark.description.as_str(),
                    bookmark.url.as_deref(),
                    bookmark.color.as_str(),
                    bool_to_int(bookmark.display_marker),
                    bookmark.latitude,
                    bookmark.longitude,
                    bookmark.zoom,
                    bookmark.accessed_at,
                    bookmark.modified_at,
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, &bookmark.name))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_bookmark(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKMARK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_bookmark_row(row)?));
        }
        Ok(None)
    }

    fn load_bookmarks(&self) -> RepoResult<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(&format!("{BOOKMARK_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut bookmarks = Vec::new();
        while let Some(row) = rows.next()? {
            bookmarks.push(parse_bookmark_row(row)?);
        }
        bookmarks.sort_by(compare_for_listing);
        Ok(bookmarks)
    }

    fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM bookmark WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_category(&self, category: &str) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM bookmark WHERE category = ?1;", [category])?;
        Ok(removed)
    }

    fn touch_accessed(&self, id: BookmarkId, accessed_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE bookmark SET accessed_at = ?1 WHERE id = ?2;",
            params![accessed_at, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

/// Category, then name, then description; case-insensitive with a
/// case-sensitive tie break so the order is total.
fn compare_for_listing(a: &Bookmark, b: &Bookmark) -> Ordering {
    let key = |bookmark: &Bookmark| {
        (
            bookmark.category.to_lowercase(),
            bookmark.name.to_lowercase(),
            bookmark.description.to_lowercase(),
        )
    };
    key(a)
        .cmp(&key(b))
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.name.cmp(&b.name))
}

fn parse_bookmark_row(row: &Row<'_>) -> RepoResult<Bookmark> {
    let display_marker = match row.get::<_, i64>("display_marker")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid display_marker value `{other}` in bookmark.display_marker"
            )));
        }
    };

    let bookmark = Bookmark {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        category: row.get("category")?,
        description: row.get("description")?,
        url: row.get("url")?,
        color: row.get("color")?,
        display_marker,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        zoom: row.get("zoom")?,
        created_at: row.get("created_at")?,
        accessed_at: row.get("accessed_at")?,
        modified_at: row.get("modified_at")?,
    };
    bookmark
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(bookmark)
}

fn map_write_error(err: rusqlite::Error, name: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateName(name.to_string())
        }
        _ => RepoError::from(err),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
