//! Bookmark use-case service.
//!
//! # Responsibility
//! - Provide the add/edit/remove/browse entry points used by the bookmark UI.
//! - Stamp modification and access times.
//!
//! # Invariants
//! - Never bypasses repository validation.
//! - Category edits never abort half way: every bookmark is attempted and
//!   failures are collected into the returned report.

use crate::model::bookmark::{now_epoch_ms, Bookmark, BookmarkId};
use crate::repo::bookmark_repo::{BookmarkRepository, RepoError, RepoResult};
use log::{info, warn};
use std::collections::BTreeSet;

pub struct BookmarkService<R: BookmarkRepository> {
    repo: R,
}

/// Outcome of a bulk category rename.
#[derive(Debug, Default)]
pub struct CategoryEditReport {
    pub updated: usize,
    /// `(bookmark name, error)` for every bookmark that was not updated.
    pub failed: Vec<(String, RepoError)>,
}

impl CategoryEditReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// One `name: error` line per failure, for an error dialog.
    pub fn failure_summary(&self) -> String {
        self.failed
            .iter()
            .map(|(name, err)| format!("{name}: {err}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<R: BookmarkRepository> BookmarkService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts `bookmark` and returns its assigned id.
    pub fn add(&self, bookmark: &Bookmark) -> RepoResult<BookmarkId> {
        let id = self.repo.insert_bookmark(bookmark)?;
        info!("event=bookmark_add module=service status=ok id={id}");
        Ok(id)
    }

    /// Saves edits and bumps `modified_at`.
    pub fn edit(&self, bookmark: &mut Bookmark) -> RepoResult<()> {
        bookmark.modified_at = now_epoch_ms();
        self.repo.update_bookmark(bookmark)
    }

    pub fn get(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
        self.repo.get_bookmark(id)
    }

    /// All bookmarks ordered by category, name, description.
    pub fn list(&self) -> RepoResult<Vec<Bookmark>> {
        self.repo.load_bookmarks()
    }

    pub fn filter(&self, text: &str) -> RepoResult<Vec<Bookmark>> {
        let mut bookmarks = self.repo.load_bookmarks()?;
        bookmarks.retain(|bookmark| bookmark.matches_text(text));
        Ok(bookmarks)
    }

    /// Distinct categories in sorted order.
    pub fn categories(&self) -> RepoResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .repo
            .load_bookmarks()?
            .into_iter()
            .map(|bookmark| bookmark.category)
            .collect();
        Ok(categories.into_iter().collect())
    }

    pub fn remove(&self, id: BookmarkId) -> RepoResult<()> {
        self.repo.delete_bookmark(id)?;
        info!("event=bookmark_remove module=service status=ok id={id}");
        Ok(())
    }

    pub fn remove_category(&self, category: &str) -> RepoResult<usize> {
        let removed = self.repo.delete_category(category)?;
        info!("event=bookmark_remove_category module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Moves every bookmark of `from` into `to`, one update per bookmark.
    pub fn rename_category(&self, from: &str, to: &str) -> RepoResult<CategoryEditReport> {
        let mut report = CategoryEditReport::default();
        let now = now_epoch_ms();

        for mut bookmark in self
            .repo
            .load_bookmarks()?
            .into_iter()
            .filter(|bookmark| bookmark.category == from)
        {
            bookmark.category = to.to_string();
            bookmark.modified_at = now;
            match self.repo.update_bookmark(&bookmark) {
                Ok(()) => report.updated += 1,
                Err(err) => report.failed.push((bookmark.name, err)),
            }
        }

        if report.is_complete() {
            info!(
                "event=bookmark_rename_category module=service status=ok updated={}",
                report.updated
            );
        } else {
            warn!(
                "event=bookmark_rename_category module=service status=partial updated={} failed={}",
                report.updated,
                report.failed.len()
            );
        }
        Ok(report)
    }

    /// Records that the user navigated to `id` and returns the bookmark.
    pub fn go_to(&self, id: BookmarkId) -> RepoResult<Bookmark> {
        let accessed_at = now_epoch_ms();
        self.repo.touch_accessed(id, accessed_at)?;
        self.repo.get_bookmark(id)?.ok_or(RepoError::NotFound(id))
    }
}
