//! Core logic for Mapton: monitoring managers, filters and bookmarks.
//! This crate owns every data invariant; front ends only render and forward input.

pub mod config;
pub mod context;
pub mod db;
pub mod dispatch;
pub mod domain;
pub mod export;
pub mod filter;
pub mod logging;
pub mod manager;
pub mod model;
pub mod registry;
pub mod repo;
pub mod seasonal;
pub mod service;
pub mod temporal;

pub use config::{ConfigError, MapPreferences, Preferences, SourceList};
pub use context::MonitoringContext;
pub use db::{open_db, open_db_in_memory, DbError};
pub use dispatch::{DispatchHandle, Dispatcher};
pub use domain::{Domain, LoadSummary};
pub use filter::FormFilter;
pub use logging::{default_log_level, init_logging, logging_status};
pub use manager::base::{BaseManager, DomainStrategy, ManagerError};
pub use manager::ext::PointExt;
pub use model::bookmark::{Bookmark, BookmarkId, BookmarkValidationError};
pub use model::geo::{GeoPoint, Polygon};
pub use model::observation::Observation;
pub use model::point::{AlarmConfig, AlarmLevel, Facet, Point};
pub use repo::bookmark_repo::{
    BookmarkRepository, RepoError, RepoResult, SqliteBookmarkRepository,
};
pub use service::bookmark_service::{BookmarkService, CategoryEditReport};
pub use temporal::{TemporalError, TemporalManager, TemporalRange};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
