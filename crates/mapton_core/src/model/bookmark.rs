//! Bookmark domain model.
//!
//! # Responsibility
//! - Define a saved map view (position + zoom) grouped by category.
//! - Validate bookmark fields before they reach storage.
//!
//! # Invariants
//! - `name` is non-blank; uniqueness is enforced by storage.
//! - `latitude`/`longitude` are WGS84 degrees; `zoom` lies in `[0, 1]`.
//! - `color` is a six digit hex RGB string without `#`.
//! - Timestamps are Unix epoch milliseconds.

use crate::model::geo::GeoPoint;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned bookmark id.
pub type BookmarkId = i64;

pub const DEFAULT_BOOKMARK_COLOR: &str = "FFFF00";

/// Saved map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// `None` until the bookmark has been inserted.
    pub id: Option<BookmarkId>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub url: Option<String>,
    pub color: String,
    pub display_marker: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub created_at: i64,
    pub accessed_at: i64,
    pub modified_at: i64,
}

impl Bookmark {
    /// Creates an unsaved bookmark stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        latitude: f64,
        longitude: f64,
        zoom: f64,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            description: String::new(),
            url: None,
            color: DEFAULT_BOOKMARK_COLOR.to_string(),
            display_marker: true,
            latitude,
            longitude,
            zoom,
            created_at: now,
            accessed_at: now,
            modified_at: now,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Case-insensitive substring match on name, category and description.
    ///
    /// A blank needle matches every bookmark.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.name, &self.category, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), BookmarkValidationError> {
        if self.name.trim().is_empty() {
            return Err(BookmarkValidationError::BlankName);
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(BookmarkValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(BookmarkValidationError::LongitudeOutOfRange(self.longitude));
        }
        if !self.zoom.is_finite() || !(0.0..=1.0).contains(&self.zoom) {
            return Err(BookmarkValidationError::ZoomOutOfRange(self.zoom));
        }
        if self.color.len() != 6 || !self.color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BookmarkValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

/// Field-level bookmark validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkValidationError {
    BlankName,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    ZoomOutOfRange(f64),
    InvalidColor(String),
}

impl Display for BookmarkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "bookmark name cannot be blank"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            Self::ZoomOutOfRange(value) => write!(f, "zoom {value} is outside [0, 1]"),
            Self::InvalidColor(value) => write!(f, "color `{value}` is not RRGGBB hex"),
        }
    }
}

impl Error for BookmarkValidationError {}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{Bookmark, BookmarkValidationError};

    #[test]
    fn new_bookmark_is_valid_and_unsaved() {
        let bookmark = Bookmark::new("Home", "Places", 57.7, 11.97, 0.4);
        assert!(bookmark.id.is_none());
        assert_eq!(bookmark.created_at, bookmark.modified_at);
        bookmark.validate().expect("fresh bookmark should validate");
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let mut bookmark = Bookmark::new("  ", "", 0.0, 0.0, 0.5);
        assert_eq!(bookmark.validate(), Err(BookmarkValidationError::BlankName));

        bookmark.name = "x".to_string();
        bookmark.zoom = 1.5;
        assert_eq!(
            bookmark.validate(),
            Err(BookmarkValidationError::ZoomOutOfRange(1.5))
        );

        bookmark.zoom = 0.5;
        bookmark.color = "#FF00".to_string();
        assert!(matches!(
            bookmark.validate(),
            Err(BookmarkValidationError::InvalidColor(_))
        ));
    }

    #[test]
    fn matches_text_is_case_insensitive() {
        let mut bookmark = Bookmark::new("Göta älv bridge", "Infra", 57.7, 11.9, 0.2);
        bookmark.description = "Crack monitoring site".to_string();
        assert!(bookmark.matches_text("BRIDGE"));
        assert!(bookmark.matches_text("crack"));
        assert!(bookmark.matches_text(""));
        assert!(!bookmark.matches_text("tunnel"));
    }
}
