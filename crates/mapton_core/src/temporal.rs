//! Global date window and dataset date ranges.
//!
//! # Responsibility
//! - Hold the `[low, high]` window every monitoring manager filters against.
//! - Compute the `[first, last]` range of a loaded dataset.
//!
//! # Invariants
//! - `low <= high` at all times.
//! - `revision` increases by one on every effective window change and never
//!   otherwise, so managers can skip redundant recomputation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Closed date interval `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalRange {
    first: NaiveDateTime,
    last: NaiveDateTime,
}

impl TemporalRange {
    /// Returns `None` when `first > last`.
    pub fn new(first: NaiveDateTime, last: NaiveDateTime) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    /// Min/max over `dates`; `None` for an empty input.
    pub fn of_dates(dates: impl IntoIterator<Item = NaiveDateTime>) -> Option<Self> {
        dates.into_iter().fold(None, |range, date| match range {
            None => Some(Self {
                first: date,
                last: date,
            }),
            Some(Self { first, last }) => Some(Self {
                first: first.min(date),
                last: last.max(date),
            }),
        })
    }

    pub fn first(&self) -> NaiveDateTime {
        self.first
    }

    pub fn last(&self) -> NaiveDateTime {
        self.last
    }

    pub fn contains(&self, date: NaiveDateTime) -> bool {
        self.first <= date && date <= self.last
    }

    /// Overlap test against a period whose ends may be open.
    pub fn overlaps(&self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> bool {
        from.map_or(true, |from| from <= self.last) && to.map_or(true, |to| to >= self.first)
    }

    pub fn union(&self, other: &TemporalRange) -> TemporalRange {
        Self {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    InvertedWindow {
        low: NaiveDateTime,
        high: NaiveDateTime,
    },
}

impl Display for TemporalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvertedWindow { low, high } => {
                write!(f, "temporal window low {low} is after high {high}")
            }
        }
    }
}

impl Error for TemporalError {}

/// The shared date window.
///
/// One instance lives in the monitoring context and is passed by reference to
/// every manager that filters on time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalManager {
    window: TemporalRange,
    revision: u64,
}

impl Default for TemporalManager {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TemporalManager {
    pub fn new(low: NaiveDateTime, high: NaiveDateTime) -> Result<Self, TemporalError> {
        let window =
            TemporalRange::new(low, high).ok_or(TemporalError::InvertedWindow { low, high })?;
        Ok(Self {
            window,
            revision: 0,
        })
    }

    /// A window accepting every representable date.
    pub fn unbounded() -> Self {
        Self {
            window: TemporalRange {
                first: NaiveDateTime::MIN,
                last: NaiveDateTime::MAX,
            },
            revision: 0,
        }
    }

    pub fn low(&self) -> NaiveDateTime {
        self.window.first
    }

    pub fn high(&self) -> NaiveDateTime {
        self.window.last
    }

    pub fn window(&self) -> TemporalRange {
        self.window
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// `low <= date <= high`.
    pub fn is_valid(&self, date: NaiveDateTime) -> bool {
        self.window.contains(date)
    }

    /// Replaces the window. Returns whether anything changed.
    pub fn set_range(&mut self, low: NaiveDateTime, high: NaiveDateTime) -> Result<bool, TemporalError> {
        let window =
            TemporalRange::new(low, high).ok_or(TemporalError::InvertedWindow { low, high })?;
        Ok(self.install(window))
    }

    /// Sets the window to exactly `range`, typically a freshly loaded dataset's span.
    pub fn fit_to(&mut self, range: &TemporalRange) -> bool {
        self.install(*range)
    }

    fn install(&mut self, window: TemporalRange) -> bool {
        if self.window == window {
            return false;
        }
        self.window = window;
        self.revision += 1;
        true
    }
}
