//! Domain model shared by bookmarks and the monitoring managers.
//!
//! # Responsibility
//! - Define the plain data carried between persistence, filters and managers.
//! - Keep validation next to the data it guards.
//!
//! # Invariants
//! - Points are identified by name within one loaded dataset.
//! - Observations are owned by exactly one point.

pub mod bookmark;
pub mod geo;
pub mod observation;
pub mod point;
