//! Monitoring data managers.
//!
//! # Responsibility
//! - Hold one loaded dataset per domain with its filtered views.
//! - Keep per-point statistics in step with the temporal window.
//!
//! # Invariants
//! - Views are derived, never authoritative; reloading replaces everything.

pub mod base;
pub mod ext;

use crate::filter::FormFilter;
use crate::manager::base::ManagerError;
use crate::temporal::{TemporalManager, TemporalRange};

/// Window-dependent operations the monitoring context drives on each domain.
///
/// Every method that needs the window receives the context's own temporal
/// manager; callers outside the crate go through the context instead.
pub(crate) trait DomainManager {
    fn domain(&self) -> &'static str;
    /// Re-runs the temporal filter; must tolerate repeats and any order.
    fn on_temporal_changed(&mut self, temporal: &TemporalManager);
    /// Date span of the currently loaded dataset.
    fn temporal_range(&self) -> Option<TemporalRange>;
    fn form_filter(&self) -> &FormFilter;
    fn set_form_filter(
        &mut self,
        filter: FormFilter,
        temporal: &TemporalManager,
    ) -> Result<(), ManagerError>;
    fn select(&mut self, name: &str) -> bool;
    fn clear_selection(&mut self);
}
