//! Structural monitoring: crack gauges and load cells.
//!
//! Deltas are measured against the latest zero (or replacement) reading, and
//! the latest delta inside the temporal window is classified against the
//! point's alarm limits.

use crate::domain::{attach_observations, deltas_from_reference, LoadSummary, ObservationRecord};
use crate::filter::FormFilter;
use crate::manager::base::{BaseManager, DomainStrategy, ManagerError};
use crate::manager::DomainManager;
use crate::model::point::Point;
use crate::temporal::{TemporalManager, TemporalRange};
use log::info;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DOMAIN: &str = "structural";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralKind {
    Crack,
    LoadCell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralData {
    pub kind: StructuralKind,
    /// Unit of the primary value, e.g. `mm` or `kN`.
    pub unit: String,
}

impl StructuralData {
    pub fn crack() -> Self {
        Self {
            kind: StructuralKind::Crack,
            unit: "mm".to_string(),
        }
    }

    pub fn load_cell() -> Self {
        Self {
            kind: StructuralKind::LoadCell,
            unit: "kN".to_string(),
        }
    }
}

pub type StructuralPoint = Point<StructuralData>;

/// Cracks first, then load cells, alphabetical within each kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralStrategy;

impl DomainStrategy<StructuralData> for StructuralStrategy {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn compare(&self, a: &StructuralPoint, b: &StructuralPoint) -> Ordering {
        a.domain
            .kind
            .cmp(&b.domain.kind)
            .then_with(|| a.name.cmp(&b.name))
    }
}

pub struct StructuralManager {
    base: BaseManager<StructuralData, StructuralStrategy>,
}

impl StructuralManager {
    pub(crate) fn new() -> Self {
        Self {
            base: BaseManager::new(StructuralStrategy),
        }
    }

    pub fn base(&self) -> &BaseManager<StructuralData, StructuralStrategy> {
        &self.base
    }

    pub(crate) fn load(
        &mut self,
        mut points: Vec<StructuralPoint>,
        observations: Vec<ObservationRecord>,
        temporal: &TemporalManager,
    ) -> LoadSummary {
        let stats = attach_observations(DOMAIN, &mut points, observations);
        for point in &mut points {
            deltas_from_reference(&mut point.observations);
        }

        let point_count = points.len();
        let snapshot_id = self.base.init_all_items(points);
        self.base.apply_temporal_filter(temporal);

        info!(
            "event=structural_load module=domain status=ok points={point_count} observations={}",
            stats.attached
        );
        LoadSummary {
            snapshot_id,
            points: point_count,
            observations: stats.attached,
            unmatched_observations: stats.unmatched,
            unmatched_channels: 0,
            unsorted_points: stats.unsorted_points,
        }
    }

    /// Time-filtered points of one kind.
    pub fn time_filtered_of_kind(
        &self,
        kind: StructuralKind,
    ) -> impl Iterator<Item = &StructuralPoint> + '_ {
        self.base
            .time_filtered_items()
            .filter(move |point| point.domain.kind == kind)
    }
}

impl DomainManager for StructuralManager {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn on_temporal_changed(&mut self, temporal: &TemporalManager) {
        self.base.apply_temporal_filter(temporal);
    }

    fn temporal_range(&self) -> Option<TemporalRange> {
        self.base.temporal_range()
    }

    fn form_filter(&self) -> &FormFilter {
        self.base.form_filter()
    }

    fn set_form_filter(
        &mut self,
        filter: FormFilter,
        temporal: &TemporalManager,
    ) -> Result<(), ManagerError> {
        self.base.set_form_filter(filter, temporal)
    }

    fn select(&mut self, name: &str) -> bool {
        self.base.select(name)
    }

    fn clear_selection(&mut self) {
        self.base.clear_selection();
    }
}
