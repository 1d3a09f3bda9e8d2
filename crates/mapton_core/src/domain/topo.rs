//! Topographic control points.

use crate::domain::{attach_observations, deltas_from_reference, LoadSummary, ObservationRecord};
use crate::filter::FormFilter;
use crate::manager::base::{BaseManager, ByName, ManagerError};
use crate::manager::DomainManager;
use crate::model::point::Point;
use crate::temporal::{TemporalManager, TemporalRange};
use log::info;
use serde::{Deserialize, Serialize};

pub const DOMAIN: &str = "topo";

/// Number of measured coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Height only.
    D1,
    /// Plane position.
    D2,
    /// Plane position and height.
    D3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoData {
    pub dimension: Dimension,
}

pub type TopoPoint = Point<TopoData>;

pub struct TopoManager {
    base: BaseManager<TopoData, ByName>,
}

impl TopoManager {
    pub(crate) fn new() -> Self {
        Self {
            base: BaseManager::new(ByName(DOMAIN)),
        }
    }

    pub fn base(&self) -> &BaseManager<TopoData, ByName> {
        &self.base
    }

    pub(crate) fn load(
        &mut self,
        mut points: Vec<TopoPoint>,
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
            "event=topo_load module=domain status=ok points={point_count} observations={}",
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
}

impl DomainManager for TopoManager {
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
