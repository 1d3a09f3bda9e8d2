//! Acoustic vibration monitoring.
//!
//! A vibration point is `S1` while at least one of its monitoring channels
//! covers "now", and `S5` otherwise. The status is derived on every load and
//! never stored.

use crate::domain::{attach_observations, point_key_index, LoadSummary, ObservationRecord};
use crate::filter::FormFilter;
use crate::manager::base::{BaseManager, DomainStrategy, ManagerError};
use crate::manager::DomainManager;
use crate::model::point::Point;
use crate::temporal::{TemporalManager, TemporalRange};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const DOMAIN: &str = "vibration";

/// Channel status codes shown in the status facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VibrationStatus {
    /// Has a channel active now.
    S1,
    /// No active channel.
    S5,
}

impl VibrationStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S5 => "S5",
        }
    }
}

/// One measuring channel of a vibration point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub from: NaiveDateTime,
    /// Open-ended while `None`.
    pub to: Option<NaiveDateTime>,
}

impl Channel {
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.from <= at && self.to.map_or(true, |to| at <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VibrationData {
    pub channels: Vec<Channel>,
}

impl VibrationData {
    pub fn status_at(&self, at: NaiveDateTime) -> VibrationStatus {
        if self.channels.iter().any(|channel| channel.is_active_at(at)) {
            VibrationStatus::S1
        } else {
            VibrationStatus::S5
        }
    }
}

pub type VibrationPoint = Point<VibrationData>;

/// Channel row keyed by the owning point's name or external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub point_key: String,
    pub channel: Channel,
}

impl ChannelRecord {
    pub fn new(point_key: impl Into<String>, channel: Channel) -> Self {
        Self {
            point_key: point_key.into(),
            channel,
        }
    }
}

/// Raw rows of one vibration snapshot.
#[derive(Debug, Clone, Default)]
pub struct VibrationDataset {
    pub points: Vec<VibrationPoint>,
    pub channels: Vec<ChannelRecord>,
    pub observations: Vec<ObservationRecord>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VibrationStrategy;

impl DomainStrategy<VibrationData> for VibrationStrategy {
    fn domain(&self) -> &'static str {
        DOMAIN
    }
}

pub struct VibrationManager {
    base: BaseManager<VibrationData, VibrationStrategy>,
}

impl VibrationManager {
    pub(crate) fn new() -> Self {
        Self {
            base: BaseManager::new(VibrationStrategy),
        }
    }

    pub fn base(&self) -> &BaseManager<VibrationData, VibrationStrategy> {
        &self.base
    }

    /// Replaces the dataset, derives channel status at `now` and applies the window.
    pub(crate) fn load(
        &mut self,
        dataset: VibrationDataset,
        now: NaiveDateTime,
        temporal: &TemporalManager,
    ) -> LoadSummary {
        let VibrationDataset {
            mut points,
            channels,
            observations,
        } = dataset;

        let by_key = point_key_index(&points);
        let mut attached = Vec::with_capacity(channels.len());
        let mut unmatched_channels = 0;
        for record in channels {
            match by_key.get(record.point_key.as_str()) {
                Some(&index) => attached.push((index, record.channel)),
                None => unmatched_channels += 1,
            }
        }
        drop(by_key);
        for (index, channel) in attached {
            points[index].domain.channels.push(channel);
        }
        if unmatched_channels > 0 {
            warn!(
                "event=channel_attach module=domain status=partial domain={DOMAIN} unmatched={unmatched_channels}"
            );
        }

        let stats = attach_observations(DOMAIN, &mut points, observations);
        for point in &mut points {
            point.status = point.domain.status_at(now).code().to_string();
        }

        let active = points
            .iter()
            .filter(|point| point.status == VibrationStatus::S1.code())
            .count();
        let point_count = points.len();
        let snapshot_id = self.base.init_all_items(points);
        self.base.apply_temporal_filter(temporal);

        info!(
            "event=vibration_load module=domain status=ok points={point_count} active={active} observations={}",
            stats.attached
        );
        LoadSummary {
            snapshot_id,
            points: point_count,
            observations: stats.attached,
            unmatched_observations: stats.unmatched,
            unmatched_channels,
            unsorted_points: stats.unsorted_points,
        }
    }
}

impl DomainManager for VibrationManager {
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
