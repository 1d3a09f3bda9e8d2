//! Area activities: polygons with an optional active period.
//!
//! Activities carry no observations. An activity stays in the time-filtered
//! view while its period overlaps the temporal window; an open end overlaps
//! everything on that side.

use crate::filter::FormFilter;
use crate::manager::base::{BaseManager, DomainStrategy, ManagerError};
use crate::manager::ext::PointExt;
use crate::manager::DomainManager;
use crate::model::geo::Polygon;
use crate::model::point::Point;
use crate::temporal::{TemporalManager, TemporalRange};
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

pub const DOMAIN: &str = "activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Planned,
    Ongoing,
    Finished,
}

impl ActivityStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Ongoing => "Ongoing",
            Self::Finished => "Finished",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    pub area: Polygon,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl ActivityData {
    pub fn status_at(&self, at: NaiveDateTime) -> ActivityStatus {
        if self.from.is_some_and(|from| at < from) {
            ActivityStatus::Planned
        } else if self.to.is_some_and(|to| at > to) {
            ActivityStatus::Finished
        } else {
            ActivityStatus::Ongoing
        }
    }
}

pub type Activity = Point<ActivityData>;

/// Orders by start date (undated last), then name; retains by period overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityStrategy;

impl DomainStrategy<ActivityData> for ActivityStrategy {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn compare(&self, a: &Activity, b: &Activity) -> Ordering {
        match (a.domain.from, b.domain.from) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.name.cmp(&b.name))
    }

    fn retain(&self, point: &Activity, _ext: &PointExt, temporal: &TemporalManager) -> bool {
        temporal
            .window()
            .overlaps(point.domain.from, point.domain.to)
    }

    fn date_range(&self, point: &Activity) -> Option<TemporalRange> {
        TemporalRange::of_dates(point.domain.from.into_iter().chain(point.domain.to))
    }
}

pub struct ActivityManager {
    base: BaseManager<ActivityData, ActivityStrategy>,
}

impl ActivityManager {
    pub(crate) fn new() -> Self {
        Self {
            base: BaseManager::new(ActivityStrategy),
        }
    }

    pub fn base(&self) -> &BaseManager<ActivityData, ActivityStrategy> {
        &self.base
    }

    /// Replaces the activities; fills missing positions from area centroids
    /// and derives status at `now`.
    pub(crate) fn load(
        &mut self,
        mut activities: Vec<Activity>,
        now: NaiveDateTime,
        temporal: &TemporalManager,
    ) -> Uuid {
        for activity in &mut activities {
            if activity.position.is_none() {
                activity.position = activity.domain.area.centroid();
            }
            activity.status = activity.domain.status_at(now).label().to_string();
        }

        let count = activities.len();
        let snapshot_id = self.base.init_all_items(activities);
        self.base.apply_temporal_filter(temporal);
        info!("event=activity_load module=domain status=ok activities={count}");
        snapshot_id
    }
}

impl DomainManager for ActivityManager {
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

#[cfg(test)]
mod tests {
    use super::{ActivityData, ActivityStatus};
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn status_follows_period() {
        let data = ActivityData {
            from: Some(day(3, 1)),
            to: Some(day(5, 1)),
            ..ActivityData::default()
        };
        assert_eq!(data.status_at(day(2, 1)), ActivityStatus::Planned);
        assert_eq!(data.status_at(day(4, 1)), ActivityStatus::Ongoing);
        assert_eq!(data.status_at(day(6, 1)), ActivityStatus::Finished);
        assert_eq!(ActivityData::default().status_at(day(1, 1)), ActivityStatus::Ongoing);
    }
}
