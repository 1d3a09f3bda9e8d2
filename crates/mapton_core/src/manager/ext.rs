//! Per-point derived state recomputed on every temporal change.

use crate::model::observation::{Observation, YearMonth};
use crate::model::point::{AlarmLevel, Point};
use crate::temporal::TemporalManager;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Derived statistics of one point.
///
/// `date_first`/`date_latest` describe the raw series and only change on
/// reload. Everything else describes the observations inside the current
/// temporal window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointExt {
    pub date_first: Option<NaiveDateTime>,
    pub date_latest: Option<NaiveDateTime>,
    /// Indices into `Point::observations`, ascending.
    pub filtered_observations: Vec<usize>,
    pub measurement_histogram: BTreeMap<YearMonth, usize>,
    /// Delta of the latest retained observation, or its raw reading when it
    /// carries no delta.
    pub latest_delta: Option<f64>,
    pub alarm_level: Option<AlarmLevel>,
}

impl PointExt {
    pub fn for_point<D>(point: &Point<D>) -> Self {
        Self {
            date_first: point.date_first(),
            date_latest: point.date_latest(),
            ..Self::default()
        }
    }

    /// Rebuilds the window-dependent fields from `point`'s raw observations.
    pub fn recompute<D>(&mut self, point: &Point<D>, temporal: &TemporalManager) {
        self.filtered_observations.clear();
        self.measurement_histogram.clear();

        for (index, observation) in point.observations.iter().enumerate() {
            if temporal.is_valid(observation.date) {
                self.filtered_observations.push(index);
                *self
                    .measurement_histogram
                    .entry(observation.year_month())
                    .or_insert(0) += 1;
            }
        }

        self.latest_delta = self
            .filtered_observations
            .last()
            .and_then(|&index| point.observations.get(index))
            .and_then(|observation| observation.delta.or_else(|| observation.primary_value()));
        self.alarm_level = match (&point.alarm, self.latest_delta) {
            (Some(alarm), Some(delta)) => Some(alarm.classify(delta)),
            _ => None,
        };
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_observations.len()
    }

    pub fn filtered<'a, D>(&'a self, point: &'a Point<D>) -> impl Iterator<Item = &'a Observation> + 'a {
        self.filtered_observations
            .iter()
            .filter_map(move |&index| point.observations.get(index))
    }

    pub fn filtered_first_date<D>(&self, point: &Point<D>) -> Option<NaiveDateTime> {
        self.filtered(point).next().map(|observation| observation.date)
    }

    pub fn filtered_latest_date<D>(&self, point: &Point<D>) -> Option<NaiveDateTime> {
        self.filtered(point).last().map(|observation| observation.date)
    }
}

#[cfg(test)]
mod tests {
    use super::PointExt;
    use crate::model::observation::{Observation, YearMonth};
    use crate::model::point::{AlarmConfig, AlarmLevel, Point};
    use crate::temporal::TemporalManager;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn recompute_counts_only_observations_inside_window() {
        let mut point = Point::new("P", ());
        point.alarm = Some(AlarmConfig::new("A", 1.0, 3.0));
        point.observations = vec![
            Observation::with_value(day(2023, 1, 10), 0.1),
            Observation::with_value(day(2023, 2, 5), 0.2),
            Observation::with_value(day(2023, 2, 20), 1.5),
            Observation::with_value(day(2023, 4, 1), 9.0),
        ];
        let temporal = TemporalManager::new(day(2023, 2, 1), day(2023, 3, 31)).expect("window");

        let mut ext = PointExt::for_point(&point);
        ext.recompute(&point, &temporal);

        assert_eq!(ext.filtered_observations, vec![1, 2]);
        assert_eq!(ext.measurement_histogram.len(), 1);
        assert_eq!(
            ext.measurement_histogram.get(&YearMonth { year: 2023, month: 2 }),
            Some(&2)
        );
        assert_eq!(ext.latest_delta, Some(1.5));
        assert_eq!(ext.alarm_level, Some(AlarmLevel::Warning));
        assert_eq!(ext.date_first, Some(day(2023, 1, 10)));
        assert_eq!(ext.date_latest, Some(day(2023, 4, 1)));
        assert_eq!(ext.filtered_latest_date(&point), Some(day(2023, 2, 20)));
    }

    #[test]
    fn recompute_prefers_delta_over_raw_reading() {
        let mut point = Point::new("P", ());
        let mut observation = Observation::with_value(day(2023, 1, 1), 100.0);
        observation.delta = Some(-0.4);
        point.observations.push(observation);

        let mut ext = PointExt::for_point(&point);
        ext.recompute(&point, &TemporalManager::unbounded());
        assert_eq!(ext.latest_delta, Some(-0.4));
        assert_eq!(ext.alarm_level, None);
    }
}
