//! Form filter: free text, facets, measurement and geographic predicates.
//!
//! # Responsibility
//! - Narrow a manager's loaded points to its `filtered` view. Managers keep
//!   the installed filter and re-run it on reload.
//!
//! # Invariants
//! - Predicates run in a fixed order: free text, facets, measurements,
//!   geographic bounds, then the optional invert.
//! - Inactive predicates accept everything.
//! - Results are ascending indices into the item slice they were computed on.

pub mod check_model;
pub mod free_text;
pub mod geo_bounds;

pub use check_model::CheckModel;
pub use free_text::FreeText;
pub use geo_bounds::{GeoBounds, RulerBounds};

use crate::model::point::{Facet, Point};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Predicate state of one filter form.
#[derive(Debug, Clone, Default)]
pub struct FormFilter {
    free_text: FreeText,
    facets: BTreeMap<Facet, CheckModel>,
    /// Minimum number of raw observations.
    pub min_measurements: Option<usize>,
    /// Latest raw observation must fall on or after this day.
    pub measured_since: Option<NaiveDate>,
    pub geo: GeoBounds,
    pub invert: bool,
}

impl FormFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn free_text(&self) -> &FreeText {
        &self.free_text
    }

    /// Replaces the free text. Invalid globs leave the previous text in place.
    pub fn set_free_text(&mut self, text: &str) -> Result<(), regex::Error> {
        self.free_text = FreeText::parse(text)?;
        Ok(())
    }

    pub fn check_model(&self, facet: Facet) -> Option<&CheckModel> {
        self.facets.get(&facet)
    }

    pub fn check_model_mut(&mut self, facet: Facet) -> &mut CheckModel {
        self.facets.entry(facet).or_default()
    }

    /// Offers the distinct non-blank values of `items` in every facet's model.
    pub fn populate_check_models<D>(&mut self, items: &[Point<D>]) {
        for facet in Facet::ALL {
            let values: BTreeSet<&str> = items
                .iter()
                .filter_map(|point| point.facet_value(facet))
                .collect();
            self.check_model_mut(facet).set_available(values);
        }
    }

    /// Resets every predicate to "accept all".
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Result of the predicates for one point, before inversion.
    pub fn matches<D>(&self, point: &Point<D>) -> bool {
        self.free_text
            .matches_any(&[
                point.name.as_str(),
                point.group.as_str(),
                point.comment.as_str(),
            ])
            && self
                .facets
                .iter()
                .all(|(facet, model)| model.accepts(point.facet_value(*facet)))
            && self
                .min_measurements
                .map_or(true, |min| point.observations.len() >= min)
            && self.measured_since.map_or(true, |since| {
                point
                    .date_latest()
                    .is_some_and(|latest| latest.date() >= since)
            })
            && self.geo.accepts(point.position.as_ref())
    }

    /// Ascending indices of the items that pass, honouring `invert`.
    pub fn apply<D>(&self, items: &[Point<D>]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, point)| self.matches(point) != self.invert)
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{FormFilter, RulerBounds};
    use crate::model::geo::GeoPoint;
    use crate::model::observation::Observation;
    use crate::model::point::{Facet, Point};
    use chrono::NaiveDate;

    fn items() -> Vec<Point<()>> {
        let mut a = Point::new("Alpha", ()).at(GeoPoint::new(57.70, 11.97));
        a.group = "North".to_string();
        a.status = "S1".to_string();
        let mut b = Point::new("Beta", ()).at(GeoPoint::new(59.33, 18.07));
        b.group = "South".to_string();
        b.comment = "near alpha gate".to_string();
        b.observations.push(Observation::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid date"),
        ));
        let c = Point::new("Gamma", ());
        vec![a, b, c]
    }

    #[test]
    fn free_text_searches_name_group_and_comment() {
        let mut filter = FormFilter::new();
        filter.set_free_text("alpha").expect("valid text");
        assert_eq!(filter.apply(&items()), vec![0, 1]);
        filter.set_free_text("south").expect("valid text");
        assert_eq!(filter.apply(&items()), vec![1]);
    }

    #[test]
    fn facet_checks_narrow_and_populate() {
        let points = items();
        let mut filter = FormFilter::new();
        filter.populate_check_models(&points);
        let groups = filter.check_model(Facet::Group).expect("populated");
        assert_eq!(groups.available().len(), 2);

        filter.check_model_mut(Facet::Group).check("North");
        assert_eq!(filter.apply(&points), vec![0]);

        filter.check_model_mut(Facet::Group).set_enabled(false);
        assert_eq!(filter.apply(&points), vec![0, 1, 2]);
    }

    #[test]
    fn measurement_predicates_use_raw_series() {
        let points = items();
        let mut filter = FormFilter::new();
        filter.min_measurements = Some(1);
        assert_eq!(filter.apply(&points), vec![1]);

        filter.min_measurements = None;
        filter.measured_since = NaiveDate::from_ymd_opt(2024, 4, 1);
        assert!(filter.apply(&points).is_empty());
    }

    #[test]
    fn ruler_excludes_far_and_unpositioned_points() {
        let mut filter = FormFilter::new();
        filter.geo.ruler = Some(RulerBounds::new(GeoPoint::new(57.7, 11.9), 20_000.0));
        assert_eq!(filter.apply(&items()), vec![0]);
    }

    #[test]
    fn invert_returns_complement() {
        let points = items();
        let mut filter = FormFilter::new();
        filter.set_free_text("beta").expect("valid text");
        let plain = filter.apply(&points);
        filter.invert = true;
        let inverted = filter.apply(&points);
        assert_eq!(plain, vec![1]);
        assert_eq!(inverted, vec![0, 2]);
    }
}
