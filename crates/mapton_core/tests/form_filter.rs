use chrono::{NaiveDate, NaiveDateTime};
use mapton_core::filter::RulerBounds;
use mapton_core::manager::base::ByName;
use mapton_core::{
    BaseManager, Facet, FormFilter, GeoPoint, Observation, Point, Polygon, TemporalManager,
};
use std::collections::BTreeSet;

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

fn points() -> Vec<Point<()>> {
    let mut north = Point::new("VIB-001", ()).at(GeoPoint::new(57.71, 11.97));
    north.group = "North".to_string();
    north.category = "Geophone".to_string();
    north.operator = "Acme".to_string();
    north.observations = vec![
        Observation::with_value(day(2024, 1, 10), 0.4),
        Observation::with_value(day(2024, 2, 10), 0.6),
    ];

    let mut south = Point::new("VIB-002", ()).at(GeoPoint::new(57.60, 11.90));
    south.group = "South".to_string();
    south.category = "Geophone".to_string();
    south.comment = "Mounted on bridge pier".to_string();
    south.observations = vec![Observation::with_value(day(2023, 6, 1), 1.1)];

    let mut loose = Point::new("CRK-17", ());
    loose.group = "North".to_string();
    loose.category = "Crack".to_string();

    vec![north, south, loose]
}

#[test]
fn blank_and_star_text_equal_no_text_filter() {
    let items = points();
    let mut filter = FormFilter::new();
    filter.check_model_mut(Facet::Category).check("Geophone");
    let baseline = filter.apply(&items);
    assert_eq!(baseline, vec![0, 1]);

    for text in ["", "   ", "*"] {
        filter.set_free_text(text).unwrap();
        assert!(!filter.free_text().is_active());
        assert_eq!(filter.apply(&items), baseline, "text `{text}`");
    }
}

#[test]
fn glob_matches_whole_field_and_plain_text_matches_substring() {
    let items = points();
    let mut filter = FormFilter::new();

    filter.set_free_text("vib-00?").unwrap();
    assert_eq!(filter.apply(&items), vec![0, 1]);

    filter.set_free_text("VIB").unwrap();
    assert_eq!(filter.apply(&items), vec![0, 1]);

    filter.set_free_text("*pier").unwrap();
    assert_eq!(filter.apply(&items), vec![1]);

    filter.set_free_text("pie").unwrap();
    assert_eq!(filter.apply(&items), vec![1]);

    filter.set_free_text("pie?").unwrap();
    assert!(filter.apply(&items).is_empty());
}

#[test]
fn invert_yields_the_complement_of_the_plain_result() {
    let items = points();
    let all: BTreeSet<usize> = (0..items.len()).collect();

    let mut filter = FormFilter::new();
    filter.check_model_mut(Facet::Group).check("North");
    filter.min_measurements = Some(1);
    let plain: BTreeSet<usize> = filter.apply(&items).into_iter().collect();

    filter.invert = true;
    let inverted: BTreeSet<usize> = filter.apply(&items).into_iter().collect();

    assert_eq!(plain, BTreeSet::from([0]));
    assert_eq!(inverted, &all - &plain);
}

#[test]
fn facet_checks_require_a_value_and_populate_from_items() {
    let items = points();
    let mut filter = FormFilter::new();
    filter.populate_check_models(&items);

    let operators = filter.check_model(Facet::Operator).unwrap();
    assert_eq!(
        operators.available().iter().collect::<Vec<_>>(),
        vec!["Acme"]
    );

    filter.check_model_mut(Facet::Operator).check("Acme");
    assert_eq!(filter.apply(&items), vec![0]);

    filter.check_model_mut(Facet::Operator).clear_checks();
    assert_eq!(filter.apply(&items), vec![0, 1, 2]);
}

#[test]
fn geographic_bounds_combine_polygon_and_ruler() {
    let items = points();
    let mut filter = FormFilter::new();
    filter.geo.polygon = Some(Polygon::new(vec![
        GeoPoint::new(57.65, 11.90),
        GeoPoint::new(57.65, 12.05),
        GeoPoint::new(57.80, 12.05),
        GeoPoint::new(57.80, 11.90),
    ]));
    assert_eq!(filter.apply(&items), vec![0]);

    filter.geo.ruler = Some(RulerBounds::new(GeoPoint::new(57.60, 11.90), 1_000.0));
    assert!(filter.apply(&items).is_empty());

    filter.geo.polygon = None;
    assert_eq!(filter.apply(&items), vec![1]);
}

#[test]
fn measured_since_uses_latest_raw_reading() {
    let items = points();
    let mut filter = FormFilter::new();
    filter.measured_since = NaiveDate::from_ymd_opt(2024, 1, 1);
    assert_eq!(filter.apply(&items), vec![0]);
}

#[test]
fn installed_filter_cascades_into_the_temporal_view() {
    let mut manager = BaseManager::new(ByName("vibration"));
    manager.init_all_items(points());
    let temporal = TemporalManager::new(day(2024, 1, 1), day(2024, 12, 31)).unwrap();

    let mut filter = FormFilter::new();
    filter.check_model_mut(Facet::Category).check("Geophone");
    manager.set_form_filter(filter.clone(), &temporal).unwrap();

    let filtered: Vec<&str> = manager
        .filtered_items()
        .map(|point| point.name.as_str())
        .collect();
    let time_filtered: Vec<&str> = manager
        .time_filtered_items()
        .map(|point| point.name.as_str())
        .collect();
    assert_eq!(filtered, vec!["VIB-001", "VIB-002"]);
    assert_eq!(time_filtered, vec!["VIB-001"]);

    filter.clear();
    manager.set_form_filter(filter, &temporal).unwrap();
    assert_eq!(manager.filtered_indices().len(), 3);
    assert_eq!(manager.time_filtered_indices().len(), 2);
}
