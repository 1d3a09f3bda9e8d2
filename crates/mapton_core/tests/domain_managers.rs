use chrono::{NaiveDate, NaiveDateTime};
use mapton_core::domain::activity::{Activity, ActivityData};
use mapton_core::domain::structural::{StructuralData, StructuralKind, StructuralPoint};
use mapton_core::domain::topo::{Dimension, TopoData, TopoPoint};
use mapton_core::domain::vibration::{
    Channel, ChannelRecord, VibrationData, VibrationDataset, VibrationPoint,
};
use mapton_core::domain::ObservationRecord;
use mapton_core::registry::{ServiceDescriptor, ServiceKind, ServiceProvider};
use mapton_core::{
    AlarmConfig, AlarmLevel, Domain, Facet, FormFilter, GeoPoint, MonitoringContext, Observation,
    Polygon, TemporalManager,
};
use std::sync::Arc;

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

fn vibration_dataset() -> VibrationDataset {
    let mut active = VibrationPoint::new("V1", VibrationData::default());
    active.external_id = Some("geo-1".to_string());
    let idle = VibrationPoint::new("V2", VibrationData::default());

    VibrationDataset {
        points: vec![idle, active],
        channels: vec![
            ChannelRecord::new(
                "geo-1",
                Channel {
                    id: "V1-X".to_string(),
                    from: day(2024, 1, 1),
                    to: None,
                },
            ),
            ChannelRecord::new(
                "V2",
                Channel {
                    id: "V2-X".to_string(),
                    from: day(2023, 1, 1),
                    to: Some(day(2023, 12, 31)),
                },
            ),
            ChannelRecord::new(
                "V7",
                Channel {
                    id: "V7-X".to_string(),
                    from: day(2023, 1, 1),
                    to: None,
                },
            ),
        ],
        observations: vec![
            ObservationRecord::new("geo-1", Observation::with_value(day(2024, 2, 1), 0.3)),
            ObservationRecord::new("V1", Observation::with_value(day(2024, 3, 1), 0.5)),
            ObservationRecord::new("V2", Observation::with_value(day(2023, 9, 1), 0.2)),
            ObservationRecord::new("V2", Observation::with_value(day(2023, 3, 1), 0.1)),
            ObservationRecord::new("nobody", Observation::with_value(day(2024, 1, 1), 9.9)),
        ],
    }
}

#[test]
fn vibration_load_derives_channel_status_and_reports_problems() {
    let mut context = MonitoringContext::new();
    let summary = context.load_vibration(vibration_dataset(), day(2024, 6, 1));

    assert_eq!(summary.points, 2);
    assert_eq!(summary.observations, 4);
    assert_eq!(summary.unmatched_observations, 1);
    assert_eq!(summary.unmatched_channels, 1);
    assert_eq!(summary.unsorted_points, vec!["V2".to_string()]);
    assert_eq!(context.vibration().base().snapshot_id(), Some(summary.snapshot_id));

    let statuses: Vec<(&str, &str)> = context
        .vibration()
        .base()
        .all_items()
        .iter()
        .map(|point| (point.name.as_str(), point.status.as_str()))
        .collect();
    assert_eq!(statuses, vec![("V1", "S1"), ("V2", "S5")]);

    let mut filter = FormFilter::new();
    filter.check_model_mut(Facet::Status).check("S1");
    context.apply_form_filter(Domain::Vibration, filter).unwrap();
    let names: Vec<&str> = context
        .vibration()
        .base()
        .time_filtered_items()
        .map(|point| point.name.as_str())
        .collect();
    assert_eq!(names, vec!["V1"]);
}

#[test]
fn reloading_replaces_the_snapshot_but_keeps_the_filter() {
    let mut context = MonitoringContext::new();
    let first = context.load_vibration(vibration_dataset(), day(2024, 6, 1));
    assert!(context.select(Domain::Vibration, "V1"));
    assert!(!context.select(Domain::Vibration, "V9"));

    let mut filter = FormFilter::new();
    filter.set_free_text("V1").unwrap();
    context.apply_form_filter(Domain::Vibration, filter).unwrap();
    assert_eq!(context.vibration().base().filtered_indices(), &[0]);

    let second = context.load_vibration(vibration_dataset(), day(2024, 6, 1));
    assert_ne!(first.snapshot_id, second.snapshot_id);
    assert!(context.vibration().base().selected().is_none());
    assert_eq!(context.vibration().base().filtered_indices(), &[0]);
    assert_eq!(context.vibration().base().time_filtered_indices(), &[0]);

    context.load_vibration(VibrationDataset::default(), day(2024, 6, 1));
    assert!(context.vibration().base().all_items().is_empty());
    assert!(context.vibration().base().filtered_indices().is_empty());
    assert!(context.vibration().base().temporal_range().is_none());
    assert_eq!(
        context.form_filter(Domain::Vibration).free_text().as_str(),
        "V1"
    );
}

fn structural_points() -> Vec<StructuralPoint> {
    let mut cell = StructuralPoint::new("LC-1", StructuralData::load_cell());
    cell.alarm = Some(AlarmConfig::new("load", 1.0, 2.0));
    let mut crack = StructuralPoint::new("CR-9", StructuralData::crack());
    crack.alarm = Some(AlarmConfig::new("crack", 1.0, 2.0));
    vec![cell, crack]
}

#[test]
fn structural_deltas_drive_alarm_levels() {
    let mut context = MonitoringContext::new();
    let summary = context.load_structural(
        structural_points(),
        vec![
            ObservationRecord::new("CR-9", Observation::with_value(day(2024, 1, 1), 10.0)),
            ObservationRecord::new("CR-9", Observation::with_value(day(2024, 2, 1), 11.5)),
            ObservationRecord::new("LC-1", Observation::with_value(day(2024, 1, 1), 100.0)),
            ObservationRecord::new("LC-1", Observation::with_value(day(2024, 2, 1), 103.0)),
            ObservationRecord::new(
                "LC-1",
                Observation::with_value(day(2024, 3, 1), 50.0).replacement(),
            ),
        ],
    );
    assert_eq!(summary.observations, 5);
    assert!(summary.unsorted_points.is_empty());

    let base = context.structural().base();
    let order: Vec<&str> = base.all_items().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(order, vec!["CR-9", "LC-1"]);

    let crack = base.ext_by_name("CR-9").unwrap();
    assert_eq!(crack.latest_delta, Some(1.5));
    assert_eq!(crack.alarm_level, Some(AlarmLevel::Warning));

    let cell = base.ext_by_name("LC-1").unwrap();
    assert_eq!(cell.latest_delta, Some(0.0));
    assert_eq!(cell.alarm_level, Some(AlarmLevel::Normal));

    context
        .set_temporal_range(day(2024, 1, 1), day(2024, 2, 15))
        .unwrap();
    let base = context.structural().base();
    assert_eq!(
        base.ext_by_name("LC-1").unwrap().alarm_level,
        Some(AlarmLevel::Alarm)
    );
    let counts = base.alarm_level_counts();
    assert_eq!(counts.get(&AlarmLevel::Alarm), Some(&1));
    assert_eq!(counts.get(&AlarmLevel::Warning), Some(&1));

    let cracks: Vec<&str> = context
        .structural()
        .time_filtered_of_kind(StructuralKind::Crack)
        .map(|point| point.name.as_str())
        .collect();
    assert_eq!(cracks, vec!["CR-9"]);

    let histogram = base.measurement_histogram();
    assert_eq!(histogram.values().sum::<usize>(), 4);
}

fn activities() -> Vec<Activity> {
    let square = Polygon::new(vec![
        GeoPoint::new(57.0, 11.0),
        GeoPoint::new(57.0, 12.0),
        GeoPoint::new(58.0, 12.0),
        GeoPoint::new(58.0, 11.0),
    ]);
    vec![
        Activity::new(
            "Paving",
            ActivityData {
                area: square.clone(),
                from: Some(day(2023, 6, 1)),
                to: None,
            },
        ),
        Activity::new(
            "Blasting",
            ActivityData {
                area: square.clone(),
                from: Some(day(2023, 1, 1)),
                to: Some(day(2023, 3, 31)),
            },
        ),
        Activity::new(
            "Survey",
            ActivityData {
                area: square,
                from: None,
                to: None,
            },
        ),
    ]
}

#[test]
fn activities_follow_period_overlap_and_status() {
    let mut context = MonitoringContext::new();
    context.load_activities(activities(), day(2023, 2, 15));

    let base = context.activity().base();
    let summary: Vec<(&str, &str)> = base
        .all_items()
        .iter()
        .map(|a| (a.name.as_str(), a.status.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Blasting", "Ongoing"),
            ("Paving", "Planned"),
            ("Survey", "Ongoing"),
        ]
    );
    let centre = base.all_items()[0].position.unwrap();
    assert!((centre.lat - 57.5).abs() < 1e-9);
    assert!((centre.lon - 11.5).abs() < 1e-9);

    context
        .set_temporal_range(day(2023, 4, 1), day(2023, 5, 31))
        .unwrap();
    let names: Vec<&str> = context
        .activity()
        .base()
        .time_filtered_items()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Survey"]);

    context
        .set_temporal_range(day(2023, 3, 1), day(2023, 7, 1))
        .unwrap();
    assert_eq!(context.activity().base().time_filtered_indices().len(), 3);
}

#[test]
fn context_cascades_window_changes_to_every_manager() {
    let mut context = MonitoringContext::new();

    let topo = vec![
        TopoPoint::new("T1", TopoData { dimension: Dimension::D3 }),
        TopoPoint::new("T2", TopoData { dimension: Dimension::D1 }),
    ];
    context.load_topo(
        topo,
        vec![
            ObservationRecord::new("T1", Observation::with_value(day(2022, 12, 1), 0.0)),
            ObservationRecord::new("T2", Observation::with_value(day(2023, 2, 1), 0.0)),
        ],
    );
    context.load_activities(activities(), day(2023, 2, 15));
    assert_eq!(context.topo().base().time_filtered_indices().len(), 2);

    assert!(context.fit_temporal_to_data());
    assert_eq!(context.temporal().low(), day(2022, 12, 1));
    assert_eq!(context.temporal().high(), day(2023, 6, 1));
    assert!(!context.fit_temporal_to_data());

    let revision = context.temporal().revision();
    assert!(context
        .set_temporal_range(day(2023, 1, 1), day(2023, 3, 1))
        .unwrap());
    assert_eq!(context.temporal().revision(), revision + 1);
    assert_eq!(context.topo().base().time_filtered_indices(), &[1]);
    assert_eq!(context.activity().base().time_filtered_indices(), &[0, 2]);

    assert!(!context
        .set_temporal_range(day(2023, 1, 1), day(2023, 3, 1))
        .unwrap());
    assert!(context
        .set_temporal_range(day(2023, 3, 1), day(2023, 1, 1))
        .is_err());
    assert_eq!(context.topo().base().time_filtered_indices(), &[1]);
}

fn topo(name: &str) -> TopoPoint {
    TopoPoint::new(name, TopoData { dimension: Dimension::D1 })
}

fn topo_names(context: &MonitoringContext) -> (Vec<&str>, Vec<&str>) {
    let base = context.topo().base();
    (
        base.filtered_items().map(|p| p.name.as_str()).collect(),
        base.time_filtered_items().map(|p| p.name.as_str()).collect(),
    )
}

/// `time_filtered` is an ascending subset of `filtered`, and every dated
/// point in it has a reading inside the context's current window.
fn assert_topo_views_follow_window(context: &MonitoringContext) {
    let base = context.topo().base();
    let filtered = base.filtered_indices();
    let time_filtered = base.time_filtered_indices();
    assert!(time_filtered.windows(2).all(|pair| pair[0] < pair[1]));
    for index in time_filtered {
        assert!(filtered.contains(index), "{index} is not form-filtered");
        let point = &base.all_items()[*index];
        if !point.observations.is_empty() {
            assert!(point
                .observations
                .iter()
                .any(|observation| context.temporal().is_valid(observation.date)));
        }
    }
}

#[test]
fn filter_installed_after_a_window_change_uses_the_new_window() {
    let mut context = MonitoringContext::new();
    context.load_topo(
        vec![topo("P1"), topo("P2")],
        vec![
            ObservationRecord::new("P1", Observation::with_value(day(2023, 1, 1), 1.0)),
            ObservationRecord::new("P2", Observation::with_value(day(2023, 6, 1), 2.0)),
        ],
    );
    context
        .set_temporal_range(day(2023, 5, 1), day(2023, 12, 31))
        .unwrap();

    let mut filter = FormFilter::new();
    filter.set_free_text("P*").unwrap();
    context.apply_form_filter(Domain::Topo, filter).unwrap();

    let (filtered, time_filtered) = topo_names(&context);
    assert_eq!(filtered, vec!["P1", "P2"]);
    assert_eq!(time_filtered, vec!["P2"]);
    assert_topo_views_follow_window(&context);
}

#[test]
fn filter_window_and_reload_keep_views_consistent() {
    let mut context = MonitoringContext::new();
    context.load_topo(
        vec![topo("Q1"), topo("P3"), topo("P1"), topo("P2")],
        vec![
            ObservationRecord::new("P1", Observation::with_value(day(2023, 1, 1), 1.0)),
            ObservationRecord::new("P2", Observation::with_value(day(2023, 6, 1), 2.0)),
            ObservationRecord::new("P3", Observation::with_value(day(2023, 9, 1), 3.0)),
            ObservationRecord::new("Q1", Observation::with_value(day(2023, 6, 15), 4.0)),
        ],
    );

    let mut filter = FormFilter::new();
    filter.set_free_text("P*").unwrap();
    context.apply_form_filter(Domain::Topo, filter).unwrap();
    assert_eq!(topo_names(&context).0, vec!["P1", "P2", "P3"]);
    assert_topo_views_follow_window(&context);

    context
        .set_temporal_range(day(2023, 5, 1), day(2023, 7, 1))
        .unwrap();
    assert_eq!(topo_names(&context).1, vec!["P2"]);
    assert_topo_views_follow_window(&context);

    context.load_topo(
        vec![topo("P4"), topo("Q1"), topo("P1")],
        vec![
            ObservationRecord::new("P1", Observation::with_value(day(2023, 6, 10), 1.0)),
            ObservationRecord::new("P4", Observation::with_value(day(2023, 8, 1), 2.0)),
            ObservationRecord::new("Q1", Observation::with_value(day(2023, 6, 15), 4.0)),
        ],
    );
    let (filtered, time_filtered) = topo_names(&context);
    assert_eq!(filtered, vec!["P1", "P4"]);
    assert_eq!(time_filtered, vec!["P1"]);
    assert_eq!(context.form_filter(Domain::Topo).free_text().as_str(), "P*");
    assert_topo_views_follow_window(&context);

    context.clear_selection(Domain::Topo);
    assert!(context.select(Domain::Topo, "P4"));
    assert_eq!(
        context.topo().base().selected().map(|p| p.name.as_str()),
        Some("P4")
    );
}

#[test]
fn context_registers_builtin_services() {
    let mut context = MonitoringContext::new();
    assert_eq!(
        context.registry().ids_of_kind(ServiceKind::LayerBundle),
        vec![
            "layer.activity".to_string(),
            "layer.structural".to_string(),
            "layer.topo".to_string(),
            "layer.vibration".to_string(),
        ]
    );
    let engine = context.registry().active_map_engine().unwrap();
    assert_eq!(engine.service_id(), "engine.globe");

    context
        .register_service(Arc::new(ServiceDescriptor::new(
            "engine.flat",
            ServiceKind::MapEngine,
            "Flat map",
        )))
        .unwrap();
    context.select_map_engine("engine.flat").unwrap();
    assert_eq!(
        context.registry().active_map_engine().unwrap().display_name(),
        "Flat map"
    );
    assert!(context.select_map_engine("layer.topo").is_err());
}

#[test]
fn managers_start_with_an_unbounded_window() {
    let temporal = TemporalManager::default();
    assert!(temporal.is_valid(day(1900, 1, 1)));
    assert!(temporal.is_valid(day(2999, 12, 31)));
}
