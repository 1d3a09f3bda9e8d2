//! Monitoring domains built on the generic manager.
//!
//! # Responsibility
//! - Turn flat observation records into points with attached series.
//! - Supply each domain's strategy and derived status rules.
//!
//! # Invariants
//! - A load replaces the previous dataset wholesale.
//! - Observation order is taken as delivered. Series that are not ascending
//!   by date are reported, not re-sorted, because `date_first`/`date_latest`
//!   are read from the ends of the series.

pub mod activity;
pub mod structural;
pub mod topo;
pub mod vibration;

use crate::model::observation::{is_sorted_by_date, Observation};
use crate::model::point::Point;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The monitoring domains owned by a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Vibration,
    Structural,
    Topo,
    Activity,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Vibration,
        Domain::Structural,
        Domain::Topo,
        Domain::Activity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vibration => vibration::DOMAIN,
            Self::Structural => structural::DOMAIN,
            Self::Topo => topo::DOMAIN,
            Self::Activity => activity::DOMAIN,
        }
    }
}

/// One raw observation addressed to its point by name or external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub point_key: String,
    pub observation: Observation,
}

impl ObservationRecord {
    pub fn new(point_key: impl Into<String>, observation: Observation) -> Self {
        Self {
            point_key: point_key.into(),
            observation,
        }
    }
}

/// Outcome of one dataset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub snapshot_id: Uuid,
    pub points: usize,
    pub observations: usize,
    /// Records whose key matched no point; they are dropped.
    pub unmatched_observations: usize,
    /// Channel rows whose key matched no point; always 0 outside vibration.
    pub unmatched_channels: usize,
    /// Points whose series arrived out of date order.
    pub unsorted_points: Vec<String>,
}

/// Maps names and external ids to point indices. A name wins over an equal
/// external id of another point.
pub(crate) fn point_key_index<D>(points: &[Point<D>]) -> HashMap<&str, usize> {
    let mut by_key: HashMap<&str, usize> = HashMap::with_capacity(points.len() * 2);
    for (index, point) in points.iter().enumerate() {
        if let Some(external_id) = point.external_id.as_deref() {
            by_key.entry(external_id).or_insert(index);
        }
    }
    for (index, point) in points.iter().enumerate() {
        by_key.insert(point.name.as_str(), index);
    }
    by_key
}

/// Attach counts produced by [`attach_observations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AttachStats {
    pub attached: usize,
    pub unmatched: usize,
    pub unsorted_points: Vec<String>,
}

/// Appends each record to the point whose name, or else external id, equals
/// its key. Record order is preserved per point.
pub(crate) fn attach_observations<D>(
    domain: &str,
    points: &mut [Point<D>],
    records: Vec<ObservationRecord>,
) -> AttachStats {
    let by_key = point_key_index(points);
    let mut grouped: HashMap<usize, Vec<Observation>> = HashMap::new();
    let mut stats = AttachStats::default();
    for record in records {
        match by_key.get(record.point_key.as_str()) {
            Some(&index) => {
                grouped.entry(index).or_default().push(record.observation);
                stats.attached += 1;
            }
            None => stats.unmatched += 1,
        }
    }
    drop(by_key);

    for (index, observations) in grouped {
        points[index].observations.extend(observations);
    }

    for point in points.iter() {
        if !is_sorted_by_date(&point.observations) {
            stats.unsorted_points.push(point.name.clone());
        }
    }
    stats.unsorted_points.sort();

    if stats.unmatched > 0 {
        warn!(
            "event=observation_attach module=domain status=partial domain={domain} unmatched={}",
            stats.unmatched
        );
    }
    if !stats.unsorted_points.is_empty() {
        warn!(
            "event=observation_order module=domain status=unsorted domain={domain} points={}",
            stats.unsorted_points.len()
        );
    }
    stats
}

/// Fills `delta` as the primary value minus the current reference value.
///
/// The first valued observation is the initial reference; zero and
/// replacement measurements start a new reference.
pub(crate) fn deltas_from_reference(observations: &mut [Observation]) {
    let mut reference: Option<f64> = None;
    for observation in observations.iter_mut() {
        let value = observation.primary_value();
        let resets = observation.zero_measurement || observation.replacement_measurement;
        if value.is_some() && (resets || reference.is_none()) {
            reference = value;
        }
        observation.delta = match (value, reference) {
            (Some(value), Some(reference)) => Some(value - reference),
            _ => None,
        };
    }
}
