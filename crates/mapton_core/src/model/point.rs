//! Monitored point shared by every monitoring domain.
//!
//! # Responsibility
//! - Carry the metadata the form filter matches against.
//! - Own the raw observation sequence of one point.
//!
//! # Invariants
//! - `name` identifies the point within one loaded dataset.
//! - `observations` keeps load order; nothing in core re-sorts it.

use crate::model::geo::GeoPoint;
use crate::model::observation::Observation;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Metadata dimension a form-filter check model can restrict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Status,
    Group,
    Category,
    Operator,
    Origin,
    AlarmName,
    Frequency,
}

impl Facet {
    pub const ALL: [Facet; 7] = [
        Facet::Status,
        Facet::Group,
        Facet::Category,
        Facet::Operator,
        Facet::Origin,
        Facet::AlarmName,
        Facet::Frequency,
    ];
}

/// Severity derived from comparing a delta with alarm limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmLevel {
    Normal,
    Warning,
    Alarm,
}

/// Absolute-value limits for one alarm definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmConfig {
    pub name: String,
    pub warning_limit: f64,
    pub alarm_limit: f64,
}

impl AlarmConfig {
    pub fn new(name: impl Into<String>, warning_limit: f64, alarm_limit: f64) -> Self {
        Self {
            name: name.into(),
            warning_limit,
            alarm_limit,
        }
    }

    pub fn classify(&self, delta: f64) -> AlarmLevel {
        let magnitude = delta.abs();
        if magnitude >= self.alarm_limit {
            AlarmLevel::Alarm
        } else if magnitude >= self.warning_limit {
            AlarmLevel::Warning
        } else {
            AlarmLevel::Normal
        }
    }
}

/// A monitored location with domain data `D`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point<D> {
    pub name: String,
    pub external_id: Option<String>,
    pub position: Option<GeoPoint>,
    pub category: String,
    pub group: String,
    pub operator: String,
    pub status: String,
    pub origin: String,
    pub frequency: String,
    pub comment: String,
    pub alarm: Option<AlarmConfig>,
    pub observations: Vec<Observation>,
    pub domain: D,
}

impl<D> Point<D> {
    pub fn new(name: impl Into<String>, domain: D) -> Self {
        Self {
            name: name.into(),
            external_id: None,
            position: None,
            category: String::new(),
            group: String::new(),
            operator: String::new(),
            status: String::new(),
            origin: String::new(),
            frequency: String::new(),
            comment: String::new(),
            alarm: None,
            observations: Vec::new(),
            domain,
        }
    }

    pub fn at(mut self, position: GeoPoint) -> Self {
        self.position = Some(position);
        self
    }

    /// Value of one metadata dimension; `None` when the point has no value.
    pub fn facet_value(&self, facet: Facet) -> Option<&str> {
        let value = match facet {
            Facet::Status => self.status.as_str(),
            Facet::Group => self.group.as_str(),
            Facet::Category => self.category.as_str(),
            Facet::Operator => self.operator.as_str(),
            Facet::Origin => self.origin.as_str(),
            Facet::Frequency => self.frequency.as_str(),
            Facet::AlarmName => self.alarm.as_ref().map_or("", |alarm| alarm.name.as_str()),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// First raw observation date; relies on load order being ascending.
    pub fn date_first(&self) -> Option<NaiveDateTime> {
        self.observations.first().map(|observation| observation.date)
    }

    /// Last raw observation date; relies on load order being ascending.
    pub fn date_latest(&self) -> Option<NaiveDateTime> {
        self.observations.last().map(|observation| observation.date)
    }
}

#[cfg(test)]
mod tests {
    use super::{AlarmConfig, AlarmLevel, Facet, Point};

    #[test]
    fn facet_value_maps_blank_to_none() {
        let mut point = Point::new("P1", ());
        point.group = "North".to_string();
        point.alarm = Some(AlarmConfig::new("A-std", 1.0, 2.0));

        assert_eq!(point.facet_value(Facet::Group), Some("North"));
        assert_eq!(point.facet_value(Facet::AlarmName), Some("A-std"));
        assert_eq!(point.facet_value(Facet::Operator), None);
    }

    #[test]
    fn alarm_classification_uses_magnitude() {
        let alarm = AlarmConfig::new("A", 1.0, 2.0);
        assert_eq!(alarm.classify(0.5), AlarmLevel::Normal);
        assert_eq!(alarm.classify(-1.5), AlarmLevel::Warning);
        assert_eq!(alarm.classify(2.0), AlarmLevel::Alarm);
    }

    #[test]
    fn first_and_latest_follow_load_order() {
        let point: Point<()> = Point::new("empty", ());
        assert!(point.date_first().is_none());
        assert!(point.date_latest().is_none());
    }
}
