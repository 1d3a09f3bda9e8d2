//! Timestamped measurements attached to a monitored point.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One measurement of a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDateTime,
    /// Measured values; the first one is the primary reading.
    pub values: Vec<f64>,
    /// Change relative to the point's reference reading, when known.
    pub delta: Option<f64>,
    pub comment: Option<String>,
    /// Resets the reference reading for later deltas.
    pub zero_measurement: bool,
    /// Sensor or marker was replaced at this reading.
    pub replacement_measurement: bool,
}

impl Observation {
    pub fn new(date: NaiveDateTime) -> Self {
        Self {
            date,
            values: Vec::new(),
            delta: None,
            comment: None,
            zero_measurement: false,
            replacement_measurement: false,
        }
    }

    pub fn with_value(date: NaiveDateTime, value: f64) -> Self {
        let mut observation = Self::new(date);
        observation.values.push(value);
        observation
    }

    pub fn zero(mut self) -> Self {
        self.zero_measurement = true;
        self
    }

    pub fn replacement(mut self) -> Self {
        self.replacement_measurement = true;
        self
    }

    pub fn primary_value(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::of(&self.date)
    }
}

/// Calendar month bucket used by measurement histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: &NaiveDateTime) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// True when dates never decrease along the slice.
pub fn is_sorted_by_date(observations: &[Observation]) -> bool {
    observations.windows(2).all(|pair| pair[0].date <= pair[1].date)
}
