//! Geographic predicates for the form filter.

use crate::model::geo::{GeoPoint, Polygon};
use serde::{Deserialize, Serialize};

/// Keeps positions within `max_distance_m` metres of `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RulerBounds {
    pub center: GeoPoint,
    pub max_distance_m: f64,
}

impl RulerBounds {
    pub fn new(center: GeoPoint, max_distance_m: f64) -> Self {
        Self {
            center,
            max_distance_m,
        }
    }

    pub fn contains(&self, position: &GeoPoint) -> bool {
        self.center.distance_to(position) <= self.max_distance_m
    }
}

/// Active geographic restrictions; every present bound must hold.
///
/// Items without a position fail any active bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub polygon: Option<Polygon>,
    pub ruler: Option<RulerBounds>,
}

impl GeoBounds {
    pub fn is_active(&self) -> bool {
        self.polygon.is_some() || self.ruler.is_some()
    }

    pub fn accepts(&self, position: Option<&GeoPoint>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(position) = position else {
            return false;
        };
        self.polygon
            .as_ref()
            .map_or(true, |polygon| polygon.contains(position))
            && self.ruler.map_or(true, |ruler| ruler.contains(position))
    }
}
