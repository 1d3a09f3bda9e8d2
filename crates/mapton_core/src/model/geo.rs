//! WGS84 positions, polygons and distances.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle (haversine) distance in metres.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

/// Closed ring of vertices; the last vertex connects back to the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<GeoPoint>,
}

impl Polygon {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }

    /// Fewer than three vertices encloses nothing.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Even-odd ray casting in lon/lat space.
    ///
    /// Adequate for the small survey areas this is used for; rings crossing
    /// the antimeridian are not handled.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        if self.is_degenerate() {
            return false;
        }

        let mut inside = false;
        let mut j = self.vertices.len() - 1;
        for (i, vi) in self.vertices.iter().enumerate() {
            let vj = &self.vertices[j];
            if (vi.lat > point.lat) != (vj.lat > point.lat) {
                let crossing_lon =
                    (vj.lon - vi.lon) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon;
                if point.lon < crossing_lon {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Vertex mean, used as the representative position of an area.
    pub fn centroid(&self) -> Option<GeoPoint> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let (lat, lon) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(lat, lon), v| (lat + v.lat, lon + v.lon));
        Some(GeoPoint::new(lat / n, lon / n))
    }
}
