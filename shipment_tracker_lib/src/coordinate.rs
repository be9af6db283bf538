use geo::{Distance, Haversine};
use geo_types::Point;
use serde::{Deserialize, Serialize};

/// A resolved geographic position. Only ever produced by geocoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Naive midpoint: plain average of latitude and longitude.
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new(
            (self.latitude + other.latitude) / 2.,
            (self.longitude + other.longitude) / 2.,
        )
    }

    /// Great circle distance in km
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        Haversine.distance(Point::from(*self), Point::from(*other)) / 1000.
    }
}

impl From<Coordinate> for Point {
    fn from(value: Coordinate) -> Self {
        geo_types::point! { x: value.longitude, y: value.latitude }
    }
}

impl From<Point> for Coordinate {
    fn from(value: Point) -> Self {
        Coordinate::new(value.y(), value.x())
    }
}
