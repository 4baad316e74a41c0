//! Coordinates and bounding boxes within the Singapore envelope.

use geo::{BoundingRect, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

/// Latitude range accepted by the resolver (inclusive).
pub const LAT_RANGE: (f64, f64) = (1.1, 1.5);
/// Longitude range accepted by the resolver (inclusive).
pub const LNG_RANGE: (f64, f64) = (103.5, 104.1);

/// Geographic point in decimal degrees.
///
/// Only constructible through [`Coordinate::new`] or [`Coordinate::parse`],
/// so every value handed out by the pipeline lies inside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Validate and build a coordinate.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(ResolveError::InvalidResult(format!(
                "non-finite coordinate ({}, {})",
                lat, lng
            )));
        }
        if !in_envelope(lat, lng) {
            return Err(ResolveError::InvalidResult(format!(
                "coordinate ({}, {}) is outside the supported area",
                lat, lng
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Parse textual latitude/longitude values.
    pub fn parse(lat: &str, lng: &str) -> Result<Self> {
        let parse = |s: &str| {
            s.trim().parse::<f64>().map_err(|_| {
                ResolveError::InvalidResult(format!("'{}' is not a number", s))
            })
        };
        Self::new(parse(lat)?, parse(lng)?)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// As a `geo` point (x = lng, y = lat).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

fn in_envelope(lat: f64, lng: f64) -> bool {
    (LAT_RANGE.0..=LAT_RANGE.1).contains(&lat) && (LNG_RANGE.0..=LNG_RANGE.1).contains(&lng)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl Bbox {
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// Minimum enclosing box of a geometry.
    pub fn from_geometry(geometry: &MultiPolygon<f64>) -> Option<Self> {
        geometry
            .bounding_rect()
            .map(|rect| Self::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x))
    }

    /// Inclusive containment test.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat() >= self.min_lat
            && coord.lat() <= self.max_lat
            && coord.lng() >= self.min_lng
            && coord.lng() <= self.max_lng
    }
}
