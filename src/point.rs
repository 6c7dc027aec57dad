//! Geographic sample points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::geo_utils::{compute_bounds, haversine_distance};

/// A single geographic sample: position, optional elevation, optional time.
///
/// Coordinates are validated on construction and never change afterwards;
/// algorithms that "move" a point build a new one instead.
///
/// # Example
/// ```
/// use track_processor::GeoPoint;
/// let point = GeoPoint::new(39.8782, -105.1356).unwrap();
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

/// Unvalidated wire form, checked by `GeoPoint::try_from`.
#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = TrackError;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        let mut point = GeoPoint::new(raw.latitude, raw.longitude)?;
        if let Some(elevation) = raw.elevation {
            point = point.with_elevation(elevation)?;
        }
        if let Some(timestamp) = raw.timestamp {
            point = point.with_timestamp(timestamp);
        }
        Ok(point)
    }
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(TrackError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            elevation: None,
            timestamp: None,
        })
    }

    /// Same point with an elevation in meters.
    pub fn with_elevation(self, elevation: f64) -> Result<Self> {
        if !elevation.is_finite() {
            return Err(TrackError::InvalidElevation { elevation });
        }
        Ok(Self {
            elevation: Some(elevation),
            ..self
        })
    }

    /// Same point with a timestamp.
    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self, other)
    }

    /// Seconds from this point to `other`.
    ///
    /// `None` when either point has no timestamp. Negative when `other` is
    /// earlier than `self`.
    pub fn duration_to(&self, other: &GeoPoint) -> Option<f64> {
        let (from, to) = (self.timestamp?, other.timestamp?);
        let delta = to - from;
        // Millisecond precision keeps sub-second GPS fixes meaningful
        Some(delta.num_milliseconds() as f64 / 1000.0)
    }

    /// Implied speed in m/s travelling from this point to `other`.
    ///
    /// `None` when the duration is unknown or not positive.
    pub fn speed_to(&self, other: &GeoPoint) -> Option<f64> {
        let duration = self.duration_to(other)?;
        if duration <= 0.0 {
            return None;
        }
        Some(self.distance_to(other) / duration)
    }

    /// True when both points share latitude, longitude and elevation.
    pub fn is_coincident_with(&self, other: &GeoPoint) -> bool {
        self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.elevation == other.elevation
    }

    /// Mean position of `points`, without a timestamp.
    ///
    /// Elevation is the mean of the points that carry one, and absent if none
    /// do. Returns `None` for an empty slice.
    pub fn average(points: &[GeoPoint]) -> Option<GeoPoint> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let latitude = points.iter().map(|p| p.latitude).sum::<f64>() / n;
        let longitude = points.iter().map(|p| p.longitude).sum::<f64>() / n;

        let elevations: Vec<f64> = points.iter().filter_map(|p| p.elevation).collect();
        let elevation = if elevations.is_empty() {
            None
        } else {
            Some(elevations.iter().sum::<f64>() / elevations.len() as f64)
        };

        // Means of in-range values stay in range
        Some(GeoPoint {
            latitude,
            longitude,
            elevation,
            timestamp: None,
        })
    }
}

/// Bounding box for a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        compute_bounds(points)
    }

    /// Center of the box as `(latitude, longitude)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}
