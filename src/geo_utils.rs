//! Geographic utilities shared by the track model and the algorithms.

use geo::{Distance, Haversine, Point};

use crate::{Bounds, GeoPoint};

/// Calculate haversine distance between two GPS points in meters.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude(), p1.latitude());
    let point2 = Point::new(p2.longitude(), p2.latitude());
    Haversine::distance(point1, point2)
}

/// Total length of a polyline in meters.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Bounding box of a point slice, `None` when empty.
pub fn compute_bounds(points: &[GeoPoint]) -> Option<Bounds> {
    let first = points.first()?;
    let mut bounds = Bounds {
        min_lat: first.latitude(),
        max_lat: first.latitude(),
        min_lng: first.longitude(),
        max_lng: first.longitude(),
    };

    for p in &points[1..] {
        bounds.min_lat = bounds.min_lat.min(p.latitude());
        bounds.max_lat = bounds.max_lat.max(p.latitude());
        bounds.min_lng = bounds.min_lng.min(p.longitude());
        bounds.max_lng = bounds.max_lng.max(p.longitude());
    }

    Some(bounds)
}

/// Arithmetic mean of latitude and longitude.
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn compute_center(points: &[GeoPoint]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.latitude()).sum::<f64>() / n;
    let lng = points.iter().map(|p| p.longitude()).sum::<f64>() / n;
    (lat, lng)
}
