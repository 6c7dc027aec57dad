//! # Algorithm Toolbox
//!
//! Direct access to the track algorithms without the pipeline.
//!
//! ## Core Algorithms
//!
//! - **Noise-Cloud Smoothing**: collapse stationary GPS jitter
//! - **Stop Detection**: find gaps longer than an activity boundary
//! - **Duration Splitting**: trim and split a recording at long stops
//!
//! ## Geographic Utilities
//!
//! - **Haversine Distance**: Great-circle distance between GPS points
//! - **Polyline Length**: Total distance along a path
//! - **Bounds Computation**: Bounding box for GPS tracks
//!
//! # Example
//!
//! ```rust
//! use track_processor::algorithms::{haversine_distance, GeoPoint};
//!
//! let london = GeoPoint::new(51.5074, -0.1278).unwrap();
//! let paris = GeoPoint::new(48.8566, 2.3522).unwrap();
//! let distance = haversine_distance(&london, &paris);
//! println!("London to Paris: {:.0} km", distance / 1000.0);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Bounds, GeoPoint, Segment, SegmentStats, Track};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{compute_bounds, compute_center, haversine_distance, polyline_length};

// =============================================================================
// Track Algorithms
// =============================================================================

/// Collapse noise clouds. See [`crate::smoothing`].
pub use crate::smoothing::{NoiseCloudSmoother, SmoothingResult, MIN_CLOUD_POINTS};

/// Find every gap longer than a stop threshold.
pub use crate::splitting::find_stop_boundaries;

/// Trim and split at long stops. See [`crate::splitting`].
pub use crate::splitting::{DurationSplitter, SplitResult, StopBoundary};

/// Per-segment speeds in m/s, `None` where the duration is unknown.
///
/// # Example
/// ```rust
/// use track_processor::algorithms::{segment_speeds, Track};
///
/// assert!(segment_speeds(&Track::new()).is_empty());
/// ```
pub fn segment_speeds(track: &Track) -> Vec<Option<f64>> {
    track.segments().map(|s| s.speed()).collect()
}

/// Seconds spent moving faster than `min_speed_ms`.
///
/// Segments without a measurable duration contribute nothing.
pub fn moving_time(track: &Track, min_speed_ms: f64) -> f64 {
    track
        .segments()
        .filter_map(|s| {
            let stats = s.stats();
            match (stats.duration_s, stats.speed_ms) {
                (Some(d), Some(v)) if v > min_speed_ms => Some(d),
                _ => None,
            }
        })
        .sum()
}
