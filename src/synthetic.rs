//! Synthetic GPS track generator for stress testing and benchmarking.
//!
//! Builds recordings made of moving legs separated by long stops, with
//! stationary jitter clouds injected in the middle of each leg, so the
//! expected smoothing and splitting outcome is known up front.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use track_processor::synthetic::SyntheticScenario;
//!
//! let generated = SyntheticScenario::default().generate().unwrap();
//! assert_eq!(generated.expected_tracks, 3);
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::{GeoPoint, Track};

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Scenario configuration for generating a synthetic recording.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Start position as (latitude, longitude).
    pub origin: (f64, f64),
    /// Recording start time.
    pub start: DateTime<Utc>,
    /// Number of moving legs (activities) in the recording.
    pub legs: usize,
    /// Moving samples per leg.
    pub points_per_leg: usize,
    /// Sampling interval in seconds.
    pub sample_interval_s: i64,
    /// Travel speed while moving, m/s.
    pub speed_ms: f64,
    /// Jitter clouds injected per leg.
    pub clouds_per_leg: usize,
    /// Samples per jitter cloud (3 or more to be detectable).
    pub cloud_size: usize,
    /// Maximum jitter offset in meters.
    pub jitter_m: f64,
    /// Length of the stop between legs, in seconds.
    pub stop_duration_s: i64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            origin: (46.55, 7.98),
            start: DateTime::<Utc>::default() + Duration::seconds(1_688_457_600),
            legs: 3,
            points_per_leg: 120,
            sample_interval_s: 10,
            speed_ms: 4.0,
            clouds_per_leg: 2,
            cloud_size: 8,
            jitter_m: 0.25,
            stop_duration_s: 7200,
            seed: 42,
        }
    }
}

/// A generated track with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticTrack {
    pub track: Track,
    /// Clouds injected (all mid-track, each replaced by two points)
    pub expected_clouds: usize,
    /// Points belonging to injected clouds
    pub expected_cloud_points: usize,
    /// Stops between legs
    pub expected_stops: usize,
    /// Activities expected after splitting
    pub expected_tracks: usize,
}

impl SyntheticScenario {
    /// Scenario with `legs` legs of `points_per_leg` samples.
    pub fn with_size(legs: usize, points_per_leg: usize) -> Self {
        Self {
            legs,
            points_per_leg,
            ..Self::default()
        }
    }

    pub fn generate(&self) -> Result<SyntheticTrack> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Vec::new();
        let (mut lat, mut lng) = self.origin;
        let mut time = self.start;
        let mut heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let step_m = self.speed_ms * self.sample_interval_s as f64;
        let interval = Duration::seconds(self.sample_interval_s);

        // Clouds sit between moving samples, never at a leg edge
        let cloud_positions: Vec<usize> = (1..=self.clouds_per_leg)
            .map(|k| k * self.points_per_leg / (self.clouds_per_leg + 1))
            .collect();

        for leg in 0..self.legs {
            if leg > 0 {
                time += Duration::seconds(self.stop_duration_s);
            }
            for i in 0..self.points_per_leg {
                if i > 0 {
                    heading += rng.gen_range(-0.2..0.2);
                    (lat, lng) = advance(lat, lng, heading, step_m);
                    time += interval;
                }
                points.push(sample(lat, lng, time)?);

                if cloud_positions.contains(&i) {
                    // The receiver parks one step ahead, then moves on two steps
                    let (cloud_lat, cloud_lng) = advance(lat, lng, heading, step_m);
                    for _ in 0..self.cloud_size {
                        time += interval;
                        let dlat = rng.gen_range(-self.jitter_m..=self.jitter_m) / METERS_PER_DEG_LAT;
                        let dlng =
                            rng.gen_range(-self.jitter_m..=self.jitter_m) / meters_per_deg_lng(cloud_lat);
                        points.push(sample(cloud_lat + dlat, cloud_lng + dlng, time)?);
                    }
                    (lat, lng) = advance(lat, lng, heading, step_m);
                    time += interval;
                }
            }
        }

        let expected_clouds = self.legs * cloud_positions.len();
        Ok(SyntheticTrack {
            track: Track::from_points(points),
            expected_clouds,
            expected_cloud_points: expected_clouds * self.cloud_size,
            expected_stops: self.legs.saturating_sub(1),
            expected_tracks: self.legs,
        })
    }
}

/// Move `meters` from (lat, lng) along `heading` (radians, 0 = east).
fn advance(lat: f64, lng: f64, heading: f64, meters: f64) -> (f64, f64) {
    (
        lat + meters * heading.sin() / METERS_PER_DEG_LAT,
        lng + meters * heading.cos() / meters_per_deg_lng(lat),
    )
}

fn meters_per_deg_lng(latitude: f64) -> f64 {
    (METERS_PER_DEG_LAT * latitude.to_radians().cos()).max(1e-6)
}

fn sample(lat: f64, lng: f64, time: DateTime<Utc>) -> Result<GeoPoint> {
    let lat = lat.clamp(-90.0, 90.0);
    let lng = (lng + 540.0).rem_euclid(360.0) - 180.0;
    Ok(GeoPoint::new(lat, lng)?.with_timestamp(time))
}
