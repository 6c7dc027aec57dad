//! # Noise-Cloud Smoothing
//!
//! A stationary GPS receiver does not report a single position; it reports a
//! small cloud of positions that wander around the true location. Left in a
//! track these clouds add phantom distance and break speed statistics.
//!
//! ## Algorithm
//! 1. From each scan index, grow the longest run of points that all lie
//!    within `radius` of the run's first point, where
//!    `radius = min_speed_ms * min_interval` and `min_interval` is the
//!    shortest positive time step between consecutive timestamped members.
//!    Members without a timestamp stay in the run; they only add no interval
//! 2. Runs of fewer than [`MIN_CLOUD_POINTS`] points are ordinary noise
//! 3. Replace each cloud with its mean position:
//!    - at the track start: one point stamped with the cloud's last known
//!      time (resume)
//!    - at the track end: one point stamped with the cloud's first known
//!      time (pause)
//!    - otherwise: two coincident points, pause then resume
//! 4. Optionally repeat whole passes until a pass finds nothing
//!
//! Every timestamped member lies within `min_speed_ms * (t_member - t_first)`
//! of the first point, so the implied speed from the run's anchor never exceeds the
//! stationary threshold.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, OptionExt, Result};
use crate::{GeoPoint, Track};

/// Minimum run length that counts as a noise cloud.
pub const MIN_CLOUD_POINTS: usize = 3;

/// Upper bound on passes when iterating to a fixed point.
///
/// Each productive pass removes at least one point, so a track of `n` points
/// converges in at most `n` passes; this only guards against misuse.
pub const DEFAULT_MAX_PASSES: usize = 1000;

/// Outcome of a smoothing call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingResult {
    /// Original points consumed by clouds (synthesized replacements excluded)
    pub nodes: usize,
    /// Number of cloud replacements performed
    pub clouds: usize,
}

/// Collapses runs of jittering points into averaged pause/resume points.
///
/// # Example
/// ```
/// use track_processor::{NoiseCloudSmoother, Track};
///
/// let mut track = Track::new();
/// let result = NoiseCloudSmoother::new(0.11176)
///     .unwrap()
///     .iterate_overlapping(true)
///     .smooth(&mut track)
///     .unwrap();
/// assert_eq!(result.clouds, 0);
/// ```
#[derive(Debug, Clone)]
pub struct NoiseCloudSmoother {
    min_speed_ms: f64,
    iterate_overlapping: bool,
    max_passes: usize,
}

impl NoiseCloudSmoother {
    /// Create a smoother. `min_speed_ms` is the speed (m/s) below which the
    /// receiver is considered stationary; it must be finite and positive.
    pub fn new(min_speed_ms: f64) -> Result<Self> {
        Ok(Self {
            min_speed_ms: require_positive("min_speed_ms", min_speed_ms)?,
            iterate_overlapping: false,
            max_passes: DEFAULT_MAX_PASSES,
        })
    }

    /// Repeat passes until one finds no cloud.
    pub fn iterate_overlapping(mut self, iterate: bool) -> Self {
        self.iterate_overlapping = iterate;
        self
    }

    /// Cap the number of passes (at least one pass always runs).
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn min_speed_ms(&self) -> f64 {
        self.min_speed_ms
    }

    /// Smooth `track` in place and report what was replaced.
    pub fn smooth(&self, track: &mut Track) -> Result<SmoothingResult> {
        let mut total = SmoothingResult::default();
        if track.len() < 2 {
            return Ok(total);
        }

        let original_len = track.len();
        // Marks points this call synthesized, so later passes do not count them
        let mut synthesized = vec![false; track.len()];
        let mut passes = 0;

        loop {
            passes += 1;
            let pass = self.smooth_pass(track, &mut synthesized)?;
            total.nodes += pass.nodes;
            total.clouds += pass.clouds;

            if !self.iterate_overlapping || pass.clouds == 0 {
                break;
            }
            if passes >= self.max_passes {
                warn!(
                    "[NoiseClouds] Stopped after {} passes without reaching a fixed point",
                    passes
                );
                break;
            }
        }

        info!(
            "[NoiseClouds] {} clouds ({} points) removed in {} passes, {} -> {} points",
            total.clouds,
            total.nodes,
            passes,
            original_len,
            track.len()
        );

        Ok(total)
    }

    /// One left-to-right scan, replacing clouds as they are found.
    fn smooth_pass(&self, track: &mut Track, synthesized: &mut Vec<bool>) -> Result<SmoothingResult> {
        let mut result = SmoothingResult::default();
        let mut i = 0;

        while i < track.len() {
            let Some(end) = self.cloud_end(track.points(), i) else {
                break;
            };
            if end + 1 - i < MIN_CLOUD_POINTS {
                i += 1;
                continue;
            }

            let replacement = {
                let cloud = &track.points()[i..=end];
                let center = GeoPoint::average(cloud).ok_or_internal("empty noise cloud")?;
                let pause = cloud
                    .iter()
                    .find_map(|p| p.timestamp())
                    .ok_or_internal("noise cloud without timestamps")?;
                let resume = cloud
                    .iter()
                    .rev()
                    .find_map(|p| p.timestamp())
                    .ok_or_internal("noise cloud without timestamps")?;

                if i == 0 {
                    vec![center.with_timestamp(resume)]
                } else if end == track.len() - 1 {
                    vec![center.with_timestamp(pause)]
                } else {
                    vec![center.with_timestamp(pause), center.with_timestamp(resume)]
                }
            };

            let consumed = synthesized[i..=end].iter().filter(|s| !**s).count();
            debug!(
                "[NoiseClouds] Cloud at {}..={} ({} points) -> {} point(s)",
                i,
                end,
                end + 1 - i,
                replacement.len()
            );

            let inserted = replacement.len();
            track.replace_points_between(i, end, replacement)?;
            synthesized.splice(i..=end, std::iter::repeat(true).take(inserted));

            result.nodes += consumed;
            result.clouds += 1;
            i += inserted;
        }

        Ok(result)
    }

    /// Inclusive end index of the longest qualifying run starting at `start`.
    ///
    /// Until the run has a positive interval its radius is unknown, so the
    /// members seen so far are held back and confirmed together once one
    /// appears. Returns `start` when no neighbour is confirmed, and `None`
    /// when no positive interval exists from `start` to the end of the track;
    /// no later start can form a cloud then either.
    fn cloud_end(&self, points: &[GeoPoint], start: usize) -> Option<usize> {
        let anchor = &points[start];
        let mut end = start;
        let mut min_interval: Option<f64> = None;
        let mut max_distance = 0.0_f64;

        for j in start + 1..points.len() {
            let current = &points[j];

            // Untimed pairs and non-positive steps (duplicate or reversed
            // timestamps) say nothing about speed and are left out of the minimum
            let step = points[j - 1].duration_to(current).filter(|d| *d > 0.0);
            min_interval = match (min_interval, step) {
                (Some(m), Some(d)) => Some(m.min(d)),
                (m, d) => m.or(d),
            };
            max_distance = max_distance.max(anchor.distance_to(current));

            if let Some(interval) = min_interval {
                if max_distance > self.min_speed_ms * interval {
                    return Some(end);
                }
                end = j;
            }
        }

        min_interval.map(|_| end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const MIN_SPEED: f64 = 0.11176;

    fn timed(lat: f64, lng: f64, secs: i64) -> GeoPoint {
        GeoPoint::new(lat, lng)
            .unwrap()
            .with_timestamp(Utc.timestamp_opt(1_688_500_800 + secs, 0).unwrap())
    }

    /// `count` points jittering within ~10cm of (lat, lng), 10s apart.
    fn cloud(lat: f64, lng: f64, start_secs: i64, count: usize) -> Vec<GeoPoint> {
        (0..count)
            .map(|k| {
                let jitter = if k % 2 == 0 { 0.0 } else { 0.000001 };
                timed(lat + jitter, lng - jitter, start_secs + k as i64 * 10)
            })
            .collect()
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(NoiseCloudSmoother::new(0.0).is_err());
        assert!(NoiseCloudSmoother::new(-1.0).is_err());
        assert!(NoiseCloudSmoother::new(f64::NAN).is_err());
    }

    #[test]
    fn test_degenerate_tracks_are_noops() {
        let smoother = NoiseCloudSmoother::new(MIN_SPEED).unwrap();
        let mut empty = Track::new();
        assert_eq!(smoother.smooth(&mut empty).unwrap(), SmoothingResult::default());

        let mut single = Track::from_points(vec![timed(39.0, -105.0, 0)]);
        assert_eq!(smoother.smooth(&mut single).unwrap(), SmoothingResult::default());
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_two_close_points_are_not_a_cloud() {
        let mut points = cloud(39.0, -105.0, 0, 2);
        points.push(timed(39.001, -105.0, 20));
        let mut track = Track::from_points(points.clone());

        let result = track.smooth_noise_clouds(MIN_SPEED, false).unwrap();
        assert_eq!(result, SmoothingResult::default());
        assert_eq!(track.points(), points.as_slice());
    }

    #[test]
    fn test_three_points_form_a_cloud() {
        let mut points = vec![timed(38.999, -105.0, -10)];
        points.extend(cloud(39.0, -105.0, 0, 3));
        points.push(timed(39.001, -105.0, 30));
        let mut track = Track::from_points(points);

        let result = track.smooth_noise_clouds(MIN_SPEED, false).unwrap();
        assert_eq!(result, SmoothingResult { nodes: 3, clouds: 1 });
        assert_eq!(track.len(), 4);
        assert!(track.points()[1].is_coincident_with(&track.points()[2]));
    }

    #[test]
    fn test_radius_is_inclusive() {
        // Second point sits exactly on the radius derived from an 8s step
        let anchor = timed(0.0, 0.0, 0);
        let edge = GeoPoint::new(0.0, 0.00001).unwrap();
        let speed = anchor.distance_to(&edge) / 8.0;

        let mut track = Track::from_points(vec![
            anchor,
            edge.with_timestamp(Utc.timestamp_opt(1_688_500_808, 0).unwrap()),
            timed(0.0, 0.0, 16),
        ]);
        let result = track.smooth_noise_clouds(speed, false).unwrap();
        assert_eq!(result.clouds, 1);
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_untimed_anchor_joins_cloud() {
        let mut points = vec![GeoPoint::new(39.0, -105.0).unwrap()];
        points.extend(cloud(39.0, -105.0, 10, 2));
        points.push(timed(39.001, -105.0, 30));
        let mut track = Track::from_points(points);

        let result = track.smooth_noise_clouds(MIN_SPEED, false).unwrap();
        assert_eq!(result, SmoothingResult { nodes: 3, clouds: 1 });
        assert_eq!(track.len(), 2);
        // Resume time comes from the last member that has one
        assert_eq!(
            track.points()[0].timestamp(),
            Some(Utc.timestamp_opt(1_688_500_820, 0).unwrap())
        );
    }

    #[test]
    fn test_far_untimed_point_ends_run() {
        let mut points = vec![timed(38.999, -105.0, -10)];
        points.extend(cloud(39.0, -105.0, 0, 3));
        points.push(GeoPoint::new(39.001, -105.0).unwrap());
        points.push(timed(39.002, -105.0, 40));
        let mut track = Track::from_points(points);

        let result = track.smooth_noise_clouds(MIN_SPEED, true).unwrap();
        assert_eq!(result, SmoothingResult { nodes: 3, clouds: 1 });
        assert_eq!(track.len(), 5);
        assert_eq!(track.points()[3].timestamp(), None);
    }

    #[test]
    fn test_untimed_track_has_no_clouds() {
        // Without any interval there is no radius to measure against
        let points: Vec<GeoPoint> = (0..5).map(|_| GeoPoint::new(39.0, -105.0).unwrap()).collect();
        let mut track = Track::from_points(points.clone());

        let result = track.smooth_noise_clouds(MIN_SPEED, true).unwrap();
        assert_eq!(result, SmoothingResult::default());
        assert_eq!(track.points(), points.as_slice());
    }

    #[test]
    fn test_whole_track_cloud_collapses_to_one_point() {
        let mut track = Track::from_points(cloud(39.0, -105.0, 0, 5));
        let result = track.smooth_noise_clouds(MIN_SPEED, false).unwrap();
        assert_eq!(result, SmoothingResult { nodes: 5, clouds: 1 });
        assert_eq!(track.len(), 1);
        assert_eq!(
            track.points()[0].timestamp(),
            Some(Utc.timestamp_opt(1_688_500_840, 0).unwrap())
        );
    }

    /// Fixes drifting north from (39, -105) by `offsets_m`, 10s apart,
    /// between two moving fixes 40m away.
    fn drifting_stop(offsets_m: &[f64]) -> Track {
        let north = |m: f64, secs: i64| timed(39.0 + m / 111_195.0, -105.0, secs);
        let mut points = vec![north(-40.0, 0)];
        for (k, m) in offsets_m.iter().enumerate() {
            points.push(north(*m, 10 + 10 * k as i64));
        }
        let last = offsets_m.last().copied().unwrap_or(0.0);
        points.push(north(last + 40.0, 10 + 10 * offsets_m.len() as i64));
        Track::from_points(points)
    }

    #[test]
    fn test_max_passes_guard() {
        // A second pass would merge the drifted tail into the first cloud
        let offsets = [0.0, 0.8, 1.0, 1.05, 1.6, 1.6];
        let smoother = NoiseCloudSmoother::new(MIN_SPEED)
            .unwrap()
            .iterate_overlapping(true)
            .max_passes(1);
        let mut track = drifting_stop(&offsets);
        let result = smoother.smooth(&mut track).unwrap();
        assert_eq!(result, SmoothingResult { nodes: 4, clouds: 1 });
        assert_eq!(track.len(), 6);

        let mut track = drifting_stop(&offsets);
        let result = smoother.max_passes(0).smooth(&mut track).unwrap();
        assert_eq!(result.clouds, 1);

        let mut track = drifting_stop(&offsets);
        let result = NoiseCloudSmoother::new(MIN_SPEED)
            .unwrap()
            .iterate_overlapping(true)
            .smooth(&mut track)
            .unwrap();
        assert_eq!(result, SmoothingResult { nodes: 6, clouds: 2 });
        assert_eq!(track.len(), 4);
    }
}
