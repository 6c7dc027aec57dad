//! Track data model: an owned point sequence with index-based segment views.
//!
//! `Track` owns its points in a single `Vec`. Segments are never stored; a
//! [`Segment`] is a borrowed view of `points[i]` and `points[i + 1]`, so a
//! splice can never leave a segment pointing at a removed point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::geo_utils::polyline_length;
use crate::smoothing::{NoiseCloudSmoother, SmoothingResult};
use crate::splitting::{DurationSplitter, SplitResult};
use crate::{Bounds, GeoPoint};

/// An ordered, mutable sequence of geographic points.
///
/// Points are expected to be in recording order; the duration-based
/// algorithms assume timestamps increase along the track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    points: Vec<GeoPoint>,
}

impl Track {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a track that takes ownership of `points`.
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<&GeoPoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    /// Number of segments, always `max(len - 1, 0)`.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Segment from `points[index]` to `points[index + 1]`.
    pub fn segment(&self, index: usize) -> Option<Segment<'_>> {
        if index < self.segment_count() {
            Some(Segment::new(self, index))
        } else {
            None
        }
    }

    /// Iterate over all segments in order.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = Segment<'_>> + '_ {
        (0..self.segment_count()).map(move |i| Segment::new(self, i))
    }

    /// Snapshot of every segment's derived kinematics.
    pub fn segment_stats(&self) -> Vec<SegmentStats> {
        self.segments().map(|s| s.stats()).collect()
    }

    /// Total path length in meters.
    pub fn total_distance(&self) -> f64 {
        polyline_length(&self.points)
    }

    /// Seconds between the first and last point, if both are timestamped.
    pub fn total_duration(&self) -> Option<f64> {
        let (first, last) = (self.first()?, self.last()?);
        first.duration_to(last)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.first()?.timestamp()
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.last()?.timestamp()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    // ------------------------------------------------------------------
    // Splicing
    // ------------------------------------------------------------------

    pub fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    /// Insert `points` so the first of them lands at `index`.
    ///
    /// `index == len` appends.
    pub fn insert_points<I>(&mut self, index: usize, points: I) -> Result<()>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        if index > self.points.len() {
            return Err(TrackError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        let tail = self.points.split_off(index);
        self.points.extend(points);
        self.points.extend(tail);
        Ok(())
    }

    /// Remove points `start..=end` and return them.
    pub fn remove_points_between(&mut self, start: usize, end: usize) -> Result<Vec<GeoPoint>> {
        self.check_range(start, end)?;
        Ok(self.points.drain(start..=end).collect())
    }

    /// Replace points `start..=end` with `replacement`, returning the removed points.
    pub fn replace_points_between<I>(
        &mut self,
        start: usize,
        end: usize,
        replacement: I,
    ) -> Result<Vec<GeoPoint>>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        self.check_range(start, end)?;
        Ok(self.points.splice(start..=end, replacement).collect())
    }

    /// Split the track at `index`: `self` keeps `0..index`, the returned
    /// track owns `index..`.
    pub fn split_off(&mut self, index: usize) -> Result<Track> {
        if index > self.points.len() {
            return Err(TrackError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(Track::from_points(self.points.split_off(index)))
    }

    /// Copy of points `start..=end` as a new track.
    pub fn slice(&self, start: usize, end: usize) -> Result<Track> {
        self.check_range(start, end)?;
        Ok(Track::from_points(self.points[start..=end].to_vec()))
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end || end >= self.points.len() {
            return Err(TrackError::InvalidRange {
                start,
                end,
                len: self.points.len(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Algorithms
    // ------------------------------------------------------------------

    /// Collapse GPS jitter clouds in place. See [`NoiseCloudSmoother`].
    pub fn smooth_noise_clouds(
        &mut self,
        min_speed_ms: f64,
        iterate_overlapping: bool,
    ) -> Result<SmoothingResult> {
        NoiseCloudSmoother::new(min_speed_ms)?
            .iterate_overlapping(iterate_overlapping)
            .smooth(self)
    }

    /// Trim and split at long stops. See [`DurationSplitter`].
    ///
    /// `self` is mutated: afterwards it holds the first output track.
    pub fn split_by_max_duration(
        &mut self,
        max_stop_duration_s: f64,
        min_move_duration_s: Option<f64>,
    ) -> Result<SplitResult> {
        DurationSplitter::new(self).split_by_max_duration(max_stop_duration_s, min_move_duration_s)
    }
}

impl From<Vec<GeoPoint>> for Track {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::from_points(points)
    }
}

/// The directed link between two adjacent points of a track.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    track: &'a Track,
    index: usize,
}

impl<'a> Segment<'a> {
    fn new(track: &'a Track, index: usize) -> Self {
        assert!(
            index + 1 < track.len(),
            "segment {} has no end point in a track of {} points",
            index,
            track.len()
        );
        Self { track, index }
    }

    /// Index of the start point in the owning track.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> &'a GeoPoint {
        &self.track.points[self.index]
    }

    pub fn end(&self) -> &'a GeoPoint {
        &self.track.points[self.index + 1]
    }

    /// Length in meters.
    pub fn length(&self) -> f64 {
        self.start().distance_to(self.end())
    }

    /// Duration in seconds, `None` if either endpoint lacks a timestamp.
    pub fn duration(&self) -> Option<f64> {
        self.start().duration_to(self.end())
    }

    /// Speed in m/s, `None` if the duration is unknown or not positive.
    pub fn speed(&self) -> Option<f64> {
        self.start().speed_to(self.end())
    }

    pub fn stats(&self) -> SegmentStats {
        let length_m = self.length();
        let duration_s = self.duration();
        let speed_ms = duration_s
            .filter(|d| *d > 0.0)
            .map(|d| length_m / d);
        SegmentStats {
            index: self.index,
            length_m,
            duration_s,
            speed_ms,
        }
    }
}

/// Owned snapshot of a segment's derived properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    /// Index of the segment's start point
    pub index: usize,
    /// Great-circle length in meters
    pub length_m: f64,
    /// Duration in seconds
    pub duration_s: Option<f64>,
    /// Speed in m/s
    pub speed_ms: Option<f64>,
}
