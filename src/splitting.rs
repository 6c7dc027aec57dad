//! # Duration-Based Splitting
//!
//! Splits a recorded track into separate activities at long stops.
//!
//! ## Algorithm
//! 1. Every consecutive pair whose time gap exceeds `max_stop_duration_s` is a
//!    stop boundary; the stops cut the track into contiguous pieces
//! 2. If the moving time before the first stop is at most
//!    `min_move_duration_s`, the leading piece is setup noise and is dropped
//! 3. Symmetrically, a trailing piece after the last stop that short is dropped
//! 4. Every remaining piece with at least two points becomes an output track
//!
//! The pieces partition the input: output tracks plus dropped pieces hold
//! every original point exactly once.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, Result};
use crate::{GeoPoint, Track};

/// Moving time (seconds) required next to a track edge before a stop there
/// stops counting as trimmable setup noise.
pub const DEFAULT_MIN_MOVE_DURATION_S: f64 = 300.0;

/// A gap between two consecutive points longer than the stop threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopBoundary {
    /// Index of the last point before the stop
    pub before: usize,
    /// Index of the first point after the stop (`before + 1`)
    pub after: usize,
    /// Length of the stop in seconds
    pub duration_s: f64,
}

/// Outcome of a split call. Indices refer to the track as it was before the call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    /// Distinct points bounding the processed stops, in track order
    pub points: Vec<GeoPoint>,
    /// Every stop boundary that was trimmed at or split on
    pub segments: Vec<StopBoundary>,
    /// Output activity tracks, in track order
    pub tracks: Vec<Track>,
    /// Trimmed edge pieces and fragments too short to be a track
    pub dropped: Vec<Track>,
}

/// Find all stop boundaries in `points`.
///
/// Pairs missing a timestamp cannot be measured and never form a stop.
pub fn find_stop_boundaries(points: &[GeoPoint], max_stop_duration_s: f64) -> Vec<StopBoundary> {
    points
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let duration_s = pair[0].duration_to(&pair[1])?;
            (duration_s > max_stop_duration_s).then_some(StopBoundary {
                before: i,
                after: i + 1,
                duration_s,
            })
        })
        .collect()
}

/// Trims and splits a track at long stops.
///
/// The borrowed track is rewritten by [`split_by_max_duration`]: afterwards
/// it holds the first output track, or nothing if no track survived.
///
/// [`split_by_max_duration`]: DurationSplitter::split_by_max_duration
pub struct DurationSplitter<'a> {
    track: &'a mut Track,
    min_move_duration_s: Option<f64>,
}

impl<'a> DurationSplitter<'a> {
    /// Splitter that falls back to [`DEFAULT_MIN_MOVE_DURATION_S`].
    pub fn new(track: &'a mut Track) -> Self {
        Self {
            track,
            min_move_duration_s: None,
        }
    }

    /// Splitter with its own default edge buffer.
    pub fn with_min_move_duration(track: &'a mut Track, min_move_duration_s: f64) -> Result<Self> {
        Ok(Self {
            track,
            min_move_duration_s: Some(require_non_negative(
                "min_move_duration_s",
                min_move_duration_s,
            )?),
        })
    }

    /// Trim the track edges and split it at the remaining long stops.
    ///
    /// `min_move_duration_s` overrides the splitter's default for this call.
    /// Both edge comparisons are inclusive: a piece whose moving time equals
    /// the buffer is trimmed.
    pub fn split_by_max_duration(
        &mut self,
        max_stop_duration_s: f64,
        min_move_duration_s: Option<f64>,
    ) -> Result<SplitResult> {
        let max_stop = require_positive("max_stop_duration_s", max_stop_duration_s)?;
        let min_move = require_non_negative(
            "min_move_duration_s",
            min_move_duration_s
                .or(self.min_move_duration_s)
                .unwrap_or(DEFAULT_MIN_MOVE_DURATION_S),
        )?;

        let mut result = SplitResult::default();
        if self.track.len() < 2 {
            return Ok(result);
        }

        let mut points = std::mem::take(self.track).into_points();
        let stops = find_stop_boundaries(&points, max_stop);

        if stops.is_empty() {
            let whole = Track::from_points(points);
            *self.track = whole.clone();
            result.tracks.push(whole);
            info!("[DurationSplit] No stops over {}s, track kept whole", max_stop);
            return Ok(result);
        }

        let last_index = points.len() - 1;
        let first_stop = stops[0];
        let last_stop = stops[stops.len() - 1];
        let trim_start = points[0]
            .duration_to(&points[first_stop.before])
            .is_some_and(|moving| moving <= min_move);
        let trim_end = points[last_stop.after]
            .duration_to(&points[last_index])
            .is_some_and(|moving| moving <= min_move);

        for stop in &stops {
            debug!(
                "[DurationSplit] Stop of {:.0}s between points {} and {}",
                stop.duration_s, stop.before, stop.after
            );
            // Back-to-back stops share their middle point
            if !stops_share_point(&result.segments, stop) {
                result.points.push(points[stop.before]);
            }
            result.points.push(points[stop.after]);
            result.segments.push(*stop);
        }

        // Cut from the back so each piece is moved out without copying
        let mut pieces: Vec<Track> = Vec::with_capacity(stops.len() + 1);
        for stop in stops.iter().rev() {
            pieces.push(Track::from_points(points.split_off(stop.after)));
        }
        pieces.push(Track::from_points(points));
        pieces.reverse();

        let piece_count = pieces.len();
        for (i, piece) in pieces.into_iter().enumerate() {
            let trimmed = (i == 0 && trim_start) || (i == piece_count - 1 && trim_end);
            if trimmed || piece.len() < 2 {
                debug!(
                    "[DurationSplit] Dropping piece {} ({} points, trimmed: {})",
                    i,
                    piece.len(),
                    trimmed
                );
                result.dropped.push(piece);
            } else {
                result.tracks.push(piece);
            }
        }

        *self.track = result.tracks.first().cloned().unwrap_or_default();

        info!(
            "[DurationSplit] {} stops, trim start: {}, trim end: {}, {} tracks, {} dropped pieces",
            result.segments.len(),
            trim_start,
            trim_end,
            result.tracks.len(),
            result.dropped.len()
        );

        Ok(result)
    }
}

fn stops_share_point(previous: &[StopBoundary], stop: &StopBoundary) -> bool {
    previous.last().is_some_and(|prev| prev.after == stop.before)
}
