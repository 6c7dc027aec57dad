//! End-to-end track cleaning: optional noise-cloud smoothing, then splitting.
//!
//! ## Example
//! ```rust
//! use track_processor::pipeline::{process_track, TrackConfig};
//! use track_processor::Track;
//!
//! let config = TrackConfig::from_json_str(r#"{"maxStopDurationS": 1800}"#).unwrap();
//! let result = process_track(Track::new(), &config).unwrap();
//! assert!(result.tracks.is_empty());
//! ```

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, Result, TrackError};
use crate::smoothing::{NoiseCloudSmoother, SmoothingResult, DEFAULT_MAX_PASSES};
use crate::splitting::{DurationSplitter, SplitResult, DEFAULT_MIN_MOVE_DURATION_S};
use crate::Track;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Thresholds for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackConfig {
    /// Run noise-cloud smoothing before splitting.
    /// Default: true
    pub smooth: bool,

    /// Speed (m/s) below which the receiver is treated as stationary.
    /// Default: 0.11176 (0.25 mph)
    pub min_speed_ms: f64,

    /// Repeat smoothing passes until nothing changes.
    /// Default: false
    pub iterate_overlapping: bool,

    /// Pass limit when iterating. Default: 1000
    pub max_smoothing_passes: usize,

    /// Gap (seconds) that separates two activities.
    /// Default: 3600
    pub max_stop_duration_s: f64,

    /// Moving time (seconds) next to a track edge below which the edge piece
    /// is trimmed. Default: 300
    pub min_move_duration_s: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            min_speed_ms: 0.11176,
            iterate_overlapping: false,
            max_smoothing_passes: DEFAULT_MAX_PASSES,
            max_stop_duration_s: 3600.0,
            min_move_duration_s: DEFAULT_MIN_MOVE_DURATION_S,
        }
    }
}

impl TrackConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrackConfig =
            serde_json::from_str(json).map_err(|e| TrackError::ConfigError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every threshold is in range.
    pub fn validate(&self) -> Result<()> {
        require_positive("min_speed_ms", self.min_speed_ms)?;
        require_positive("max_stop_duration_s", self.max_stop_duration_s)?;
        require_non_negative("min_move_duration_s", self.min_move_duration_s)?;
        if self.max_smoothing_passes == 0 {
            return Err(TrackError::ConfigError {
                message: "maxSmoothingPasses must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// `None` when smoothing was disabled
    pub smoothing: Option<SmoothingResult>,
    pub split: SplitResult,
    /// Output activity tracks (same as `split.tracks`)
    pub tracks: Vec<Track>,
}

/// Clean a single track.
pub fn process_track(mut track: Track, config: &TrackConfig) -> Result<PipelineResult> {
    config.validate()?;
    let input_len = track.len();

    let smoothing = if config.smooth {
        let smoother = NoiseCloudSmoother::new(config.min_speed_ms)?
            .iterate_overlapping(config.iterate_overlapping)
            .max_passes(config.max_smoothing_passes);
        Some(smoother.smooth(&mut track)?)
    } else {
        None
    };

    let split = DurationSplitter::with_min_move_duration(&mut track, config.min_move_duration_s)?
        .split_by_max_duration(config.max_stop_duration_s, None)?;

    info!(
        "[Pipeline] {} points -> {} tracks",
        input_len,
        split.tracks.len()
    );

    let tracks = split.tracks.clone();
    Ok(PipelineResult {
        smoothing,
        split,
        tracks,
    })
}

/// Clean many tracks sequentially.
pub fn process_tracks(tracks: Vec<Track>, config: &TrackConfig) -> Vec<Result<PipelineResult>> {
    tracks
        .into_iter()
        .map(|track| process_track(track, config))
        .collect()
}

/// Clean many tracks in parallel. Each track is owned by exactly one worker.
#[cfg(feature = "parallel")]
pub fn process_tracks_parallel(
    tracks: Vec<Track>,
    config: &TrackConfig,
) -> Vec<Result<PipelineResult>> {
    tracks
        .into_par_iter()
        .map(|track| process_track(track, config))
        .collect()
}
