//! # Track Processor
//!
//! GPS track cleaning for recorded activities.
//!
//! This library provides:
//! - A validated point type and an owned, spliceable track model
//! - Noise-cloud smoothing that collapses stationary GPS jitter
//! - Duration-based splitting of a recording into separate activities
//! - A configurable pipeline running both, optionally over many tracks in parallel
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch processing with rayon
//! - **`synthetic`** - Seeded synthetic track generator for benchmarks
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use track_processor::{GeoPoint, Track};
//!
//! let points: Vec<GeoPoint> = (0..4)
//!     .map(|i| {
//!         GeoPoint::new(39.878 + i as f64 * 0.001, -105.135)
//!             .unwrap()
//!             .with_timestamp(Utc.timestamp_opt(1_688_500_800 + i * 60, 0).unwrap())
//!     })
//!     .collect();
//!
//! let mut track = Track::from_points(points);
//! let smoothed = track.smooth_noise_clouds(0.11176, true).unwrap();
//! assert_eq!(smoothed.clouds, 0);
//!
//! let split = track.split_by_max_duration(3600.0, Some(120.0)).unwrap();
//! assert_eq!(split.tracks.len(), 1);
//! ```
//!
//! Both algorithms mutate the track they are given and also return a result
//! describing what they changed. A `Track` is not shared between threads;
//! callers that need concurrency hand each track to one worker.

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrackError};

// Geographic utilities (distance, bounds, center calculations)
pub mod geo_utils;

// Points and bounds
pub mod point;
pub use point::{Bounds, GeoPoint};

// Track model with segment views
pub mod track;
pub use track::{Segment, SegmentStats, Track};

// Noise-cloud smoothing
pub mod smoothing;
pub use smoothing::{NoiseCloudSmoother, SmoothingResult, MIN_CLOUD_POINTS};

// Duration-based splitting
pub mod splitting;
pub use splitting::{
    find_stop_boundaries, DurationSplitter, SplitResult, StopBoundary,
    DEFAULT_MIN_MOVE_DURATION_S,
};

// Smoothing + splitting pipeline
pub mod pipeline;
#[cfg(feature = "parallel")]
pub use pipeline::process_tracks_parallel;
pub use pipeline::{process_track, process_tracks, PipelineResult, TrackConfig};

// Algorithm toolbox - modular access to the standalone algorithms
pub mod algorithms;

// Synthetic data for benchmarks and scale tests
#[cfg(feature = "synthetic")]
pub mod synthetic;
