//! Unified error handling for the track-processor library.
//!
//! Every fallible operation returns [`Result`]. Bad geographic input and bad
//! thresholds are reported here; broken internal invariants are assertions.

use thiserror::Error;

/// Unified error type for track processing operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// Latitude/longitude is non-finite or outside the WGS84 range
    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Elevation is non-finite
    #[error("Invalid elevation: {elevation}")]
    InvalidElevation { elevation: f64 },

    /// An algorithm threshold is out of its accepted range
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Point index does not exist in the track
    #[error("Index {index} out of range for track with {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    /// Inclusive index range is reversed or runs past the end of the track
    #[error("Invalid range {start}..={end} for track with {len} points")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for track processing operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Extension trait for converting Option to TrackError.
pub trait OptionExt<T> {
    /// Convert Option to Result with generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| TrackError::Internal {
            message: message.to_string(),
        })
    }
}

/// Require a finite, strictly positive threshold.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TrackError::InvalidParameter {
            name,
            value,
            reason: "must be finite and greater than zero",
        })
    }
}

/// Require a finite, non-negative threshold.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TrackError::InvalidParameter {
            name,
            value,
            reason: "must be finite and not negative",
        })
    }
}
