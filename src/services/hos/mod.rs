//! Hours-of-Service schedule engine
//!
//! Turns a two-leg trip (start → pickup → dropoff) plus the hours already used in
//! the current 8-day cycle into an ordered, contiguous sequence of duty segments
//! that never violates the configured driving, window, break and cycle limits.

mod config;
mod segment;
mod simulator;
mod summary;

pub use config::RegulatoryConfig;
pub use segment::DutySegment;
pub use simulator::generate;
pub use summary::{summarize, ScheduleSummary};

use thiserror::Error;

use crate::types::error_codes;

/// Meters → statute miles.
pub const METERS_TO_MILES: f64 = 0.000621371;

/// Hours in one log day.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Tolerance (hours) under which a budget counts as exhausted.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

/// Convert meters to miles
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * METERS_TO_MILES
}

/// Errors raised by the schedule engine before any segment is produced
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl ScheduleError {
    /// Machine-readable code used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::InvalidConfig { .. } => error_codes::INVALID_CONFIG,
            ScheduleError::InvalidInput { .. } => error_codes::INVALID_INPUT,
        }
    }
}

/// Reject negative, NaN or infinite input values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ScheduleError> {
    if !value.is_finite() {
        return Err(ScheduleError::InvalidInput {
            field,
            reason: format!("must be a finite number (got {})", value),
        });
    }
    if value < 0.0 {
        return Err(ScheduleError::InvalidInput {
            field,
            reason: format!("must not be negative (got {})", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_miles() {
        assert!((meters_to_miles(1609.344) - 1.0).abs() < 1e-5);
        assert_eq!(meters_to_miles(0.0), 0.0);
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("distance", 0.0).is_ok());
        assert!(ensure_non_negative("distance", 12.5).is_ok());

        let err = ensure_non_negative("distance", -1.0).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.to_string().contains("distance"));

        assert!(ensure_non_negative("distance", f64::NAN).is_err());
        assert!(ensure_non_negative("distance", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_codes() {
        let err = ScheduleError::InvalidConfig {
            field: "avg_speed_mph",
            reason: "must be positive".to_string(),
        };
        assert_eq!(err.code(), "INVALID_CONFIG");
        assert_eq!(err.to_string(), "invalid configuration: avg_speed_mph must be positive");
    }
}
