//! Lines-per-minute rate between two commits.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::MetricsError;

/// Rate of change between two commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityMetrics {
    /// Lines of code changed per minute of elapsed time
    pub loc_per_minute: f64,
}

impl VelocityMetrics {
    /// Computes the metrics for `loc` lines over `time_delta`.
    pub fn calculate(loc: u64, time_delta: TimeDelta) -> Result<Self, MetricsError> {
        Ok(Self {
            loc_per_minute: velocity(loc, time_delta)?,
        })
    }
}

/// Converts a line count and elapsed time into lines per minute.
///
/// A zero or negative delta is an error rather than a zero rate.
pub fn velocity(loc: u64, time_delta: TimeDelta) -> Result<f64, MetricsError> {
    if time_delta <= TimeDelta::zero() {
        return Err(MetricsError::InvalidTimeDelta {
            seconds: time_delta.num_seconds(),
        });
    }

    let minutes = time_delta.num_milliseconds() as f64 / 60_000.0;
    Ok(loc as f64 / minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_hundred_lines_in_ten_minutes() {
        let rate = velocity(600, TimeDelta::minutes(10)).unwrap();
        assert!((rate - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sub_minute_delta_scales_up() {
        let rate = velocity(50, TimeDelta::seconds(30)).unwrap();
        assert!((rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_delta_is_rejected() {
        assert_eq!(
            velocity(10, TimeDelta::zero()),
            Err(MetricsError::InvalidTimeDelta { seconds: 0 })
        );
    }

    #[test]
    fn negative_delta_is_rejected() {
        let err = velocity(10, TimeDelta::seconds(-5)).unwrap_err();
        assert_eq!(err.to_string(), "invalid time delta: -5s (must be positive)");
    }

    #[test]
    fn zero_lines_is_zero_rate() {
        let metrics = VelocityMetrics::calculate(0, TimeDelta::minutes(3)).unwrap();
        assert!(metrics.loc_per_minute.abs() < f64::EPSILON);
    }
}
