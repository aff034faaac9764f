//! Regulatory constants consumed by the schedule engine

use anyhow::{Context, Result};
use serde::Serialize;

use super::{ScheduleError, HOURS_PER_DAY};
use crate::defaults::*;

/// Hours-of-Service limits and fixed activity durations.
///
/// All durations are in hours, speeds in miles per hour, intervals in miles.
/// The engine treats an instance as immutable; call [`RegulatoryConfig::validate`]
/// before handing it to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryConfig {
    /// Rolling cycle limit (e.g. 70h / 8 days)
    pub max_cycle_hours: f64,
    /// Daily driving cap
    pub max_driving_per_day: f64,
    /// On-duty window within which all daily driving must happen
    pub max_drive_window: f64,
    /// Driving hours after which a short break is mandatory
    pub break_after_hours: f64,
    pub break_duration: f64,
    pub avg_speed_mph: f64,
    pub pickup_time: f64,
    pub dropoff_time: f64,
    pub pre_trip_inspection_time: f64,
    /// Miles between fueling stops
    pub miles_before_fuel: f64,
    pub fueling_duration: f64,
    pub sleeper_break_hours: f64,
    /// Off-duty restart that refills the cycle
    pub rest_after_cycle: f64,
    /// Hour of day (0–23) the driver comes on duty; may be 0
    pub start_duty_hour: f64,
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        Self {
            max_cycle_hours: DEFAULT_MAX_CYCLE_HOURS,
            max_driving_per_day: DEFAULT_MAX_DRIVING_PER_DAY,
            max_drive_window: DEFAULT_MAX_DRIVE_WINDOW,
            break_after_hours: DEFAULT_BREAK_AFTER_HOURS,
            break_duration: DEFAULT_BREAK_DURATION,
            avg_speed_mph: DEFAULT_AVG_SPEED_MPH,
            pickup_time: DEFAULT_PICKUP_TIME,
            dropoff_time: DEFAULT_DROPOFF_TIME,
            pre_trip_inspection_time: DEFAULT_PRE_TRIP_INSPECTION_TIME,
            miles_before_fuel: DEFAULT_MILES_BEFORE_FUEL,
            fueling_duration: DEFAULT_FUELING_DURATION,
            sleeper_break_hours: DEFAULT_SLEEPER_BREAK_HOURS,
            rest_after_cycle: DEFAULT_REST_AFTER_CYCLE,
            start_duty_hour: DEFAULT_START_DUTY_HOUR,
        }
    }
}

impl RegulatoryConfig {
    /// Load from `HOS_*` environment variables, falling back to defaults.
    ///
    /// The result is validated, so a bad override fails at startup.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            max_cycle_hours: env_hours("HOS_MAX_CYCLE_HOURS", defaults.max_cycle_hours)?,
            max_driving_per_day: env_hours("HOS_MAX_DRIVING_PER_DAY", defaults.max_driving_per_day)?,
            max_drive_window: env_hours("HOS_MAX_DRIVE_WINDOW", defaults.max_drive_window)?,
            break_after_hours: env_hours("HOS_BREAK_AFTER_HOURS", defaults.break_after_hours)?,
            break_duration: env_hours("HOS_BREAK_DURATION", defaults.break_duration)?,
            avg_speed_mph: env_hours("HOS_AVG_SPEED_MPH", defaults.avg_speed_mph)?,
            pickup_time: env_hours("HOS_PICKUP_TIME", defaults.pickup_time)?,
            dropoff_time: env_hours("HOS_DROPOFF_TIME", defaults.dropoff_time)?,
            pre_trip_inspection_time: env_hours(
                "HOS_PRE_TRIP_INSPECTION_TIME",
                defaults.pre_trip_inspection_time,
            )?,
            miles_before_fuel: env_hours("HOS_MILES_BEFORE_FUEL", defaults.miles_before_fuel)?,
            fueling_duration: env_hours("HOS_FUELING_DURATION", defaults.fueling_duration)?,
            sleeper_break_hours: env_hours("HOS_SLEEPER_BREAK_HOURS", defaults.sleeper_break_hours)?,
            rest_after_cycle: env_hours("HOS_REST_AFTER_CYCLE", defaults.rest_after_cycle)?,
            start_duty_hour: env_hours("HOS_START_DUTY_HOUR", defaults.start_duty_hour)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every constant so the simulation is guaranteed to terminate.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let positive = [
            ("max_cycle_hours", self.max_cycle_hours),
            ("max_driving_per_day", self.max_driving_per_day),
            ("max_drive_window", self.max_drive_window),
            ("break_after_hours", self.break_after_hours),
            ("break_duration", self.break_duration),
            ("avg_speed_mph", self.avg_speed_mph),
            ("pickup_time", self.pickup_time),
            ("dropoff_time", self.dropoff_time),
            ("pre_trip_inspection_time", self.pre_trip_inspection_time),
            ("miles_before_fuel", self.miles_before_fuel),
            ("fueling_duration", self.fueling_duration),
            ("sleeper_break_hours", self.sleeper_break_hours),
            ("rest_after_cycle", self.rest_after_cycle),
        ];

        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScheduleError::InvalidConfig {
                    field,
                    reason: format!("must be a positive number (got {})", value),
                });
            }
        }

        if !self.start_duty_hour.is_finite()
            || self.start_duty_hour < 0.0
            || self.start_duty_hour >= HOURS_PER_DAY
        {
            return Err(ScheduleError::InvalidConfig {
                field: "start_duty_hour",
                reason: format!("must be within [0, 24) (got {})", self.start_duty_hour),
            });
        }

        Ok(())
    }
}

fn env_hours(name: &str, default: f64) -> Result<f64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegulatoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_cycle_hours, 70.0);
        assert_eq!(config.max_driving_per_day, 11.0);
        assert_eq!(config.max_drive_window, 14.0);
    }

    #[test]
    fn test_zero_speed_rejected() {
        let config = RegulatoryConfig {
            avg_speed_mph: 0.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidConfig {
                field: "avg_speed_mph",
                reason: "must be a positive number (got 0)".to_string(),
            }
        );
    }

    #[test]
    fn test_negative_daily_cap_rejected() {
        let config = RegulatoryConfig {
            max_driving_per_day: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScheduleError::InvalidConfig { field: "max_driving_per_day", .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let config = RegulatoryConfig {
            fueling_duration: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_start_duty_hour_bounds() {
        let midnight = RegulatoryConfig {
            start_duty_hour: 0.0,
            ..Default::default()
        };
        assert!(midnight.validate().is_ok());

        let out_of_range = RegulatoryConfig {
            start_duty_hour: 24.0,
            ..Default::default()
        };
        assert!(matches!(
            out_of_range.validate(),
            Err(ScheduleError::InvalidConfig { field: "start_duty_hour", .. })
        ));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("HOS_REST_AFTER_CYCLE", "36");
        let config = RegulatoryConfig::from_env().unwrap();
        assert_eq!(config.rest_after_cycle, 36.0);
        std::env::remove_var("HOS_REST_AFTER_CYCLE");
    }

    #[test]
    fn test_env_hours_unparseable() {
        std::env::set_var("HOS_TEST_UNPARSEABLE", "eleven");
        assert!(env_hours("HOS_TEST_UNPARSEABLE", 11.0).is_err());
        std::env::remove_var("HOS_TEST_UNPARSEABLE");
        assert_eq!(env_hours("HOS_TEST_UNPARSEABLE", 11.0).unwrap(), 11.0);
    }
}
