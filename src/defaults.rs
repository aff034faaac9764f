//! Default regulatory constants (property-carrying driver, 70h/8-day cycle).

pub const DEFAULT_MAX_CYCLE_HOURS: f64 = 70.0;
pub const DEFAULT_MAX_DRIVING_PER_DAY: f64 = 11.0;
pub const DEFAULT_MAX_DRIVE_WINDOW: f64 = 14.0;
pub const DEFAULT_BREAK_AFTER_HOURS: f64 = 8.0;
pub const DEFAULT_BREAK_DURATION: f64 = 0.5;
pub const DEFAULT_AVG_SPEED_MPH: f64 = 55.0;
pub const DEFAULT_PICKUP_TIME: f64 = 1.0;
pub const DEFAULT_DROPOFF_TIME: f64 = 1.0;
pub const DEFAULT_PRE_TRIP_INSPECTION_TIME: f64 = 0.5;
pub const DEFAULT_MILES_BEFORE_FUEL: f64 = 1000.0;
pub const DEFAULT_FUELING_DURATION: f64 = 0.5;
pub const DEFAULT_SLEEPER_BREAK_HOURS: f64 = 10.0;
pub const DEFAULT_REST_AFTER_CYCLE: f64 = 34.0;
pub const DEFAULT_START_DUTY_HOUR: f64 = 6.0;
