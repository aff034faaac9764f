//! Schedule simulation.
//!
//! Walks the trip forward in time. Each iteration drives for the most
//! restrictive of five budgets (daily cap, duty window, break interval,
//! distance to the next stop, cycle hours) and then resolves at most one
//! mandatory stop, in priority order fueling → break → sleeper. A cycle restart
//! is checked before anything else at the top of every iteration.

use tracing::debug;

use super::segment::{build_with_midnight_split, DutySegment, DutyStatus};
use super::{ensure_non_negative, meters_to_miles, RegulatoryConfig, ScheduleError, HOURS_PER_DAY, TIME_EPSILON};

/// Leftover distance (miles) treated as arrived.
const DISTANCE_EPSILON: f64 = 1e-9;

fn reached(value: f64, limit: f64) -> bool {
    value >= limit - TIME_EPSILON
}

/// Everything that can happen to the driver during a trip.
///
/// Each event maps to one duty status and one counter update rule in
/// [`SimulatorState::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DutyEvent {
    /// Start-of-day rest before coming on duty
    OffDuty { hours: f64 },
    PreTripInspection,
    CycleRestart,
    Drive { hours: f64, miles: f64 },
    PickupLoading,
    Fueling,
    Break,
    Sleeper,
    DropoffUnloading,
}

/// Stops resolved after a driving quantum, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryStop {
    Fueling,
    Break,
    Sleeper,
}

impl From<MandatoryStop> for DutyEvent {
    fn from(stop: MandatoryStop) -> Self {
        match stop {
            MandatoryStop::Fueling => DutyEvent::Fueling,
            MandatoryStop::Break => DutyEvent::Break,
            MandatoryStop::Sleeper => DutyEvent::Sleeper,
        }
    }
}

impl DutyEvent {
    fn status(&self) -> DutyStatus {
        match self {
            DutyEvent::OffDuty { .. } | DutyEvent::CycleRestart | DutyEvent::Break => DutyStatus::OffDuty,
            DutyEvent::PreTripInspection
            | DutyEvent::PickupLoading
            | DutyEvent::Fueling
            | DutyEvent::DropoffUnloading => DutyStatus::OnDuty,
            DutyEvent::Drive { .. } => DutyStatus::Driving,
            DutyEvent::Sleeper => DutyStatus::Sleeper,
        }
    }

    fn duration(&self, config: &RegulatoryConfig) -> f64 {
        match *self {
            DutyEvent::OffDuty { hours } => hours,
            DutyEvent::PreTripInspection => config.pre_trip_inspection_time,
            DutyEvent::CycleRestart => config.rest_after_cycle,
            DutyEvent::Drive { hours, .. } => hours,
            DutyEvent::PickupLoading => config.pickup_time,
            DutyEvent::Fueling => config.fueling_duration,
            DutyEvent::Break => config.break_duration,
            DutyEvent::Sleeper => config.sleeper_break_hours,
            DutyEvent::DropoffUnloading => config.dropoff_time,
        }
    }

    fn miles(&self) -> f64 {
        match *self {
            DutyEvent::Drive { miles, .. } => miles,
            _ => 0.0,
        }
    }

    fn label(&self, config: &RegulatoryConfig) -> String {
        match self {
            DutyEvent::OffDuty { .. } => "Off Duty".to_string(),
            DutyEvent::PreTripInspection => "Pre-trip Inspection".to_string(),
            DutyEvent::CycleRestart => format!("{} Cycle Restart", format_hours(config.rest_after_cycle)),
            DutyEvent::Drive { .. } => "Driving".to_string(),
            DutyEvent::PickupLoading => "Pickup Loading".to_string(),
            DutyEvent::Fueling => "Fueling".to_string(),
            DutyEvent::Break => format!("{} Break", format_hours(config.break_duration)),
            DutyEvent::Sleeper => format!("{} Sleeper Berth", format_hours(config.sleeper_break_hours)),
            DutyEvent::DropoffUnloading => "Drop-off Unloading".to_string(),
        }
    }
}

/// "30m" for sub-hour durations, "10h" / "1.5h" otherwise.
fn format_hours(hours: f64) -> String {
    if hours < 1.0 {
        format!("{}m", (hours * 60.0).round())
    } else {
        format!("{}h", hours)
    }
}

/// Running counters for a single simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorState {
    /// Cycle hours left; may start negative when the driver is already over
    pub cycle_remaining: f64,
    /// Hours used in the current duty window
    pub drive_window: f64,
    /// Driving hours since the last sleeper/restart
    pub drive_accumulated: f64,
    pub drive_since_break: f64,
    pub miles_since_fuel: f64,
    pub current_hour: f64,
    pub total_elapsed: f64,
    pub pickup_done: bool,
    pub dist_to_pickup: f64,
    pub remaining_distance: f64,
}

impl SimulatorState {
    fn new(cycle_used_hours: f64, config: &RegulatoryConfig) -> Self {
        Self {
            cycle_remaining: config.max_cycle_hours - cycle_used_hours,
            drive_window: 0.0,
            drive_accumulated: 0.0,
            drive_since_break: 0.0,
            miles_since_fuel: 0.0,
            current_hour: config.start_duty_hour,
            total_elapsed: 0.0,
            pickup_done: false,
            dist_to_pickup: 0.0,
            remaining_distance: 0.0,
        }
    }

    pub fn needs_cycle_restart(&self) -> bool {
        self.cycle_remaining <= TIME_EPSILON
    }

    /// Distance still to cover before the next logical stop
    fn distance_to_next_stop(&self) -> f64 {
        if self.pickup_done {
            self.remaining_distance
        } else {
            self.dist_to_pickup
        }
    }

    /// The longest drive allowed right now, as `(hours, miles)`.
    ///
    /// When the distance budget binds, the drive covers exactly the remaining
    /// distance to the stop.
    pub fn drive_quantum(&self, config: &RegulatoryConfig) -> (f64, f64) {
        let left_daily = config.max_driving_per_day - self.drive_accumulated;
        let left_window = config.max_drive_window - self.drive_window;
        let left_before_break = config.break_after_hours - self.drive_since_break;
        let time_budget = left_daily
            .min(left_window)
            .min(left_before_break)
            .min(self.cycle_remaining);

        let to_next_stop = self.distance_to_next_stop().max(0.0);
        let left_to_next_stop = to_next_stop / config.avg_speed_mph;

        if left_to_next_stop <= time_budget + TIME_EPSILON {
            (left_to_next_stop, to_next_stop)
        } else {
            (time_budget, time_budget * config.avg_speed_mph)
        }
    }

    /// First mandatory stop due, if any. Fueling wins over a break, a break
    /// over a sleeper reset.
    pub fn mandatory_stop(&self, config: &RegulatoryConfig) -> Option<MandatoryStop> {
        if reached(self.miles_since_fuel, config.miles_before_fuel) {
            Some(MandatoryStop::Fueling)
        } else if reached(self.drive_since_break, config.break_after_hours) {
            Some(MandatoryStop::Break)
        } else if reached(self.drive_accumulated, config.max_driving_per_day)
            || reached(self.drive_window, config.max_drive_window)
        {
            Some(MandatoryStop::Sleeper)
        } else {
            None
        }
    }

    pub fn pickup_reached(&self) -> bool {
        !self.pickup_done && self.dist_to_pickup <= 0.0
    }

    /// Update counters for an event that has just been recorded.
    ///
    /// Breaks advance the window but not the cycle; sleeper and restart
    /// consume neither.
    pub fn apply(&mut self, event: DutyEvent, config: &RegulatoryConfig) {
        match event {
            DutyEvent::OffDuty { .. } => {}
            DutyEvent::PreTripInspection => {
                self.consume_on_duty(config.pre_trip_inspection_time);
            }
            DutyEvent::CycleRestart => {
                self.cycle_remaining = config.max_cycle_hours;
                self.reset_daily();
            }
            DutyEvent::Drive { hours, miles } => {
                if !self.pickup_done {
                    self.dist_to_pickup -= miles;
                }
                self.remaining_distance -= miles;
                self.miles_since_fuel += miles;
                self.drive_accumulated += hours;
                self.drive_since_break += hours;
                self.consume_on_duty(hours);
            }
            DutyEvent::PickupLoading => {
                self.consume_on_duty(config.pickup_time);
                self.pickup_done = true;
            }
            DutyEvent::Fueling => {
                self.consume_on_duty(config.fueling_duration);
                self.miles_since_fuel = 0.0;
            }
            DutyEvent::Break => {
                self.drive_window += config.break_duration;
                self.drive_since_break = 0.0;
            }
            DutyEvent::Sleeper => self.reset_daily(),
            DutyEvent::DropoffUnloading => {
                self.consume_on_duty(config.dropoff_time);
            }
        }
    }

    fn consume_on_duty(&mut self, hours: f64) {
        self.drive_window += hours;
        self.cycle_remaining -= hours;
    }

    fn reset_daily(&mut self) {
        self.drive_window = 0.0;
        self.drive_accumulated = 0.0;
        self.drive_since_break = 0.0;
    }
}

/// Generates the duty schedule for one trip.
///
/// Owns its state for the duration of a single [`ScheduleSimulator::generate`]
/// call; nothing outlives it.
pub struct ScheduleSimulator<'a> {
    config: &'a RegulatoryConfig,
    state: SimulatorState,
    segments: Vec<DutySegment>,
}

impl<'a> ScheduleSimulator<'a> {
    /// Validate the configuration and cycle hours, then set up counters.
    pub fn new(cycle_used_hours: f64, config: &'a RegulatoryConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        ensure_non_negative("cycle_used_hours", cycle_used_hours)?;

        Ok(Self {
            config,
            state: SimulatorState::new(cycle_used_hours, config),
            segments: Vec::new(),
        })
    }

    /// Run the trip: start → pickup → dropoff.
    pub fn generate(
        mut self,
        dist_to_pickup_meters: f64,
        dist_to_dropoff_meters: f64,
    ) -> Result<Vec<DutySegment>, ScheduleError> {
        ensure_non_negative("dist_to_pickup_meters", dist_to_pickup_meters)?;
        ensure_non_negative("dist_to_dropoff_meters", dist_to_dropoff_meters)?;

        let pickup_miles = meters_to_miles(dist_to_pickup_meters);
        let dropoff_miles = meters_to_miles(dist_to_dropoff_meters);

        debug!(
            "Generating schedule: {:.1} mi to pickup, {:.1} mi to dropoff, {:.2}h cycle left",
            pickup_miles, dropoff_miles, self.state.cycle_remaining
        );

        if self.config.start_duty_hour > 0.0 {
            // Covers hour 0 up to the start of duty.
            self.state.current_hour = 0.0;
            self.record(DutyEvent::OffDuty { hours: self.config.start_duty_hour });
        }
        self.record(DutyEvent::PreTripInspection);

        self.state.dist_to_pickup = pickup_miles;
        self.state.remaining_distance = pickup_miles + dropoff_miles;
        self.state.pickup_done = false;

        while self.state.remaining_distance > DISTANCE_EPSILON {
            self.step();
        }

        self.record(DutyEvent::DropoffUnloading);
        self.pad_to_end_of_day();

        debug!(
            "Schedule complete: {} segments over {:.2}h",
            self.segments.len(),
            self.state.total_elapsed
        );

        Ok(self.segments)
    }

    /// One loop iteration: restart check, drive, pickup, mandatory stop.
    fn step(&mut self) {
        if self.state.needs_cycle_restart() {
            self.record(DutyEvent::CycleRestart);
        }

        let (hours, miles) = self.state.drive_quantum(self.config);
        if hours > TIME_EPSILON || (hours > 0.0 && miles > 0.0) {
            self.record(DutyEvent::Drive { hours, miles });
        }

        if self.state.pickup_reached() {
            self.record(DutyEvent::PickupLoading);
        }

        if let Some(stop) = self.state.mandatory_stop(self.config) {
            self.record(stop.into());
        }
    }

    /// Emit the segment(s) for `event` and advance the clock and counters.
    fn record(&mut self, event: DutyEvent) {
        let duration = event.duration(self.config);
        let split = build_with_midnight_split(
            event.status(),
            duration,
            &event.label(self.config),
            self.state.current_hour,
            self.state.total_elapsed,
            event.miles(),
        );

        let last = split.last();
        self.state.current_hour = last.end_hour;
        self.state.total_elapsed = last.elapsed_end;

        debug!(
            "{:?} for {:.2}h at elapsed {:.2}h ({} piece(s))",
            event,
            duration,
            self.state.total_elapsed,
            split.len()
        );

        self.segments.extend(split.into_segments());
        self.state.apply(event, self.config);
    }

    /// Off-duty filler up to the next midnight; a full day when the drop-off
    /// ends exactly on one. Never crosses it, so it is built directly.
    fn pad_to_end_of_day(&mut self) {
        // Measured on the elapsed axis, the same one the midnight split uses.
        let elapsed = self.state.total_elapsed;
        let next_midnight = ((elapsed / HOURS_PER_DAY).floor() + 1.0) * HOURS_PER_DAY;
        let left_time = next_midnight - elapsed;
        if left_time <= TIME_EPSILON {
            return;
        }

        let filler = DutySegment::build(
            DutyStatus::OffDuty,
            left_time,
            "Off Duty",
            self.state.current_hour,
            self.state.total_elapsed,
            0.0,
        );
        self.state.current_hour = filler.end_hour;
        self.state.total_elapsed = filler.elapsed_end;
        self.segments.push(filler);
    }
}

/// Generate the full schedule for a trip.
pub fn generate(
    dist_to_pickup_meters: f64,
    dist_to_dropoff_meters: f64,
    cycle_used_hours: f64,
    config: &RegulatoryConfig,
) -> Result<Vec<DutySegment>, ScheduleError> {
    ScheduleSimulator::new(cycle_used_hours, config)?.generate(dist_to_pickup_meters, dist_to_dropoff_meters)
}
