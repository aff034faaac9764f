//! Duty segments and midnight splitting.
//!
//! A segment never spans more than one log day. Activities that would run past
//! midnight are cut at each day boundary and their mileage is distributed in
//! proportion to the time spent on each side.

use serde::Serialize;

use super::{HOURS_PER_DAY, TIME_EPSILON};

/// Duty status as recorded on a driver's daily log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DutyStatus {
    Driving,
    OnDuty,
    OffDuty,
    Sleeper,
}

/// One timed entry of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutySegment {
    pub status: DutyStatus,
    /// Hours
    pub duration: f64,
    pub label: String,
    /// Hour of day in [0, 24)
    pub start_hour: f64,
    /// `(start_hour + duration) mod 24`
    pub end_hour: f64,
    /// Hours since trip start
    pub elapsed_start: f64,
    pub elapsed_end: f64,
    /// 1-based trip day of `elapsed_start`
    pub day_number: u32,
    pub miles_moved: f64,
}

impl DutySegment {
    /// Build a single segment. Does not check for midnight crossings.
    pub fn build(
        status: DutyStatus,
        duration: f64,
        label: impl Into<String>,
        start_hour: f64,
        elapsed_start: f64,
        miles_moved: f64,
    ) -> Self {
        Self {
            status,
            duration,
            label: label.into(),
            start_hour,
            end_hour: (start_hour + duration).rem_euclid(HOURS_PER_DAY),
            elapsed_start,
            elapsed_end: elapsed_start + duration,
            day_number: (elapsed_start / HOURS_PER_DAY).floor() as u32 + 1,
            miles_moved,
        }
    }
}

/// An activity cut at every midnight it crosses. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSplit {
    pieces: Vec<DutySegment>,
}

impl SegmentSplit {
    /// The piece the activity ends in
    pub fn last(&self) -> &DutySegment {
        // `build_with_midnight_split` always pushes at least one piece.
        &self.pieces[self.pieces.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn into_segments(self) -> Vec<DutySegment> {
        self.pieces
    }
}

/// Build the segment(s) for an activity starting at `elapsed_start`.
///
/// If `rest_of_day + duration <= 24` the activity stays whole; a duration that
/// lands exactly on midnight is not split. Otherwise the first piece keeps
/// `start_hour` and ends on the boundary, later pieces start at hour 0.
pub fn build_with_midnight_split(
    status: DutyStatus,
    duration: f64,
    label: &str,
    start_hour: f64,
    elapsed_start: f64,
    miles_moved: f64,
) -> SegmentSplit {
    let mut pieces = Vec::with_capacity(2);
    let mut remaining = duration;
    let mut miles_left = miles_moved;
    let mut elapsed = elapsed_start;
    let mut hour = start_hour;

    loop {
        let boundary = ((elapsed / HOURS_PER_DAY).floor() + 1.0) * HOURS_PER_DAY;
        let rest_of_day = boundary - elapsed;

        if remaining <= rest_of_day + TIME_EPSILON {
            pieces.push(DutySegment::build(status, remaining, label, hour, elapsed, miles_left));
            break;
        }

        // Float residue just short of midnight: start on the next day instead
        // of emitting a sliver.
        if rest_of_day < TIME_EPSILON {
            elapsed = boundary;
            hour = 0.0;
            continue;
        }

        let piece_miles = if miles_moved > 0.0 {
            miles_moved * rest_of_day / duration
        } else {
            0.0
        };
        pieces.push(DutySegment::build(status, rest_of_day, label, hour, elapsed, piece_miles));

        remaining -= rest_of_day;
        miles_left -= piece_miles;
        elapsed = boundary;
        hour = 0.0;
    }

    SegmentSplit { pieces }
}
