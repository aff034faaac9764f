//! Totals derived from a generated schedule (daily log sheet recap).

use serde::Serialize;

use super::segment::{DutySegment, DutyStatus};

/// Hours per duty status for one log day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub day_number: u32,
    pub driving_hours: f64,
    pub on_duty_hours: f64,
    pub off_duty_hours: f64,
    pub sleeper_hours: f64,
    pub miles: f64,
}

impl DailyTotals {
    fn add(&mut self, segment: &DutySegment) {
        match segment.status {
            DutyStatus::Driving => self.driving_hours += segment.duration,
            DutyStatus::OnDuty => self.on_duty_hours += segment.duration,
            DutyStatus::OffDuty => self.off_duty_hours += segment.duration,
            DutyStatus::Sleeper => self.sleeper_hours += segment.duration,
        }
        self.miles += segment.miles_moved;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_driving_hours: f64,
    pub total_on_duty_hours: f64,
    pub total_off_duty_hours: f64,
    pub total_sleeper_hours: f64,
    pub total_miles: f64,
    pub day_count: u32,
    pub days: Vec<DailyTotals>,
}

/// Aggregate a segment sequence. Segments are expected in schedule order.
pub fn summarize(segments: &[DutySegment]) -> ScheduleSummary {
    let mut days: Vec<DailyTotals> = Vec::new();

    for segment in segments {
        let needs_new_day = days
            .last()
            .map_or(true, |day| day.day_number != segment.day_number);
        if needs_new_day {
            days.push(DailyTotals {
                day_number: segment.day_number,
                ..Default::default()
            });
        }
        if let Some(day) = days.last_mut() {
            day.add(segment);
        }
    }

    let mut summary = ScheduleSummary {
        day_count: days.len() as u32,
        ..Default::default()
    };
    for day in &days {
        summary.total_driving_hours += day.driving_hours;
        summary.total_on_duty_hours += day.on_duty_hours;
        summary.total_off_duty_hours += day.off_duty_hours;
        summary.total_sleeper_hours += day.sleeper_hours;
        summary.total_miles += day.miles;
    }
    summary.days = days;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::hos::{generate, RegulatoryConfig, METERS_TO_MILES};

    fn total_hours(day: &DailyTotals) -> f64 {
        day.driving_hours + day.on_duty_hours + day.off_duty_hours + day.sleeper_hours
    }

    #[test]
    fn test_empty_schedule() {
        let summary = summarize(&[]);
        assert_eq!(summary.day_count, 0);
        assert!(summary.days.is_empty());
        assert_eq!(summary.total_miles, 0.0);
    }

    #[test]
    fn test_single_day_totals() {
        let segments = vec![
            DutySegment::build(DutyStatus::OffDuty, 6.0, "Off Duty", 0.0, 0.0, 0.0),
            DutySegment::build(DutyStatus::OnDuty, 0.5, "Pre-trip Inspection", 6.0, 6.0, 0.0),
            DutySegment::build(DutyStatus::Driving, 2.0, "Driving", 6.5, 6.5, 110.0),
            DutySegment::build(DutyStatus::OffDuty, 15.5, "Off Duty", 8.5, 8.5, 0.0),
        ];

        let summary = summarize(&segments);

        assert_eq!(summary.day_count, 1);
        assert_eq!(summary.total_driving_hours, 2.0);
        assert_eq!(summary.total_on_duty_hours, 0.5);
        assert_eq!(summary.total_off_duty_hours, 21.5);
        assert_eq!(summary.total_miles, 110.0);
        assert_eq!(total_hours(&summary.days[0]), 24.0);
    }

    #[test]
    fn test_multi_day_schedule_days_are_full() {
        let config = RegulatoryConfig::default();
        let pickup_m = 800.0 / METERS_TO_MILES;
        let dropoff_m = 1400.0 / METERS_TO_MILES;
        let segments = generate(pickup_m, dropoff_m, 0.0, &config).unwrap();

        let summary = summarize(&segments);

        assert!(summary.day_count > 1);
        assert_eq!(summary.days.len() as u32, summary.day_count);
        for (i, day) in summary.days.iter().enumerate() {
            assert_eq!(day.day_number, i as u32 + 1);
            assert!((total_hours(day) - 24.0).abs() < 1e-6, "day {:?}", day);
        }
        assert!((summary.total_miles - 2200.0).abs() < 1e-6);
        assert!(summary.total_sleeper_hours >= config.sleeper_break_hours);
    }
}
