//! Trip planning payloads

use serde::{Deserialize, Serialize};

use crate::services::hos::{DutySegment, ScheduleSummary};

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// From the `[lat, lng]` pair sent by the frontend
    pub fn from_lat_lng(pair: [f64; 2]) -> Self {
        Self { lat: pair[0], lng: pair[1] }
    }

    /// GeoJSON / OpenRouteService order
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// The three waypoints of a trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripWaypoints {
    pub start: Coordinates,
    pub pickup: Coordinates,
    pub dropoff: Coordinates,
}

impl TripWaypoints {
    pub fn as_array(&self) -> [Coordinates; 3] {
        [self.start, self.pickup, self.dropoff]
    }
}

/// Hours already used in the current cycle, as a number or numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CycleUsed {
    Hours(f64),
    Text(String),
}

impl CycleUsed {
    pub fn hours(&self) -> Result<f64, String> {
        let hours = match self {
            CycleUsed::Hours(h) => *h,
            CycleUsed::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("cycleUsed must be a number, got '{}'", raw))?,
        };
        if !hours.is_finite() || hours < 0.0 {
            return Err(format!("cycleUsed must be a non-negative number, got {}", hours));
        }
        Ok(hours)
    }
}

/// Request for hos.trip.plan; coordinates are `[lat, lng]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanRequest {
    pub start: [f64; 2],
    pub pickup: [f64; 2],
    pub dropoff: [f64; 2],
    #[serde(default)]
    pub cycle_used: Option<CycleUsed>,
}

impl TripPlanRequest {
    pub fn waypoints(&self) -> TripWaypoints {
        TripWaypoints {
            start: Coordinates::from_lat_lng(self.start),
            pickup: Coordinates::from_lat_lng(self.pickup),
            dropoff: Coordinates::from_lat_lng(self.dropoff),
        }
    }

    pub fn cycle_used_hours(&self) -> Result<f64, String> {
        match &self.cycle_used {
            Some(cycle_used) => cycle_used.hours(),
            None => Ok(0.0),
        }
    }
}

/// Response for hos.trip.plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResponse {
    pub distance_to_pickup_meters: f64,
    pub distance_to_dropoff_meters: f64,
    pub total_distance_meters: f64,
    pub total_distance_miles: f64,
    /// `[lng, lat]` pairs
    pub route_geometry: Vec<[f64; 2]>,
    pub steps: Vec<DutySegment>,
    pub summary: ScheduleSummary,
}
