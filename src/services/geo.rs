//! Geographic estimates used when no routing engine is available

use crate::types::Coordinates;

/// Mean Earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Straight line → road distance factor
pub const ROAD_COEFFICIENT: f64 = 1.3;

/// Great-circle distance in meters
pub fn haversine_meters(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Estimated road distance in meters for a given detour coefficient
pub fn road_distance_meters(from: &Coordinates, to: &Coordinates, road_coefficient: f64) -> f64 {
    haversine_meters(from, to) * road_coefficient
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago() -> Coordinates {
        Coordinates { lat: 41.8781, lng: -87.6298 }
    }

    fn indianapolis() -> Coordinates {
        Coordinates { lat: 39.7684, lng: -86.1581 }
    }

    #[test]
    fn test_haversine_chicago_indianapolis() {
        // ~265 km straight line
        let km = haversine_meters(&chicago(), &indianapolis()) / 1000.0;
        assert!((km - 265.0).abs() < 10.0, "got {} km", km);
    }

    #[test]
    fn test_haversine_same_point() {
        assert!(haversine_meters(&chicago(), &chicago()).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_symmetric() {
        let there = haversine_meters(&chicago(), &indianapolis());
        let back = haversine_meters(&indianapolis(), &chicago());
        assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn test_road_distance_applies_coefficient() {
        let straight = haversine_meters(&chicago(), &indianapolis());
        let road = road_distance_meters(&chicago(), &indianapolis(), ROAD_COEFFICIENT);
        assert!((road / straight - ROAD_COEFFICIENT).abs() < 1e-9);
    }
}
