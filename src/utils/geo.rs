use crate::model::attendance::GeoPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle (Haversine) distance between two coordinates, in meters.
///
/// Inputs are not validated; non-finite input yields NaN.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// True iff the point lies within `radius_meters` of the center (boundary inclusive).
pub fn is_within_radius(
    center_lat: f64,
    center_lon: f64,
    point_lat: f64,
    point_lon: f64,
    radius_meters: f64,
) -> bool {
    distance_meters(center_lat, center_lon, point_lat, point_lon) <= radius_meters
}

/// Checks that a coordinate pair is finite and inside the lat/lng ranges.
pub fn validate_point(point: &GeoPoint) -> Result<(), String> {
    if !point.lat.is_finite() || !point.lng.is_finite() {
        return Err("Coordinates must be finite numbers".to_string());
    }
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(format!("Latitude {} is outside -90..90", point.lat));
    }
    if !(-180.0..=180.0).contains(&point.lng) {
        return Err(format!("Longitude {} is outside -180..180", point.lng));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DHAKA: (f64, f64) = (23.8103, 90.4125);

    #[test]
    fn same_point_is_zero_distance() {
        for (lat, lon) in [DHAKA, (0.0, 0.0), (-33.8688, 151.2093), (89.9, -179.9)] {
            assert_eq!(distance_meters(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = distance_meters(DHAKA.0, DHAKA.1, 22.3569, 91.7832);
        let b = distance_meters(22.3569, 91.7832, DHAKA.0, DHAKA.1);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn one_degree_of_latitude() {
        // 2 * pi * R / 360
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn center_is_within_any_non_negative_radius() {
        assert!(is_within_radius(DHAKA.0, DHAKA.1, DHAKA.0, DHAKA.1, 0.0));
        assert!(is_within_radius(DHAKA.0, DHAKA.1, DHAKA.0, DHAKA.1, 150.0));
    }

    #[test]
    fn point_500m_away_is_outside_200m_radius() {
        let lat = DHAKA.0 + 500.0 / 111_194.93;
        assert!(!is_within_radius(DHAKA.0, DHAKA.1, lat, DHAKA.1, 200.0));
        assert!(is_within_radius(DHAKA.0, DHAKA.1, lat, DHAKA.1, 600.0));
    }

    #[test]
    fn rejects_out_of_range_points() {
        assert!(validate_point(&GeoPoint { lat: 91.0, lng: 0.0 }).is_err());
        assert!(validate_point(&GeoPoint { lat: 0.0, lng: -180.5 }).is_err());
        assert!(validate_point(&GeoPoint { lat: f64::NAN, lng: 0.0 }).is_err());
        assert!(validate_point(&GeoPoint { lat: -90.0, lng: 180.0 }).is_ok());
    }
}
