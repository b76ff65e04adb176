use crate::models::Profile;

/// Statute miles per nautical mile
const MILES_PER_NAUTICAL_MILE: f64 = 1.1515;

/// Nautical miles per degree of arc
const NAUTICAL_MILES_PER_DEGREE: f64 = 60.0;

/// Approximate great-circle distance between two points, in miles
///
/// Uses the spherical law of cosines. The dot product is clamped into
/// `[-1, 1]` before `acos`, since rounding can push it just outside the
/// domain for identical or antipodal points. NaN inputs propagate.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lng1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lng2` - Longitude of second point in degrees
#[inline]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    if lat1 == lat2 && lng1 == lng2 {
        return 0.0;
    }

    let rad_lat1 = lat1.to_radians();
    let rad_lat2 = lat2.to_radians();
    let rad_theta = (lng1 - lng2).to_radians();

    let dot = rad_lat1.sin() * rad_lat2.sin()
        + rad_lat1.cos() * rad_lat2.cos() * rad_theta.cos();

    let arc_degrees = dot.clamp(-1.0, 1.0).acos().to_degrees();

    arc_degrees * NAUTICAL_MILES_PER_DEGREE * MILES_PER_NAUTICAL_MILE
}

/// Annotate each profile with its distance from `(lat, lng)`
pub fn annotate_distances(profiles: &mut [Profile], lat: f64, lng: f64) {
    for profile in profiles.iter_mut() {
        profile.distance = Some(distance(lat, lng, profile.latitude, profile.longitude));
    }
}

/// Stable ascending sort by annotated distance
///
/// Profiles without a distance (or with NaN) sort last and keep their
/// relative order.
pub fn sort_by_distance(profiles: &mut [Profile]) {
    profiles.sort_by(|a, b| sort_key(a).total_cmp(&sort_key(b)));
}

fn sort_key(profile: &Profile) -> f64 {
    match profile.distance {
        Some(d) if !d.is_nan() => d,
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points() {
        assert_eq!(distance(40.7128, -74.0060, 40.7128, -74.0060), 0.0);
        assert_eq!(distance(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_london_to_paris() {
        // Roughly 213 statute miles
        let d = distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 213.0).abs() < 5.0, "Distance should be ~213mi, got {}", d);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let d = distance(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        // Half the earth's circumference, ~12,436 miles
        assert!((d - 180.0 * 60.0 * 1.1515).abs() < 1e-6);

        let d = distance(45.0, 10.0, -45.0, -170.0);
        assert!(d.is_finite() && d > 0.0);
    }

    #[test]
    fn test_nearly_identical_points() {
        let d = distance(10.0, 10.0, 10.0, 10.000000001);
        assert!(d.is_finite());
        assert!(d >= 0.0 && d < 0.01);
    }

    fn placed(id: i64, distance: Option<f64>) -> Profile {
        Profile {
            id,
            name: format!("user-{}", id),
            gender: crate::models::Gender::NotSpecified,
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            age: 0,
            latitude: 0.0,
            longitude: 0.0,
            distance,
            likability: 0,
        }
    }

    #[test]
    fn test_sort_with_nan_distances() {
        let mut profiles: Vec<Profile> = (0..48)
            .map(|i| {
                let d = match i % 4 {
                    0 => Some(f64::NAN),
                    1 => None,
                    _ => Some(((i * 37) % 11) as f64),
                };
                placed(i, d)
            })
            .collect();

        sort_by_distance(&mut profiles);

        let known: Vec<f64> = profiles.iter().take(24).map(|p| p.distance.unwrap()).collect();
        assert!(known.iter().all(|d| d.is_finite()));
        assert!(known.windows(2).all(|w| w[0] <= w[1]));

        // Unplaceable profiles trail in their original order
        let tail: Vec<i64> = profiles.iter().skip(24).map(|p| p.id).collect();
        let expected: Vec<i64> = (0..48).filter(|i| i % 4 < 2).collect();
        assert_eq!(tail, expected);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance(f64::NAN, 0.0, 1.0, 1.0).is_nan());
    }
}
