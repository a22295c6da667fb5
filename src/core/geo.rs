//! Great-circle distance between ZIP centroids and the ground transit
//! day buckets derived from it.

use crate::domain::model::ZipLocation;
use crate::domain::ports::ZipLookup;
use crate::utils::error::Result;

pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Worst-case bucket, also used when a ZIP has no known coordinates.
pub const MAX_GROUND_DAYS: u32 = 5;

// Upper bounds are inclusive: exactly 150.0 miles is still one day.
const GROUND_DAY_BUCKETS: [(f64, u32); 4] = [(150.0, 1), (450.0, 2), (1000.0, 3), (2000.0, 4)];

pub fn haversine_miles(from: &ZipLocation, to: &ZipLocation) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

pub fn ground_days_for_distance(miles: f64) -> u32 {
    GROUND_DAY_BUCKETS
        .iter()
        .find(|(limit, _)| miles <= *limit)
        .map(|(_, days)| *days)
        .unwrap_or(MAX_GROUND_DAYS)
}

pub fn distance_between<Z: ZipLookup + ?Sized>(zips: &Z, origin: &str, dest: &str) -> Result<f64> {
    let from = zips.locate(origin)?;
    let to = zips.locate(dest)?;
    Ok(haversine_miles(from, to))
}

/// Ground transit days between two ZIPs. Unknown ZIPs fall back to
/// [`MAX_GROUND_DAYS`] so a delivery estimate can always be produced.
pub fn estimate_ground_days<Z: ZipLookup + ?Sized>(zips: &Z, origin: &str, dest: &str) -> u32 {
    match distance_between(zips, origin, dest) {
        Ok(miles) => {
            let days = ground_days_for_distance(miles);
            tracing::debug!(
                "Ground distance {} -> {}: {:.1} mi ({} days)",
                origin,
                dest,
                miles,
                days
            );
            days
        }
        Err(e) => {
            tracing::debug!(
                "No coordinates for {} -> {} ({}), assuming {} days",
                origin,
                dest,
                e,
                MAX_GROUND_DAYS
            );
            MAX_GROUND_DAYS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::reference::ZipDirectory;
    use proptest::prelude::*;

    fn location(zip: &str, latitude: f64, longitude: f64, state: &str) -> ZipLocation {
        ZipLocation {
            zip: zip.to_string(),
            latitude,
            longitude,
            state_code: state.to_string(),
        }
    }

    fn directory() -> ZipDirectory {
        ZipDirectory::from_locations(vec![
            location("53202", 43.0389, -87.9065, "WI"),
            location("60601", 41.8858, -87.6181, "IL"),
            location("90210", 34.0901, -118.4065, "CA"),
        ])
    }

    #[test]
    fn test_bucket_boundaries_are_inclusive() {
        assert_eq!(ground_days_for_distance(0.0), 1);
        assert_eq!(ground_days_for_distance(150.0), 1);
        assert_eq!(ground_days_for_distance(150.0001), 2);
        assert_eq!(ground_days_for_distance(450.0), 2);
        assert_eq!(ground_days_for_distance(1000.0), 3);
        assert_eq!(ground_days_for_distance(2000.0), 4);
        assert_eq!(ground_days_for_distance(2000.0001), 5);
        assert_eq!(ground_days_for_distance(f64::NAN), MAX_GROUND_DAYS);
    }

    #[test]
    fn test_haversine_known_distances() {
        let milwaukee = location("53202", 43.0389, -87.9065, "WI");
        let chicago = location("60601", 41.8858, -87.6181, "IL");
        let beverly_hills = location("90210", 34.0901, -118.4065, "CA");

        let short = haversine_miles(&milwaukee, &chicago);
        assert!((75.0..90.0).contains(&short), "got {}", short);

        let long = haversine_miles(&milwaukee, &beverly_hills);
        assert!((1700.0..1800.0).contains(&long), "got {}", long);

        assert_eq!(haversine_miles(&milwaukee, &milwaukee), 0.0);
    }

    #[test]
    fn test_estimate_ground_days_from_directory() {
        let zips = directory();
        assert_eq!(estimate_ground_days(&zips, "53202", "60601"), 1);
        assert_eq!(estimate_ground_days(&zips, "53202", "90210"), 4);
    }

    #[test]
    fn test_unknown_zip_falls_back_to_max_bucket() {
        let zips = directory();
        assert!(distance_between(&zips, "53202", "99999").is_err());
        assert_eq!(estimate_ground_days(&zips, "53202", "99999"), MAX_GROUND_DAYS);
        assert_eq!(estimate_ground_days(&zips, "00000", "90210"), MAX_GROUND_DAYS);
    }

    proptest! {
        #[test]
        fn prop_bucket_is_monotonic(a in 0.0f64..5000.0, b in 0.0f64..5000.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ground_days_for_distance(near) <= ground_days_for_distance(far));
        }

        #[test]
        fn prop_bucket_stays_in_range(miles in 0.0f64..20000.0) {
            let days = ground_days_for_distance(miles);
            prop_assert!((1..=MAX_GROUND_DAYS).contains(&days));
        }
    }
}
