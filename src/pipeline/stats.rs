use crate::types::track::{
    ActivityStats, LocationPoint, CALORIES_PER_MILE, EARTH_RADIUS_MILES, FEET_PER_METER,
    MPH_PER_MPS, SECONDS_PER_HOUR,
};

/// Summarizes a track. `duration_seconds` is the active time measured by the
/// caller; it is never derived from point timestamps. Negative durations are
/// treated as zero.
pub fn compute_stats(points: &[LocationPoint], duration_seconds: f64) -> ActivityStats {
    let duration = duration_seconds.max(0.0);

    if points.len() < 2 {
        return ActivityStats {
            duration,
            ..ActivityStats::default()
        };
    }

    let mut distance = 0.0;
    let mut elevation_gain = 0.0;
    let mut elevation_loss = 0.0;
    let mut elevation_segments = 0;

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        distance += haversine_miles(prev.latitude, prev.longitude, curr.latitude, curr.longitude);

        if let (Some(prev_alt), Some(curr_alt)) = (prev.altitude, curr.altitude) {
            elevation_segments += 1;
            let change_ft = (curr_alt - prev_alt) * FEET_PER_METER;
            if change_ft > 0.0 {
                elevation_gain += change_ft;
            } else if change_ft < 0.0 {
                elevation_loss += -change_ft;
            }
        }
    }

    let max_speed = points
        .iter()
        .filter_map(|p| p.speed)
        .map(|mps| mps * MPH_PER_MPS)
        .fold(0.0, f64::max);

    let avg_speed = if duration > 0.0 {
        (distance / duration) * SECONDS_PER_HOUR
    } else {
        0.0
    };

    ActivityStats {
        distance,
        duration,
        elevation_gain,
        elevation_loss,
        max_speed,
        avg_speed,
        calories: calories_for(distance),
        elevation_segments,
    }
}

fn calories_for(distance_miles: f64) -> u64 {
    let estimate = (distance_miles * CALORIES_PER_MILE).floor();
    if estimate.is_finite() && estimate > 0.0 {
        estimate as u64
    } else {
        0
    }
}

/// Great-circle distance on a spherical Earth, in miles.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn point(lat: f64, lon: f64, secs: i64) -> LocationPoint {
        LocationPoint::new(lat, lon, at(secs))
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    fn trail() -> Vec<LocationPoint> {
        vec![
            point(40.000, -105.000, 0).with_altitude(1600.0).with_speed(1.2),
            point(40.002, -105.001, 60).with_altitude(1612.0).with_speed(1.5),
            point(40.004, -105.003, 120).with_speed(1.1),
            point(40.005, -105.004, 180).with_altitude(1605.0).with_speed(2.0),
            point(40.007, -105.004, 240).with_altitude(1601.5),
        ]
    }

    #[test]
    fn empty_and_single_point_tracks_are_zero() {
        let empty = compute_stats(&[], 600.0);
        assert_eq!(
            empty,
            ActivityStats {
                duration: 600.0,
                ..ActivityStats::default()
            }
        );

        let single = [point(40.0, -105.0, 0).with_altitude(1000.0).with_speed(5.0)];
        let stats = compute_stats(&single, 600.0);
        assert_eq!(stats.distance, 0.0);
        assert_eq!(stats.elevation_gain, 0.0);
        assert_eq!(stats.elevation_loss, 0.0);
        assert_eq!(stats.max_speed, 0.0);
        assert_eq!(stats.avg_speed, 0.0);
        assert_eq!(stats.calories, 0);
    }

    #[test]
    fn identical_coordinates_add_no_distance() {
        let points = [
            point(12.5, 33.1, 0).with_altitude(10.0).with_speed(0.0),
            point(12.5, 33.1, 10).with_altitude(50.0).with_speed(9.0),
        ];
        assert_eq!(compute_stats(&points, 10.0).distance, 0.0);
    }

    #[test]
    fn one_degree_of_latitude_at_equator() {
        // R = 3959 mi gives 69.097 mi per degree, not the commonly quoted 69.17.
        for lon in [0.0, 45.0, -120.0] {
            let points = [point(0.0, lon, 0), point(1.0, lon, 60)];
            assert_close(compute_stats(&points, 60.0).distance, 69.097, 0.001);
        }
    }

    #[test]
    fn climb_without_horizontal_movement() {
        let points = [
            point(0.0, 0.0, 0).with_altitude(100.0),
            point(0.0, 0.0, 60).with_altitude(130.0),
        ];
        let stats = compute_stats(&points, 60.0);
        assert_eq!(stats.distance, 0.0);
        assert_close(stats.elevation_gain, 98.4252, 1e-9);
        assert_eq!(stats.elevation_loss, 0.0);
        assert_eq!(stats.avg_speed, 0.0);
        assert_eq!(stats.calories, 0);
        assert_eq!(stats.elevation_segments, 1);
    }

    #[test]
    fn short_northbound_leg() {
        let points = [point(40.0, -105.0, 0), point(40.01, -105.0, 60)];
        let stats = compute_stats(&points, 60.0);
        assert_close(stats.distance, 0.691, 0.001);
        // 0.691 mi in one minute is 41.46 mph with R = 3959 mi.
        assert_close(stats.avg_speed, 41.46, 0.2);
        assert_eq!(stats.calories, 69);
        assert_eq!(stats.elevation_segments, 0);
    }

    #[test]
    fn altitude_gaps_are_skipped_not_flattened() {
        let stats = compute_stats(&trail(), 240.0);
        // 1600 -> 1612 gains, 1612 -> (none) -> 1605 skipped, 1605 -> 1601.5 loses.
        assert_close(stats.elevation_gain, 12.0 * FEET_PER_METER, 1e-9);
        assert_close(stats.elevation_loss, 3.5 * FEET_PER_METER, 1e-9);
        assert_eq!(stats.elevation_segments, 2);
    }

    #[test]
    fn max_speed_ignores_points_without_speed() {
        let stats = compute_stats(&trail(), 240.0);
        assert_close(stats.max_speed, 2.0 * MPH_PER_MPS, 1e-12);
    }

    #[test]
    fn appending_never_decreases_cumulative_totals() {
        let points = trail();
        let mut previous = compute_stats(&points[..2], 100.0);
        for end in 3..=points.len() {
            let next = compute_stats(&points[..end], 100.0);
            assert!(next.distance >= previous.distance);
            assert!(next.elevation_gain >= previous.elevation_gain);
            assert!(next.elevation_loss >= previous.elevation_loss);
            assert!(next.max_speed >= previous.max_speed);
            previous = next;
        }
    }

    #[test]
    fn avg_speed_scales_with_distance() {
        let near = [point(0.0, 0.0, 0), point(0.01, 0.0, 60)];
        let far = [point(0.0, 0.0, 0), point(0.01, 0.0, 30), point(0.02, 0.0, 60)];
        let near_stats = compute_stats(&near, 60.0);
        let far_stats = compute_stats(&far, 60.0);
        assert_close(far_stats.avg_speed, near_stats.avg_speed * 2.0, 1e-9);
    }

    #[test]
    fn negative_duration_is_clamped() {
        let points = [point(40.0, -105.0, 0), point(40.01, -105.0, 60)];
        let stats = compute_stats(&points, -30.0);
        assert_eq!(stats.duration, 0.0);
        assert_eq!(stats.avg_speed, 0.0);
        assert!(stats.distance > 0.0);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let points = trail();
        let first = compute_stats(&points, 240.0);
        let second = compute_stats(&points, 240.0);
        assert_eq!(first.distance.to_bits(), second.distance.to_bits());
        assert_eq!(first.avg_speed.to_bits(), second.avg_speed.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_coordinates_do_not_panic() {
        let points = [point(500.0, -900.0, 0), point(f64::NAN, 0.0, 1)];
        let stats = compute_stats(&points, 1.0);
        assert_eq!(stats.calories, 0);
    }
}
