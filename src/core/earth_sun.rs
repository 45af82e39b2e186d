//! Earth-Sun distance in astronomical units by day of year

use chrono::{DateTime, Datelike, Utc};

/// (day of year, distance in AU), ascending by day
const EARTH_SUN_DISTANCE: [(u32, f64); 24] = [
    (15, 0.9836),
    (32, 0.9853),
    (46, 0.9878),
    (60, 0.9909),
    (74, 0.9945),
    (91, 0.9993),
    (106, 1.0033),
    (121, 1.0076),
    (135, 1.0109),
    (152, 1.0140),
    (166, 1.0158),
    (182, 1.0167),
    (196, 1.0165),
    (213, 1.0149),
    (227, 1.0128),
    (242, 1.0092),
    (258, 1.0057),
    (274, 1.0011),
    (288, 0.9972),
    (305, 0.9925),
    (319, 0.9892),
    (335, 0.9860),
    (349, 0.9843),
    (365, 0.9833),
];

/// Distance for a 1-based day of year.
///
/// Days on a table entry return it exactly, days between entries are
/// linearly interpolated, days outside the table clamp to the first/last entry.
pub fn earth_sun_distance(day_of_year: u32) -> f64 {
    let (first_day, first) = EARTH_SUN_DISTANCE[0];
    let (last_day, last) = EARTH_SUN_DISTANCE[EARTH_SUN_DISTANCE.len() - 1];
    if day_of_year <= first_day {
        return first;
    }
    if day_of_year >= last_day {
        return last;
    }

    let upper = EARTH_SUN_DISTANCE
        .iter()
        .position(|&(day, _)| day >= day_of_year)
        .unwrap_or(EARTH_SUN_DISTANCE.len() - 1);
    let (day_hi, d_hi) = EARTH_SUN_DISTANCE[upper];
    if day_hi == day_of_year {
        return d_hi;
    }
    let (day_lo, d_lo) = EARTH_SUN_DISTANCE[upper - 1];
    let weight = (day_of_year - day_lo) as f64 / (day_hi - day_lo) as f64;
    d_lo + (d_hi - d_lo) * weight
}

/// Distance on the date of an acquisition
pub fn earth_sun_distance_on(date: &DateTime<Utc>) -> f64 {
    earth_sun_distance(date.ordinal())
}
