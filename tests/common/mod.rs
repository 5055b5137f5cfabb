// Shared test helpers

use chrono::{DateTime, TimeZone, Utc};
use sensord::models::Reading;

#[allow(dead_code)]
pub fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// A reading with all three channels present and marked valid.
#[allow(dead_code)]
pub fn reading(timestamp: DateTime<Utc>, co2: f32, temp: f32, humidity: f32) -> Reading {
    let mut r = Reading::new(timestamp);
    r.co2_ppm = Some(co2);
    r.temperature_c = Some(temp);
    r.humidity_percent = Some(humidity);
    r.set_co2_valid(true);
    r.set_temperature_valid(true);
    r.set_humidity_valid(true);
    r
}
