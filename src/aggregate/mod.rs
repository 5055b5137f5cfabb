// Interval aggregation: bucket time-ordered readings into calendar-aligned
// windows and reduce each bucket to per-channel count/mean/min/max.
//
// Callers must supply readings sorted ascending by timestamp; this module
// does not verify or re-sort (documented precondition).

mod interval;

pub use interval::Interval;

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

use crate::models::{AggregateRecord, ChannelStats, Reading};

/// Aggregates readings at the interval described by `token`.
/// An unparseable token yields an empty vec, not an error; callers that need
/// to surface a user-facing error check `Interval::parse` themselves.
pub fn aggregate_by_interval(readings: &[Reading], token: &str) -> Vec<AggregateRecord> {
    match Interval::parse(token) {
        Some(interval) => aggregate(readings, interval),
        None => Vec::new(),
    }
}

/// Aggregates readings at a raw minute duration. Zero or negative minutes
/// yield an empty vec, mirroring `aggregate_by_interval` on a bad token.
pub fn aggregate_by_minutes(readings: &[Reading], minutes: i64) -> Vec<AggregateRecord> {
    match Interval::from_minutes(minutes) {
        Some(interval) => aggregate(readings, interval),
        None => Vec::new(),
    }
}

/// Aggregates readings with a pre-validated interval. One record per
/// generated bucket, ascending by bucket start, empty buckets included.
pub fn aggregate(readings: &[Reading], interval: Interval) -> Vec<AggregateRecord> {
    let Some(first) = readings.first() else {
        return Vec::new();
    };
    let Some(last) = readings.last() else {
        return Vec::new();
    };

    let start = align_to_interval(first.timestamp, interval);
    let end = last.timestamp;

    // The generated ordered list drives output order; the grouping map is
    // only a lookup table (hash iteration order is never observable here).
    let buckets: Vec<DateTime<Utc>> = bucket_starts(start, end, interval).collect();
    let grouped = group_by_interval(readings, &buckets, interval);

    buckets
        .iter()
        .map(|&bucket| match grouped.get(&bucket.timestamp_millis()) {
            Some(members) if !members.is_empty() => reduce_bucket(members, bucket),
            _ => AggregateRecord::empty(bucket),
        })
        .collect()
}

/// Start of the bucket containing `ts`.
///
/// Intervals of a day or longer align to the start of the UTC day; hour-scale
/// intervals truncate the hour-of-day to a multiple of the interval's hours;
/// sub-hour intervals truncate the minute-of-hour. Seconds and sub-second
/// components are always zeroed.
///
/// The hour/minute truncation is local to each day/hour: a 5-hour interval
/// realigns to hour 0 at every midnight, so some days end with a short
/// bucket. That restart-at-midnight behavior is kept for compatibility with
/// the existing response format.
pub fn align_to_interval(ts: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    let minutes = interval.minutes();
    let (hour, minute) = if minutes >= 1440 {
        (0, 0)
    } else if minutes >= 60 {
        let step_hours = (minutes / 60) as u32;
        ((ts.hour() / step_hours) * step_hours, 0)
    } else {
        let step_minutes = minutes as u32;
        (ts.hour(), (ts.minute() / step_minutes) * step_minutes)
    };
    let aligned = ts
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .expect("truncated hour/minute are always in range");
    Utc.from_utc_datetime(&aligned)
}

/// Lazy sequence of bucket starts: `start`, `start + d`, ... while `<= end`.
/// Empty when `start > end`. Clone to restart.
#[derive(Debug, Clone)]
pub struct BucketStarts {
    current: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
}

impl Iterator for BucketStarts {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        if self.current > self.end {
            return None;
        }
        let item = self.current;
        self.current += self.step;
        Some(item)
    }
}

pub fn bucket_starts(start: DateTime<Utc>, end: DateTime<Utc>, interval: Interval) -> BucketStarts {
    BucketStarts {
        current: start,
        end,
        step: Duration::minutes(interval.minutes()),
    }
}

/// Groups readings under the bucket their aligned timestamp names, keyed by
/// bucket-start millis. Every generated bucket gets an entry, empty or not.
/// A reading whose aligned start matches no bucket (clock skew) is dropped.
fn group_by_interval<'a>(
    readings: &'a [Reading],
    buckets: &[DateTime<Utc>],
    interval: Interval,
) -> HashMap<i64, Vec<&'a Reading>> {
    let mut grouped: HashMap<i64, Vec<&Reading>> = HashMap::with_capacity(buckets.len());
    for bucket in buckets {
        grouped.insert(bucket.timestamp_millis(), Vec::new());
    }
    for reading in readings {
        let key = align_to_interval(reading.timestamp, interval).timestamp_millis();
        if let Some(members) = grouped.get_mut(&key) {
            members.push(reading);
        }
    }
    grouped
}

fn reduce_bucket(members: &[&Reading], bucket_start: DateTime<Utc>) -> AggregateRecord {
    AggregateRecord {
        timestamp: bucket_start,
        co2_ppm: channel_stats(members.iter().map(|r| r.co2_ppm)),
        temperature_c: channel_stats(members.iter().map(|r| r.temperature_c)),
        humidity_percent: channel_stats(members.iter().map(|r| r.humidity_percent)),
    }
}

/// Reduces one channel's optional values to count/mean/min/max.
/// Absent and non-finite values are both "no observation". The mean is
/// accumulated in f64 to bound error over large buckets.
pub fn channel_stats<I>(values: I) -> ChannelStats
where
    I: IntoIterator<Item = Option<f32>>,
{
    let mut count: u32 = 0;
    let mut sum: f64 = 0.0;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;

    for value in values.into_iter().flatten() {
        if !value.is_finite() {
            continue;
        }
        count += 1;
        sum += f64::from(value);
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return ChannelStats::no_data();
    }
    ChannelStats {
        has_data: true,
        count,
        mean: sum / f64::from(count),
        min,
        max,
    }
}
