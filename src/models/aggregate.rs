// Aggregate record: one row per time bucket, three channels reduced
// independently. Empty buckets carry has_data=false, never zeros.

use chrono::{DateTime, Utc};

/// Reduced statistics for one channel within one bucket.
///
/// When `has_data` is false, `count` is 0 and mean/min/max are meaningless.
/// When true, `count >= 1` and `min <= mean <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub has_data: bool,
    pub count: u32,
    pub mean: f64,
    pub min: f32,
    pub max: f32,
}

impl ChannelStats {
    /// The "no observations" value for an empty or all-invalid channel.
    pub const fn no_data() -> Self {
        Self {
            has_data: false,
            count: 0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self::no_data()
    }
}

/// One bucket's statistics across all channels, keyed by the bucket start.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub timestamp: DateTime<Utc>,
    pub co2_ppm: ChannelStats,
    pub temperature_c: ChannelStats,
    pub humidity_percent: ChannelStats,
}

impl AggregateRecord {
    /// A record for a bucket that received no readings.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            co2_ppm: ChannelStats::no_data(),
            temperature_c: ChannelStats::no_data(),
            humidity_percent: ChannelStats::no_data(),
        }
    }
}
