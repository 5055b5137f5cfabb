// JSON rendering for the /data endpoints. Channel statistics render at one
// decimal place; a channel with has_data=false renders null stats and a
// zero count (never zeros posing as data).

use serde_json::{Map, Value, json};

use super::params::format_iso8601;
use crate::models::{AggregateRecord, ChannelStats, Reading};
use crate::reading_repo::DatabaseInfo;

pub(super) fn readings_response(readings: &[Reading]) -> Value {
    json!({
        "readings": readings.iter().map(reading_json).collect::<Vec<_>>(),
        "total_count": readings.len(),
    })
}

pub(super) fn range_response(readings: &[Reading], start: &str, end: &str) -> Value {
    json!({
        "readings": readings.iter().map(reading_json).collect::<Vec<_>>(),
        "start_time": start,
        "end_time": end,
        "total_count": readings.len(),
    })
}

pub(super) fn aggregates_response(
    records: &[AggregateRecord],
    start: &str,
    end: &str,
    interval: &str,
) -> Value {
    json!({
        "aggregates": records.iter().map(aggregate_json).collect::<Vec<_>>(),
        "start_time": start,
        "end_time": end,
        "interval": interval,
        "total_intervals": records.len(),
    })
}

pub(super) fn info_response(info: &DatabaseInfo) -> Value {
    json!({
        "total_records": info.total_records,
        "database_path": info.database_path,
        "earliest_timestamp": info.earliest_timestamp.map(format_iso8601),
        "latest_timestamp": info.latest_timestamp.map(format_iso8601),
        "database_size_bytes": info.database_size_bytes,
        "healthy": info.healthy,
    })
}

fn reading_json(reading: &Reading) -> Value {
    json!({
        "timestamp": format_iso8601(reading.timestamp),
        "co2_ppm": reading.co2_ppm.map(|v| round1(f64::from(v))),
        "temperature_c": reading.temperature_c.map(|v| round1(f64::from(v))),
        "humidity_percent": reading.humidity_percent.map(|v| round1(f64::from(v))),
        "quality_flags": reading.quality_flags,
    })
}

fn aggregate_json(record: &AggregateRecord) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "timestamp".into(),
        Value::String(format_iso8601(record.timestamp)),
    );
    channel_fields(&mut fields, "co2_ppm", &record.co2_ppm);
    channel_fields(&mut fields, "temperature_c", &record.temperature_c);
    channel_fields(&mut fields, "humidity_percent", &record.humidity_percent);
    Value::Object(fields)
}

fn channel_fields(fields: &mut Map<String, Value>, channel: &str, stats: &ChannelStats) {
    let (mean, min, max) = if stats.has_data {
        (
            number(round1(stats.mean)),
            number(round1(f64::from(stats.min))),
            number(round1(f64::from(stats.max))),
        )
    } else {
        (Value::Null, Value::Null, Value::Null)
    };
    fields.insert(format!("{channel}_mean"), mean);
    fields.insert(format!("{channel}_min"), min);
    fields.insert(format!("{channel}_max"), max);
    fields.insert(format!("{channel}_count"), json!(stats.count));
}

fn number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
