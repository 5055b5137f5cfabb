// GET /data/* handlers: recent readings, time-range queries, interval
// aggregates, database info.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::error::ApiError;
use super::{AppState, params, render};
use crate::aggregate::{self, Interval};

const DEFAULT_RECENT_COUNT: u32 = 100;

/// GET /data/recent?count=N
pub(super) async fn recent_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    ensure_storage(&state).await?;
    let max = state.config.security.max_query_results;
    let count = match query.get("count") {
        Some(raw) => params::parse_count(raw, max).ok_or_else(|| {
            ApiError::bad_request(
                "INVALID_COUNT",
                "Invalid count parameter",
                format!("count must be an integer between 1 and {max}"),
            )
        })?,
        None => DEFAULT_RECENT_COUNT.min(max),
    };
    let readings = state.reading_repo.get_recent_readings(count).await?;
    state
        .query_stats
        .add_results("/data/recent", readings.len() as u64);
    Ok(Json(render::readings_response(&readings)))
}

/// GET /data/range?start=TIME&end=TIME
pub(super) async fn range_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    ensure_storage(&state).await?;
    let (start, end) = parse_time_range(&query, state.config.security.max_range_hours)?;
    let readings = state.reading_repo.get_readings_in_range(start, end).await?;
    state
        .query_stats
        .add_results("/data/range", readings.len() as u64);
    Ok(Json(render::range_response(
        &readings,
        &params::format_iso8601(start),
        &params::format_iso8601(end),
    )))
}

/// GET /data/aggregates?start=TIME&end=TIME&interval=TOKEN
pub(super) async fn aggregates_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    ensure_storage(&state).await?;
    let (start, end) = parse_time_range(&query, state.config.security.max_range_hours)?;
    let token = query.get("interval").map_or("1H", String::as_str);
    let Some(interval) = Interval::parse(token) else {
        return Err(ApiError::bad_request(
            "INVALID_INTERVAL",
            "Invalid interval parameter",
            format!(
                "interval must be a number followed by a unit, e.g. {}",
                supported_tokens()
            ),
        ));
    };
    let readings = state.reading_repo.get_readings_in_range(start, end).await?;
    let records = aggregate::aggregate(&readings, interval);
    state
        .query_stats
        .add_results("/data/aggregates", records.len() as u64);
    Ok(Json(render::aggregates_response(
        &records,
        &params::format_iso8601(start),
        &params::format_iso8601(end),
        token,
    )))
}

/// GET /data/info
pub(super) async fn info_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let info = state.reading_repo.database_info().await?;
    state.query_stats.add_results("/data/info", 1);
    Ok(Json(render::info_response(&info)))
}

async fn ensure_storage(state: &AppState) -> Result<(), ApiError> {
    if state.reading_repo.is_healthy().await {
        Ok(())
    } else {
        Err(ApiError::service_unavailable(
            "Storage unavailable",
            "The readings database is not responding",
        ))
    }
}

/// Both `start` and `end` are required, ISO 8601 UTC with a trailing 'Z'.
/// The range must be ordered, span at most `max_range_hours`, and not reach
/// more than a day into the future.
fn parse_time_range(
    query: &HashMap<String, String>,
    max_range_hours: i64,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let (Some(raw_start), Some(raw_end)) = (query.get("start"), query.get("end")) else {
        return Err(ApiError::bad_request(
            "MISSING_PARAMETER",
            "Missing required parameter",
            "Both 'start' and 'end' are required in ISO 8601 format (e.g. 2026-01-15T00:00:00Z)",
        ));
    };
    let Some(start) = params::parse_iso8601_utc(raw_start) else {
        return Err(invalid_timestamp("start", raw_start));
    };
    let Some(end) = params::parse_iso8601_utc(raw_end) else {
        return Err(invalid_timestamp("end", raw_end));
    };
    if start > end {
        return Err(ApiError::bad_request(
            "INVALID_TIME_RANGE",
            "Invalid time range",
            "'start' must not be after 'end'",
        ));
    }
    if end - start > Duration::hours(max_range_hours) {
        return Err(ApiError::bad_request(
            "INVALID_TIME_RANGE",
            "Time range too large",
            format!("The requested range exceeds the maximum of {max_range_hours} hours"),
        ));
    }
    if end > Utc::now() + Duration::hours(24) {
        return Err(ApiError::bad_request(
            "INVALID_TIME_RANGE",
            "Invalid time range",
            "'end' is more than 24 hours in the future",
        ));
    }
    Ok((start, end))
}

fn invalid_timestamp(name: &str, value: &str) -> ApiError {
    ApiError::bad_request(
        "INVALID_TIMESTAMP",
        format!("Invalid '{name}' timestamp"),
        format!("'{value}' is not a valid ISO 8601 UTC timestamp (expected e.g. 2026-01-15T12:30:00Z)"),
    )
}

/// Short comma separated sample of supported interval tokens for error text.
fn supported_tokens() -> String {
    Interval::supported_formats()
        .iter()
        .take(5)
        .filter_map(|entry| entry.split_whitespace().next())
        .collect::<Vec<_>>()
        .join(", ")
}
