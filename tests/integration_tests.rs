// Integration tests: HTTP endpoints end to end against a temp database

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use common::{reading, ts};
use sensord::config::AppConfig;
use sensord::reading_repo::ReadingRepo;
use sensord::routes;
use sensord::security::{QueryStats, RateLimitConfig, RateLimiter};
use tempfile::TempDir;

const TEST_CONFIG: &str = r#"
[server]
port = 8088
host = "0.0.0.0"

[database]
path = "data/test.db"
max_pool_size = 2
flush_rate = 5

[sensor]
sample_interval_ms = 1000

[security]
requests_per_minute = 1000

[monitoring]
stats_log_interval_secs = 60
prune_interval_secs = 3600
flush_interval_secs = 30
"#;

fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

async fn seeded_repo(dir: &TempDir) -> Arc<ReadingRepo> {
    let path = dir.path().join("test.db");
    let repo = ReadingRepo::connect(path.to_str().unwrap(), 2, 7)
        .await
        .unwrap();
    repo.init().await.unwrap();
    // two hours of readings, every 20 minutes
    let mut readings = Vec::new();
    for i in 0..6u32 {
        let t = ts(2026, 1, 15, 10 + i / 3, (i % 3) * 20, 0);
        readings.push(reading(t, 600.0 + i as f32 * 10.0, 21.0, 45.0));
    }
    repo.insert_readings(&readings).await.unwrap();
    Arc::new(repo)
}

async fn test_server_with_config(dir: &TempDir, config: AppConfig) -> TestServer {
    let repo = seeded_repo(dir).await;
    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        requests_per_minute: config.security.requests_per_minute,
        enabled: config.security.rate_limit_enabled,
    }));
    let app = routes::app(repo, rate_limiter, Arc::new(QueryStats::new()), config);
    TestServer::new(app)
}

async fn test_server(dir: &TempDir) -> TestServer {
    test_server_with_config(dir, test_app_config()).await
}

#[tokio::test]
async fn test_version_endpoint() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("sensord"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "HEALTHY");
    assert_eq!(json["operational"], true);
    assert_eq!(json["storage_healthy"], true);
}

#[tokio::test]
async fn test_probe_endpoints() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;

    let alive = server.get("/alive").await;
    alive.assert_status_ok();
    let json: serde_json::Value = alive.json();
    assert_eq!(json["alive"], true);
    assert!(json["uptime_seconds"].is_number());

    let ready = server.get("/ready").await;
    ready.assert_status_ok();
    let json: serde_json::Value = ready.json();
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn test_recent_returns_seeded_readings() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/data/recent").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["total_count"], 6);
    let readings = json["readings"].as_array().unwrap();
    assert_eq!(readings.len(), 6);
    assert_eq!(readings[0]["timestamp"], "2026-01-15T10:00:00Z");
    assert_eq!(readings[0]["co2_ppm"], 600.0);
    assert_eq!(readings[0]["quality_flags"], 7);
}

#[tokio::test]
async fn test_recent_respects_count() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/data/recent").add_query_param("count", "2").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["total_count"], 2);
}

#[tokio::test]
async fn test_recent_rejects_bad_count() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    for bad in ["abc", "0", "-5"] {
        let response = server.get("/data/recent").add_query_param("count", bad).await;
        response.assert_status_bad_request();
        let json: serde_json::Value = response.json();
        assert_eq!(json["error_code"], "INVALID_COUNT", "count={bad}");
        assert_eq!(json["status_code"], 400);
    }
}

#[tokio::test]
async fn test_range_returns_inclusive_window() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/range")
        .add_query_param("start", "2026-01-15T10:00:00Z")
        .add_query_param("end", "2026-01-15T10:40:00Z")
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["total_count"], 3);
    assert_eq!(json["start_time"], "2026-01-15T10:00:00Z");
    assert_eq!(json["end_time"], "2026-01-15T10:40:00Z");
}

#[tokio::test]
async fn test_range_requires_start_and_end() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/range")
        .add_query_param("start", "2026-01-15T10:00:00Z")
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "MISSING_PARAMETER");
}

#[tokio::test]
async fn test_range_rejects_bad_timestamp() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/range")
        .add_query_param("start", "not-a-time")
        .add_query_param("end", "2026-01-15T10:40:00Z")
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "INVALID_TIMESTAMP");
}

#[tokio::test]
async fn test_range_rejects_reversed_range() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/range")
        .add_query_param("start", "2026-01-16T00:00:00Z")
        .add_query_param("end", "2026-01-15T00:00:00Z")
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "INVALID_TIME_RANGE");
}

#[tokio::test]
async fn test_aggregates_hourly() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/aggregates")
        .add_query_param("start", "2026-01-15T10:00:00Z")
        .add_query_param("end", "2026-01-15T11:59:00Z")
        .add_query_param("interval", "1H")
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["interval"], "1H");
    assert_eq!(json["total_intervals"], 2);
    let aggregates = json["aggregates"].as_array().unwrap();
    assert_eq!(aggregates[0]["timestamp"], "2026-01-15T10:00:00Z");
    assert_eq!(aggregates[0]["co2_ppm_count"], 3);
    assert_eq!(aggregates[0]["co2_ppm_mean"], 610.0);
    assert_eq!(aggregates[0]["co2_ppm_min"], 600.0);
    assert_eq!(aggregates[0]["co2_ppm_max"], 620.0);
}

#[tokio::test]
async fn test_aggregates_interval_defaults_to_one_hour() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/aggregates")
        .add_query_param("start", "2026-01-15T10:00:00Z")
        .add_query_param("end", "2026-01-15T11:59:00Z")
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["interval"], "1H");
}

#[tokio::test]
async fn test_aggregates_rejects_bad_interval() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/aggregates")
        .add_query_param("start", "2026-01-15T10:00:00Z")
        .add_query_param("end", "2026-01-15T11:59:00Z")
        .add_query_param("interval", "1X")
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "INVALID_INTERVAL");
    assert!(json["details"].as_str().unwrap().contains("1T"));
}

#[tokio::test]
async fn test_data_info() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/data/info").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["total_records"], 6);
    assert_eq!(json["earliest_timestamp"], "2026-01-15T10:00:00Z");
    assert_eq!(json["latest_timestamp"], "2026-01-15T11:40:00Z");
    assert_eq!(json["healthy"], true);
}

#[tokio::test]
async fn test_metrics_reports_handled_requests() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    server.get("/data/recent").await.assert_status_ok();
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    let recent = &json["endpoints"]["/data/recent"];
    assert_eq!(recent["total_requests"], 1);
    assert_eq!(recent["total_results"], 6);
}

#[tokio::test]
async fn test_unknown_path_returns_404_with_endpoint_list() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.get("/nope").await;
    response.assert_status_not_found();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "ENDPOINT_NOT_FOUND");
    assert!(json["available_endpoints"].as_array().unwrap().len() >= 9);
}

#[tokio::test]
async fn test_post_is_method_not_allowed() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server.post("/health").await;
    assert_eq!(response.status_code(), 405);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_injection_attempt_is_rejected() {
    let dir = TempDir::new().unwrap();
    let server = test_server(&dir).await;
    let response = server
        .get("/data/recent")
        .add_query_param("count", "whoami")
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "INVALID_PARAMETER");
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let dir = TempDir::new().unwrap();
    let mut config = test_app_config();
    config.security.requests_per_minute = 2;
    let server = test_server_with_config(&dir, config).await;

    server.get("/health").await.assert_status_ok();
    server.get("/health").await.assert_status_ok();
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 429);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error_code"], "RATE_LIMIT_EXCEEDED");
    assert!(response.headers().get("retry-after").is_some());
}
