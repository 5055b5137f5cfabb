// API error responses. Every failure renders the same JSON shape:
// {error, details, error_code, timestamp, status_code}.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::params::format_iso8601;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: String,
    retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn bad_request(
        code: &'static str,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
            details: details.into(),
            retry_after_secs: None,
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: "RATE_LIMIT_EXCEEDED",
            message: "Rate limit exceeded".into(),
            details: "Too many requests; retry after the indicated delay".into(),
            retry_after_secs: Some(retry_after_secs.max(1)),
        }
    }

    pub fn service_unavailable(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "STORAGE_UNAVAILABLE",
            message: message.into(),
            details: details.into(),
            retry_after_secs: None,
        }
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "Internal server error".into(),
            details: details.into(),
            retry_after_secs: None,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::warn!(error = %err, "request failed");
        Self::internal("An unexpected error occurred while processing the request")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "details": self.details,
            "error_code": self.code,
            "timestamp": format_iso8601(chrono::Utc::now()),
            "status_code": self.status.as_u16(),
        });
        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

/// 404 fallback listing the available endpoints.
pub(super) async fn not_found(uri: axum::http::Uri) -> Response {
    let body = serde_json::json!({
        "error": "Requested endpoint not found",
        "error_code": "ENDPOINT_NOT_FOUND",
        "details": format!("The requested path '{}' is not available", uri.path()),
        "available_endpoints": [
            {"path": "/health", "method": "GET", "description": "Basic health status"},
            {"path": "/metrics", "method": "GET", "description": "Query statistics"},
            {"path": "/ready", "method": "GET", "description": "Readiness probe"},
            {"path": "/alive", "method": "GET", "description": "Liveness probe"},
            {"path": "/version", "method": "GET", "description": "Service name and version"},
            {"path": "/data/recent", "method": "GET", "description": "Recent sensor readings", "parameters": "?count=N (optional, default=100)"},
            {"path": "/data/range", "method": "GET", "description": "Sensor readings in time range", "parameters": "?start=TIME&end=TIME (required, ISO 8601 format)"},
            {"path": "/data/aggregates", "method": "GET", "description": "Aggregated statistics", "parameters": "?start=TIME&end=TIME&interval=INTERVAL (start/end required, interval optional)"},
            {"path": "/data/info", "method": "GET", "description": "Database information and statistics"},
        ],
        "timestamp": format_iso8601(chrono::Utc::now()),
        "status_code": 404,
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// 405 for known paths hit with a method other than GET.
pub(super) async fn method_not_allowed() -> Response {
    let body = serde_json::json!({
        "error": "Method not allowed",
        "error_code": "METHOD_NOT_ALLOWED",
        "details": "Only GET is supported",
        "timestamp": format_iso8601(chrono::Utc::now()),
        "status_code": 405,
    });
    (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}
