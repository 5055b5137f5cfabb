// HTTP routes: health/probe endpoints plus the /data query surface.
// Every request passes the security guard (rate limit + query screening)
// before reaching a handler.

mod data;
mod error;
mod http;
pub mod params;
mod render;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::reading_repo::ReadingRepo;
use crate::security::validate::validate_query;
use crate::security::{QueryStats, RateLimiter};
use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub reading_repo: Arc<ReadingRepo>,
    pub rate_limiter: Arc<RateLimiter>,
    pub query_stats: Arc<QueryStats>,
    pub started_at: Instant,
    pub config: AppConfig,
}

pub fn app(
    reading_repo: Arc<ReadingRepo>,
    rate_limiter: Arc<RateLimiter>,
    query_stats: Arc<QueryStats>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        reading_repo,
        rate_limiter,
        query_stats,
        started_at: Instant::now(),
        config,
    };
    Router::new()
        .route("/health", get(http::health_handler)) // GET /health
        .route("/alive", get(http::alive_handler)) // GET /alive
        .route("/ready", get(http::ready_handler)) // GET /ready
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/version", get(http::version_handler)) // GET /version
        .route("/data/recent", get(data::recent_handler)) // GET /data/recent
        .route("/data/range", get(data::range_handler)) // GET /data/range
        .route("/data/aggregates", get(data::aggregates_handler)) // GET /data/aggregates
        .route("/data/info", get(data::info_handler)) // GET /data/info
        .fallback(error::not_found)
        .method_not_allowed_fallback(error::method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_guard,
        ))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Runs before every handler: per-client rate limit, query string screening,
/// and response time accounting for /metrics.
async fn security_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&request);
    if !state.rate_limiter.check(&ip) {
        tracing::warn!(client = %ip, "rate limit exceeded");
        let retry_after = state.rate_limiter.reset_after(&ip).as_secs();
        return Err(ApiError::rate_limited(retry_after));
    }
    if let Some(query) = request.uri().query()
        && let Err(e) = validate_query(query)
    {
        tracing::warn!(client = %ip, reason = %e.message, "rejected query string");
        return Err(ApiError::bad_request(
            "INVALID_PARAMETER",
            e.message,
            e.details,
        ));
    }
    let endpoint = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    state.query_stats.record(&endpoint, started.elapsed());
    Ok(response)
}

/// Client identity for rate limiting: first x-forwarded-for entry when the
/// server sits behind a proxy, else the peer address.
fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
        && !first.trim().is_empty()
    {
        return first.trim().to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}
