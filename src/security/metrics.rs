// Per-endpoint query statistics. Constructed in main and shared through
// AppState; nothing here is static, so tests can build their own registry.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
struct EndpointStats {
    total_requests: u64,
    total_duration_ms: u64,
    total_results: u64,
}

#[derive(Debug, Default)]
pub struct QueryStats {
    // BTreeMap keeps /metrics output stable across calls.
    endpoints: Mutex<BTreeMap<String, EndpointStats>>,
}

impl QueryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one handled request for `endpoint`.
    pub fn record(&self, endpoint: &str, duration: Duration) {
        let mut endpoints = self.endpoints.lock().expect("query stats lock poisoned");
        let stats = endpoints.entry(endpoint.to_string()).or_default();
        stats.total_requests += 1;
        stats.total_duration_ms += duration.as_millis() as u64;
    }

    /// Adds produced result rows to `endpoint` (data handlers call this).
    pub fn add_results(&self, endpoint: &str, result_count: u64) {
        let mut endpoints = self.endpoints.lock().expect("query stats lock poisoned");
        endpoints.entry(endpoint.to_string()).or_default().total_results += result_count;
    }

    pub fn average_response_time_ms(&self, endpoint: &str) -> u64 {
        let endpoints = self.endpoints.lock().expect("query stats lock poisoned");
        match endpoints.get(endpoint) {
            Some(s) if s.total_requests > 0 => s.total_duration_ms / s.total_requests,
            _ => 0,
        }
    }

    /// JSON snapshot for the /metrics endpoint.
    pub fn snapshot(&self) -> serde_json::Value {
        let endpoints = self.endpoints.lock().expect("query stats lock poisoned");
        let mut out = serde_json::Map::new();
        for (endpoint, stats) in endpoints.iter() {
            let avg_ms = if stats.total_requests > 0 {
                stats.total_duration_ms / stats.total_requests
            } else {
                0
            };
            out.insert(
                endpoint.clone(),
                serde_json::json!({
                    "total_requests": stats.total_requests,
                    "average_response_time_ms": avg_ms,
                    "total_results": stats.total_results,
                }),
            );
        }
        serde_json::json!({ "endpoints": out })
    }
}
