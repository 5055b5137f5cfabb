// Fixed-window rate limiter keyed by client IP.
// Lock scope is one map access per call; nothing blocking runs under it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);
const IDLE_CUTOFF: Duration = Duration::from_secs(60 * 60);
const CLEANUP_THRESHOLD: usize = 1000;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub enabled: bool,
}

struct ClientWindow {
    count: u32,
    window_start: Instant,
    last_request: Instant,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, ClientWindow>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a request against `client` and reports whether it is allowed.
    pub fn check(&self, client: &str) -> bool {
        if !self.config.enabled {
            return true;
        }
        let now = Instant::now();
        let mut clients = self.clients.lock().expect("rate limiter lock poisoned");

        let window = clients
            .entry(client.to_string())
            .or_insert_with(|| ClientWindow {
                count: 0,
                window_start: now,
                last_request: now,
            });

        if now.duration_since(window.window_start) >= WINDOW {
            window.count = 0;
            window.window_start = now;
        }

        if window.count >= self.config.requests_per_minute {
            return false;
        }
        window.count += 1;
        window.last_request = now;

        if clients.len() > CLEANUP_THRESHOLD {
            clients.retain(|_, w| now.duration_since(w.last_request) < IDLE_CUTOFF);
        }
        true
    }

    /// Requests left for `client` in its current window.
    pub fn remaining(&self, client: &str) -> u32 {
        let clients = self.clients.lock().expect("rate limiter lock poisoned");
        match clients.get(client) {
            Some(w) if w.window_start.elapsed() < WINDOW => {
                self.config.requests_per_minute.saturating_sub(w.count)
            }
            _ => self.config.requests_per_minute,
        }
    }

    /// Time until `client`'s window resets. Zero when no window is active.
    pub fn reset_after(&self, client: &str) -> Duration {
        let clients = self.clients.lock().expect("rate limiter lock poisoned");
        match clients.get(client) {
            Some(w) => WINDOW.saturating_sub(w.window_start.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Clears all windows (for tests).
    pub fn reset(&self) {
        self.clients
            .lock()
            .expect("rate limiter lock poisoned")
            .clear();
    }
}
