use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::config::settings::RateLimitConfig;
use crate::error::RelayError;
use crate::server::AppState;
use crate::server::util::client_key;

// 超过该数量时顺带清理过期窗口
const PRUNE_THRESHOLD: usize = 1024;

const LIMITED_PREFIX: &str = "/api/";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(cfg.window_secs.max(1)),
            max_requests: cfg.max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, key: &str) -> Result<(), RelayError> {
        self.check_at(key, Instant::now()).await
    }

    /// Counts one request for `key` at `now`; errors once the window is full.
    pub async fn check_at(&self, key: &str, now: Instant) -> Result<(), RelayError> {
        let mut windows = self.windows.lock().await;

        if windows.len() > PRUNE_THRESHOLD {
            let span = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < span);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            let remaining = self.window.saturating_sub(elapsed);
            return Err(RelayError::RateLimited {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }
        entry.count += 1;
        Ok(())
    }
}

/// Applies the limiter to every path under `/api/`, routed or not.
pub async fn limit_requests(
    State(app_state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if !req.uri().path().starts_with(LIMITED_PREFIX) {
        return next.run(req).await;
    }

    let key = client_key(&req);
    match app_state.rate_limiter.check(&key).await {
        Ok(()) => next.run(req).await,
        Err(err) => {
            tracing::warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");
            err.into_response()
        }
    }
}
