use crate::error::{error_and_warn_log, Result, SdkError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use validator::Validate;

/// Rate limiter configuration.
///
/// Every caller may issue at most `max_requests` requests in any window of
/// `window_ms` milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RateLimiterConfig {
    #[validate(range(min = 1))]
    pub max_requests: u32,
    #[validate(range(min = 1))]
    pub window_ms: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_ms: 60_000,
        }
    }
}

/// Sliding window rate limiter, keyed by caller.
/// It uses Arc internally so clones of the object
/// are cheap and the windows are shared.
///
/// For each caller we keep the instants of the requests accepted within the
/// last window. A request is refused when that queue is already full, and
/// refused requests do not count against the caller.
/// Callers without any request in the current window are dropped from the
/// map at most one window after their last request.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: Arc<Mutex<Windows>>,
}

#[derive(Default)]
struct Windows {
    callers: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl Windows {
    /// Forget the callers whose last request left the window, once per window.
    fn sweep(&mut self, now: Instant, window: Duration) {
        let due = self
            .last_sweep
            .map_or(true, |last| now.saturating_duration_since(last) >= window);
        if !due {
            return;
        }
        let before = self.callers.len();
        self.callers.retain(|_, accepted| {
            accepted
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < window)
        });
        self.last_sweep = Some(now);
        if self.callers.len() < before {
            tracing::debug!(
                "Dropped {} idle callers from the rate limiter",
                before - self.callers.len()
            );
        }
    }
}

fn expire(accepted: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = accepted.front() {
        if now.saturating_duration_since(*oldest) >= window {
            accepted.pop_front();
        } else {
            break;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

impl RateLimiter {
    /// Create a new rate limiter with some given configuration.
    /// The configuration is expected to be validated by the caller.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(Windows::default())),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Record a request from `caller`, or refuse it if the caller is over its quota.
    pub fn check(&self, caller: &str) -> Result<()> {
        self.check_at(caller, Instant::now())
    }

    /// Same as [`Self::check`] with an explicit clock reading.
    pub fn check_at(&self, caller: &str, now: Instant) -> Result<()> {
        let window = Duration::from_millis(self.config.window_ms);
        // a panic while holding the lock leaves the map consistent
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());
        windows.sweep(now, window);

        let accepted = windows.callers.entry(caller.to_string()).or_default();
        expire(accepted, now, window);
        if accepted.len() >= self.config.max_requests as usize {
            return Err(error_and_warn_log(SdkError::RateLimited {
                caller: caller.to_string(),
                limit: self.config.max_requests,
                window_ms: self.config.window_ms,
            }));
        }
        accepted.push_back(now);
        tracing::debug!(
            "Accepted request {}/{} for {caller}",
            accepted.len(),
            self.config.max_requests
        );
        Ok(())
    }

    /// Forget every recorded request.
    pub fn reset(&self) {
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());
        windows.callers.clear();
        windows.last_sweep = None;
    }
}
