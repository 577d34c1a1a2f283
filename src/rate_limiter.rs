use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::AppError;

/// Fixed-window failure counter, keyed by an arbitrary string.
///
/// Used to throttle failed logins per client address.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// key -> (failures, window start)
    attempts: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_seconds: u64) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            window: Duration::from_secs(window_seconds),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, (u32, Instant)>> {
        // A panic while holding the lock leaves the counters usable.
        self.attempts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns [`AppError::LoginRateLimited`] with the seconds left in the
    /// window once `key` has used up `max_attempts` failures.
    pub fn check_rate_limit(&self, key: &str) -> Result<(), AppError> {
        let attempts = self.entries();

        if let Some((count, started)) = attempts.get(key) {
            let elapsed = started.elapsed();
            if elapsed < self.window && *count >= self.max_attempts {
                let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
                tracing::warn!(key, retry_after, "Login attempts throttled");
                return Err(AppError::LoginRateLimited(retry_after));
            }
        }

        Ok(())
    }

    /// Count a failed attempt for `key`, opening a new window if the last one ran out.
    pub fn record_failure(&self, key: &str) {
        let mut attempts = self.entries();
        let now = Instant::now();

        let entry = attempts.entry(key.to_string()).or_insert((0, now));
        if now.duration_since(entry.1) >= self.window {
            *entry = (0, now);
        }
        entry.0 += 1;
    }

    pub fn remaining(&self, key: &str) -> u32 {
        let attempts = self.entries();
        match attempts.get(key) {
            Some((count, started)) if started.elapsed() < self.window => {
                self.max_attempts.saturating_sub(*count)
            }
            _ => self.max_attempts,
        }
    }

    /// Forget `key`, e.g. after a successful login.
    pub fn reset(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Drop keys whose window has run out. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut attempts = self.entries();
        let before = attempts.len();
        attempts.retain(|_, (_, started)| started.elapsed() < self.window);
        before - attempts.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries().len()
    }
}
