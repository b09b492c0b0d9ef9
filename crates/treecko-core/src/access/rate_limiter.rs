//! Sliding-window rate limiting per user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::UserId;
use crate::clock::{Clock, SystemClock};

/// Rate limit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed per window.
    pub max_requests: usize,

    /// Window length in seconds.
    pub window_seconds: u64,

    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_seconds: 60,
            enabled: true,
        }
    }
}

/// Tracks request timestamps per user and refuses requests over the limit.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    requests: Mutex<HashMap<UserId, Vec<NaiveDateTime>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// `None` when the window is too long for chrono to represent.
    fn window(&self) -> Option<TimeDelta> {
        i64::try_from(self.config.window_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
    }

    /// Drop timestamps that fell out of the window and return the live ones.
    fn prune<'a>(
        &self,
        requests: &'a mut HashMap<UserId, Vec<NaiveDateTime>>,
        user_id: UserId,
        now: NaiveDateTime,
    ) -> &'a mut Vec<NaiveDateTime> {
        // An unrepresentable window start keeps every timestamp.
        let window_start = self.window().and_then(|w| now.checked_sub_signed(w));
        let timestamps = requests.entry(user_id).or_default();
        if let Some(window_start) = window_start {
            timestamps.retain(|ts| *ts > window_start);
        }
        timestamps
    }

    /// Whether `user_id` has used up the current window.
    pub fn is_rate_limited(&self, user_id: UserId) -> bool {
        if !self.config.enabled {
            return false;
        }
        let now = self.clock.now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        self.prune(&mut requests, user_id, now).len() >= self.config.max_requests
    }

    /// Record a request from `user_id`.
    pub fn record_request(&self, user_id: UserId) {
        if !self.config.enabled {
            return;
        }
        let now = self.clock.now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = requests.entry(user_id).or_default();
        timestamps.push(now);
        debug!(user_id, request_count = timestamps.len(), "Recorded request");
    }

    /// Check the limit and record the request when it is allowed.
    ///
    /// Returns `false` when the user is rate limited.
    pub fn check_and_record(&self, user_id: UserId) -> bool {
        if !self.config.enabled {
            return true;
        }
        let now = self.clock.now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = self.prune(&mut requests, user_id, now);

        if timestamps.len() >= self.config.max_requests {
            warn!(
                user_id,
                max_requests = self.config.max_requests,
                window_seconds = self.config.window_seconds,
                "User rate limited"
            );
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Requests left in the current window.
    pub fn remaining_requests(&self, user_id: UserId) -> usize {
        if !self.config.enabled {
            return self.config.max_requests;
        }
        let now = self.clock.now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let used = self.prune(&mut requests, user_id, now).len();
        self.config.max_requests.saturating_sub(used)
    }

    /// Seconds until the user may send another request; zero when not limited.
    pub fn retry_after(&self, user_id: UserId) -> f64 {
        if !self.config.enabled {
            return 0.0;
        }
        let now = self.clock.now();
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = self.prune(&mut requests, user_id, now);

        if timestamps.len() < self.config.max_requests {
            return 0.0;
        }

        match timestamps.iter().min() {
            Some(oldest) => {
                let elapsed = (now - *oldest).num_milliseconds() as f64 / 1000.0;
                (self.config.window_seconds as f64 - elapsed).max(0.0)
            }
            None => 0.0,
        }
    }

    pub fn reset_user(&self, user_id: UserId) {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        if requests.remove(&user_id).is_some() {
            debug!(user_id, "Reset rate limit");
        }
    }

    pub fn reset_all(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        debug!("Reset all rate limits");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn limiter(max_requests: usize, window_seconds: u64) -> (RateLimiter, Arc<FixedClock>) {
        let start = NaiveDate::from_ymd_opt(2024, 11, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let config = RateLimitConfig {
            max_requests,
            window_seconds,
            enabled: true,
        };
        (RateLimiter::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_allows_up_to_limit() {
        let (limiter, _) = limiter(3, 60);
        assert!(limiter.check_and_record(1));
        assert!(limiter.check_and_record(1));
        assert!(limiter.check_and_record(1));
        assert!(!limiter.check_and_record(1));
        assert!(limiter.is_rate_limited(1));
    }

    #[test]
    fn test_users_are_independent() {
        let (limiter, _) = limiter(1, 60);
        assert!(limiter.check_and_record(1));
        assert!(!limiter.check_and_record(1));
        assert!(limiter.check_and_record(2));
    }

    #[test]
    fn test_window_slides() {
        let (limiter, clock) = limiter(2, 60);
        assert!(limiter.check_and_record(7));
        clock.advance(TimeDelta::seconds(30));
        assert!(limiter.check_and_record(7));
        assert!(!limiter.check_and_record(7));

        // First request expires after exactly 60 seconds.
        clock.advance(TimeDelta::seconds(30));
        assert_eq!(limiter.remaining_requests(7), 1);
        assert!(limiter.check_and_record(7));
    }

    #[test]
    fn test_retry_after() {
        let (limiter, clock) = limiter(1, 60);
        assert_eq!(limiter.retry_after(5), 0.0);
        limiter.record_request(5);
        clock.advance(TimeDelta::seconds(20));
        assert_eq!(limiter.retry_after(5), 40.0);
    }

    #[test]
    fn test_disabled_always_allows() {
        let config = RateLimitConfig {
            max_requests: 1,
            window_seconds: 60,
            enabled: false,
        };
        let limiter = RateLimiter::new(config);
        for _ in 0..5 {
            assert!(limiter.check_and_record(1));
        }
        assert_eq!(limiter.remaining_requests(1), 1);
        assert_eq!(limiter.retry_after(1), 0.0);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        for window_seconds in [10_000_000_000_000, u64::MAX] {
            let (limiter, clock) = limiter(1, window_seconds);
            assert!(limiter.check_and_record(1));
            clock.advance(TimeDelta::days(365));
            assert!(!limiter.check_and_record(1));
            assert_eq!(limiter.remaining_requests(1), 0);
            assert!(limiter.retry_after(1) > 0.0);
        }
    }

    #[test]
    fn test_reset() {
        let (limiter, _) = limiter(1, 60);
        limiter.record_request(1);
        limiter.record_request(2);
        limiter.reset_user(1);
        assert!(!limiter.is_rate_limited(1));
        assert!(limiter.is_rate_limited(2));
        limiter.reset_all();
        assert!(!limiter.is_rate_limited(2));
    }
}
