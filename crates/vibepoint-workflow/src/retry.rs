//! Poll scheduling with optional exponential backoff.
//!
//! The analysis backend gives no completion signal, so the poller asks for
//! suggestions on a schedule. [`PollPolicy`] decides the delay before each
//! attempt and when to give up; [`FailureTracker`] logs failed attempts
//! without letting a flaky backend flood the logs.

use std::time::Duration;
use tracing::{debug, info, warn};
use vibepoint_models::VideoId;

/// Scheduling policy for suggestion polling.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first attempt and base delay between attempts.
    pub interval: Duration,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
    /// Growth factor per attempt. `1.0` keeps a fixed interval.
    pub backoff_factor: f64,
    /// Attempts before giving up.
    pub max_attempts: u32,
    /// Wall-clock budget before giving up.
    pub max_elapsed: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(60),
            backoff_factor: 1.0,
            max_attempts: 90,
            max_elapsed: Duration::from_secs(1200),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy with default caps.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max_interval: interval.max(Duration::from_secs(60)),
            ..Default::default()
        }
    }

    /// Create policy from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let secs = |name: &str, default: Duration| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            interval: secs("VIBEPOINT_POLL_INTERVAL_SECS", defaults.interval),
            max_interval: secs("VIBEPOINT_POLL_MAX_INTERVAL_SECS", defaults.max_interval),
            backoff_factor: std::env::var("VIBEPOINT_POLL_BACKOFF_FACTOR")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|f| f.is_finite() && *f >= 1.0)
                .unwrap_or(defaults.backoff_factor),
            max_attempts: std::env::var("VIBEPOINT_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            max_elapsed: secs("VIBEPOINT_POLL_MAX_ELAPSED_SECS", defaults.max_elapsed),
        }
    }

    /// Set the backoff factor and the delay cap.
    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff_factor = if factor.is_finite() && factor >= 1.0 { factor } else { 1.0 };
        self.max_interval = max_interval;
        self
    }

    /// Set the maximum number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the wall-clock budget.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// Delay before attempt number `attempt` (zero-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if self.backoff_factor <= 1.0 {
            return self.interval;
        }
        let exp = attempt.min(32) as i32;
        let scaled = self.interval.as_secs_f64() * self.backoff_factor.powi(exp);
        let capped = scaled.min(self.max_interval.as_secs_f64());
        Duration::from_secs_f64(capped).max(self.interval.min(self.max_interval))
    }

    /// True once either budget is spent.
    pub fn is_exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        attempts >= self.max_attempts || elapsed >= self.max_elapsed
    }
}

/// Tracks consecutive failed suggestion fetches for one poll.
///
/// The first few failures of a streak are logged with their attempt number;
/// after that the streak is summarized once and then only counted. A later
/// successful fetch (including "not ready") closes the streak and reports
/// how long it lasted.
#[derive(Debug)]
pub struct FailureTracker {
    video_id: VideoId,
    max_logged: u32,
    consecutive: u32,
    streak_start: Option<u32>,
}

impl FailureTracker {
    pub fn new(video_id: VideoId, max_logged: u32) -> Self {
        Self {
            video_id,
            max_logged,
            consecutive: 0,
            streak_start: None,
        }
    }

    /// Record a fetch that reached the backend. Returns the length of the
    /// failure streak it ended.
    pub fn record_success(&mut self, attempt: u32) -> u32 {
        let streak = self.consecutive;
        if self.is_suppressed() {
            info!(
                video_id = %self.video_id,
                attempt,
                failed_attempts = streak,
                first_failed_attempt = self.streak_start,
                "Suggestion fetches recovered"
            );
        }
        self.consecutive = 0;
        self.streak_start = None;
        streak
    }

    /// Record a failed fetch. Returns `true` when the failure was logged.
    pub fn record_failure(&mut self, attempt: u32, error: &str) -> bool {
        self.consecutive += 1;
        let first_failed_attempt = *self.streak_start.get_or_insert(attempt);

        if self.consecutive <= self.max_logged {
            warn!(
                video_id = %self.video_id,
                attempt,
                consecutive = self.consecutive,
                error,
                "Suggestion fetch failed"
            );
            true
        } else {
            if self.consecutive == self.max_logged + 1 {
                warn!(
                    video_id = %self.video_id,
                    attempt,
                    first_failed_attempt,
                    "Suggestion fetch keeps failing, suppressing errors until a fetch succeeds"
                );
            } else {
                debug!(video_id = %self.video_id, attempt, error, "Suggestion fetch failed");
            }
            false
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }

    /// Attempt number that opened the current failure streak.
    pub fn streak_start(&self) -> Option<u32> {
        self.streak_start
    }

    pub fn is_suppressed(&self) -> bool {
        self.consecutive > self.max_logged
    }
}
