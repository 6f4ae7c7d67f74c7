//! Core rate limiter implementation.
//!
//! The limiter implements a fixed-window counter: each key accumulates a
//! request count until its window's reset time passes, after which the count
//! starts over. The algorithm is deliberately simple; its documented
//! tradeoff is that a client can burst up to twice the configured limit
//! across a window boundary. Counters are held by an injected
//! [`CounterStore`], so tests and future distributed deployments can swap
//! the backend without touching decision logic.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::store::CounterStore;
use crate::error::{QuotagateError, Result};

/// Quota ceiling for the window, as configured.
pub const HEADER_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
/// Requests left in the current window.
pub const HEADER_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
/// When the window resets, as Unix epoch seconds.
pub const HEADER_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_requests() -> u64 {
    100
}

fn default_message() -> String {
    "Too many requests, please try again later.".to_string()
}

/// Immutable rate limit configuration for one limiter instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitProfile {
    /// Duration of the counting window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Requests admitted per key per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    /// Body text returned with a 429 rejection.
    #[serde(default = "default_message")]
    pub message: String,
}

impl Default for RateLimitProfile {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            message: default_message(),
        }
    }
}

impl RateLimitProfile {
    /// Reject profiles that would make the limiter meaningless. A broken
    /// profile is fatal at startup, before the gate is installed.
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(QuotagateError::Config(
                "rate limit window_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(QuotagateError::Config(
                "rate limit max_requests must be greater than zero".to_string(),
            ));
        }
        // Values past i64::MAX would wrap negative when converted to a
        // signed millisecond duration.
        if self.window_ms > i64::MAX as u64 {
            return Err(QuotagateError::Config(
                "rate limit window_ms is too large".to_string(),
            ));
        }
        Ok(())
    }

    /// The counting window as a duration.
    pub fn window(&self) -> Duration {
        Duration::milliseconds(self.window_ms as i64)
    }
}

/// The outcome of evaluating one request against a key's quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request should be admitted.
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u64,
    /// Configured limit, echoed for header rendering.
    pub limit: u64,
    /// Absolute time at which the key's quota replenishes.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Attach the conventional quota headers. `X-RateLimit-Reset` carries
    /// the reset time as Unix epoch seconds.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(HEADER_LIMIT, HeaderValue::from(self.limit));
        headers.insert(HEADER_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(HEADER_RESET, HeaderValue::from(self.reset_at.timestamp()));
    }

    /// Whole seconds until the quota replenishes, for `Retry-After`.
    /// Rounded up so a client that waits the advertised time lands in the
    /// next window.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0);
        (millis + 999) / 1000
    }
}

/// Fixed-window rate limiter over an injected counter store.
///
/// Decisions for a single key are applied in arrival order within one
/// process; no cross-process coordination is attempted.
pub struct RateLimiter {
    profile: RateLimitProfile,
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    /// Create a limiter, failing if the profile is invalid.
    pub fn new(profile: RateLimitProfile, store: Arc<dyn CounterStore>) -> Result<Self> {
        profile.validate()?;
        Ok(Self { profile, store })
    }

    /// Evaluate a request for `key` at the current time.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now()).await
    }

    /// Evaluate a request for `key` as of `now`.
    ///
    /// Never fails: a store error is absorbed into an allow decision
    /// (fail open) so the limiter can't cause an availability outage.
    pub async fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let max = self.profile.max_requests;

        let state = match self.store.incr(key, self.profile.window(), now).await {
            Ok(state) => state,
            Err(e) => {
                warn!(key = %key, error = %e, "Counter store failed, admitting request");
                return RateLimitDecision {
                    allowed: true,
                    remaining: max,
                    limit: max,
                    reset_at: now + self.profile.window(),
                };
            }
        };

        trace!(
            key = %key,
            count = state.count,
            limit = max,
            "Evaluated rate limit"
        );

        if state.count > max {
            RateLimitDecision {
                allowed: false,
                remaining: 0,
                limit: max,
                reset_at: state.reset_at,
            }
        } else {
            RateLimitDecision {
                allowed: true,
                remaining: max - state.count,
                limit: max,
                reset_at: state.reset_at,
            }
        }
    }

    /// The rejection message configured for this limiter.
    pub fn message(&self) -> &str {
        &self.profile.message
    }
}
