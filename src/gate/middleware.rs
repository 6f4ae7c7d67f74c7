//! Request gate middleware.
//!
//! Sits in front of the router: excluded or unmatched paths pass through
//! untouched, everything else goes through the limiter. Admitted requests
//! get quota headers on their response; rejected ones get a 429 with the
//! configured message and a `Retry-After`. A limiter-internal fault is
//! never allowed to surface as a 5xx from the gate itself.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::warn;

use super::paths::PathMatcher;
use crate::ratelimit::{KeyExtractor, RateLimitDecision, RateLimiter};

/// Everything the middleware needs to evaluate one request, shared across
/// the router as application state.
pub struct Gate {
    limiter: RateLimiter,
    matcher: PathMatcher,
    keys: Box<dyn KeyExtractor>,
}

impl Gate {
    pub fn new(limiter: RateLimiter, matcher: PathMatcher, keys: Box<dyn KeyExtractor>) -> Self {
        Self {
            limiter,
            matcher,
            keys,
        }
    }
}

/// Axum middleware entry point. Install with
/// `axum::middleware::from_fn_with_state(gate, rate_limit_gate)`.
pub async fn rate_limit_gate(
    State(gate): State<Arc<Gate>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !gate.matcher.should_limit(path) {
        return next.run(request).await;
    }

    let key = gate.keys.key(request.headers());
    let decision = gate.limiter.check(&key).await;

    if !decision.allowed {
        warn!(
            path = %request.uri().path(),
            method = %request.method(),
            key = %key,
            remaining = decision.remaining,
            reset_at = %decision.reset_at,
            "Rate limit exceeded, rejecting request"
        );
        return rejection(&gate, &decision);
    }

    let mut response = next.run(request).await;
    decision.apply_headers(response.headers_mut());
    response
}

fn rejection(gate: &Gate, decision: &RateLimitDecision) -> Response {
    let body = Json(serde_json::json!({
        "error": gate.limiter.message(),
    }));

    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    decision.apply_headers(response.headers_mut());
    response.headers_mut().insert(
        "retry-after",
        HeaderValue::from(decision.retry_after_secs(Utc::now())),
    );
    response
}
