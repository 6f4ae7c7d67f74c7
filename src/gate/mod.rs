//! Request admission gate: path matching plus the axum middleware.

mod middleware;
mod paths;

pub use middleware::{rate_limit_gate, Gate};
pub use paths::PathMatcher;
