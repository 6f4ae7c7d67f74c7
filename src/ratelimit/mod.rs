//! Rate limiting logic and counter state management.

mod counter;
mod key;
mod limiter;
mod store;

pub use counter::WindowState;
pub use key::{ClientIp, KeyExtractor, FALLBACK_KEY};
pub use limiter::{
    RateLimitDecision, RateLimitProfile, RateLimiter, HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET,
};
pub use store::{CounterStore, MemoryStore};
