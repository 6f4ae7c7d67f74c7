//! Quotagate - IP-based rate limiting gate for HTTP APIs
//!
//! This crate implements a request-admission layer that sits in front of a
//! set of routes and decides, per client IP, whether each request is within
//! quota. It uses a fixed-window counter over an injectable store: simple
//! and cheap, at the documented cost that a client can burst up to twice
//! the limit across a window boundary. Counters are process-local, so with
//! N instances the effective limit is N times the configured one.

pub mod config;
pub mod error;
pub mod gate;
pub mod ratelimit;
