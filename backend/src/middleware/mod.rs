//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, namely trace
//! correlation and general rate limiting.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::{RateLimit, spawn_window_sweeper};
pub use trace::Trace;
