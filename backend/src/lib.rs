//! MediBook booking service.
//!
//! Books medical appointments ("turns") for patients and their registered
//! family members, and throttles both the public API and the partner
//! certificate lookup with fixed-window rate limiters.
//!
//! - [`domain`]: entities, services and ports.
//! - [`inbound`]: Actix handlers and request validation.
//! - [`outbound`]: Diesel, in-memory and log-backed adapters.
//! - [`middleware`]: trace correlation and general rate limiting.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{RateLimit, Trace};
