//! Outbound adapters implementing domain ports for infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for local runs and tests
//! - **notifications**: log-backed booking side effects
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules beyond the uniqueness constraints the schema
//! enforces.

pub mod memory;
pub mod notifications;
pub mod persistence;
