//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.
//!
//! Uniqueness rules live in the schema (`backend/migrations`) and unique
//! violations are decoded by constraint name into the port error variants the
//! domain understands.

mod diesel_error_mapping;
mod diesel_family_member_repository;
mod diesel_turn_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
mod schema;

pub use diesel_family_member_repository::DieselFamilyMemberRepository;
pub use diesel_turn_repository::DieselTurnRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
