//! Port abstraction for reading registered accounts.
use async_trait::async_trait;

use crate::domain::{Dni, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Read-only access to accounts owned by the identity system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Whether any user already carries `dni`.
    async fn exists_by_dni(&self, dni: Dni) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by login e-mail (expected lowercased).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;
}
