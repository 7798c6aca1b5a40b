//! Port abstraction for family member persistence.
use async_trait::async_trait;

use crate::domain::{Dni, FamilyMember, FamilyMemberId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by family member repository adapters.
    pub enum FamilyMemberPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "family member repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "family member repository query failed: {message}",
        /// The storage uniqueness constraint on DNI rejected the write.
        DuplicateDni { dni: u32 } => "family member with DNI {dni} already exists",
    }
}

/// Storage for family members.
///
/// Adapters must enforce DNI uniqueness within the family table and report a
/// violation as [`FamilyMemberPersistenceError::DuplicateDni`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FamilyMemberRepository: Send + Sync {
    /// Fetch a member by identifier.
    async fn find_by_id(
        &self,
        id: &FamilyMemberId,
    ) -> Result<Option<FamilyMember>, FamilyMemberPersistenceError>;

    /// Whether any family member already carries `dni`.
    async fn exists_by_dni(&self, dni: Dni) -> Result<bool, FamilyMemberPersistenceError>;

    /// Members registered by one holder.
    async fn list_by_holder(
        &self,
        holder_id: &UserId,
    ) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError>;

    /// Members registered by any of `holder_ids`, in one round trip.
    async fn list_by_holders(
        &self,
        holder_ids: &[UserId],
    ) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError>;

    /// Insert a new member.
    async fn insert(&self, member: &FamilyMember) -> Result<(), FamilyMemberPersistenceError>;

    /// Overwrite an existing member's mutable fields.
    async fn update(&self, member: &FamilyMember) -> Result<(), FamilyMemberPersistenceError>;
}
