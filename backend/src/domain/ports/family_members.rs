//! Driving ports for managing a holder's family members.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Error, FamilyMember, FamilyMemberDraft, FamilyMemberId, User, UserId};

/// Mutations on a holder's family members.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FamilyMembersCommand: Send + Sync {
    /// Register a new member under `holder_id`.
    ///
    /// # Errors
    ///
    /// `not_found` when the holder is missing, `conflict` when the DNI is
    /// already used by a user or another member.
    async fn create(
        &self,
        holder_id: &UserId,
        draft: FamilyMemberDraft,
    ) -> Result<FamilyMember, Error>;

    /// Replace every mutable field of a member owned by `holder_id`.
    ///
    /// # Errors
    ///
    /// `not_found` when the member is missing or owned by someone else,
    /// `conflict` when a changed DNI collides.
    async fn update(
        &self,
        holder_id: &UserId,
        member_id: &FamilyMemberId,
        draft: FamilyMemberDraft,
    ) -> Result<FamilyMember, Error>;
}

/// Reads over family members.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FamilyMembersQuery: Send + Sync {
    /// Resolve the caller as a holder.
    ///
    /// # Errors
    ///
    /// `not_found` when the account is missing, `forbidden` when it is not a
    /// patient.
    async fn require_holder(&self, caller: &UserId) -> Result<User, Error>;

    /// Members registered by one holder.
    async fn list_by_holder(&self, holder_id: &UserId) -> Result<Vec<FamilyMember>, Error>;

    /// Members grouped by holder. Holders without members are absent from the
    /// map.
    async fn list_by_holders(
        &self,
        holder_ids: &[UserId],
    ) -> Result<HashMap<UserId, Vec<FamilyMember>>, Error>;
}
