//! Family member registry.
//!
//! Implements the family driving ports. A DNI must be unique across users and
//! family members: the registry checks both sets before writing, and the
//! family table's unique constraint backs the check for concurrent writers.
//! A user registered with the same DNI between the pre-check and the family
//! insert is not caught, because the two tables do not share a constraint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::port_errors::{family_error, user_error};
use crate::domain::ports::{
    FamilyMemberPersistenceError, FamilyMemberRepository, FamilyMembersCommand,
    FamilyMembersQuery, UserRepository,
};
use crate::domain::{
    Dni, Error, ErrorCode, FamilyMember, FamilyMemberDraft, FamilyMemberId, User, UserId,
};

/// Service owning family member records.
#[derive(Clone)]
pub struct FamilyRegistry<U, F> {
    users: Arc<U>,
    members: Arc<F>,
}

impl<U, F> FamilyRegistry<U, F> {
    /// Create a registry over the given repositories.
    pub fn new(users: Arc<U>, members: Arc<F>) -> Self {
        Self { users, members }
    }
}

fn dni_conflict(message: &str, dni: Dni) -> Error {
    Error::conflict(message).with_details(json!({
        "field": "dni",
        "code": "duplicate_dni",
        "value": dni.value(),
    }))
}

fn member_not_found() -> Error {
    Error::not_found("Familiar no encontrado")
}

impl<U, F> FamilyRegistry<U, F>
where
    U: UserRepository,
    F: FamilyMemberRepository,
{
    async fn ensure_dni_available(&self, dni: Dni) -> Result<(), Error> {
        if self.users.exists_by_dni(dni).await.map_err(user_error)? {
            return Err(dni_conflict(
                "El DNI ya pertenece a un usuario registrado",
                dni,
            ));
        }
        if self.members.exists_by_dni(dni).await.map_err(family_error)? {
            return Err(dni_conflict(
                "El DNI ya pertenece a un familiar registrado",
                dni,
            ));
        }
        Ok(())
    }

    /// Translate a failed member write. A storage-level DNI collision is
    /// looked up again so the conflict names the set that now holds it.
    async fn write_error(&self, error: FamilyMemberPersistenceError, dni: Dni) -> Error {
        if !matches!(error, FamilyMemberPersistenceError::DuplicateDni { .. }) {
            return family_error(error);
        }
        match self.ensure_dni_available(dni).await {
            Err(conflict) if conflict.code() == ErrorCode::Conflict => conflict,
            _ => dni_conflict("El DNI ya pertenece a un familiar registrado", dni),
        }
    }

    async fn owned_member(
        &self,
        holder_id: &UserId,
        member_id: &FamilyMemberId,
    ) -> Result<FamilyMember, Error> {
        let member = self
            .members
            .find_by_id(member_id)
            .await
            .map_err(family_error)?
            .ok_or_else(member_not_found)?;
        // Another holder's member is reported as missing.
        if !member.belongs_to(*holder_id) {
            return Err(member_not_found());
        }
        Ok(member)
    }
}

#[async_trait]
impl<U, F> FamilyMembersCommand for FamilyRegistry<U, F>
where
    U: UserRepository,
    F: FamilyMemberRepository,
{
    async fn create(
        &self,
        holder_id: &UserId,
        draft: FamilyMemberDraft,
    ) -> Result<FamilyMember, Error> {
        self.users
            .find_by_id(holder_id)
            .await
            .map_err(user_error)?
            .ok_or_else(|| Error::not_found("Usuario titular no encontrado"))?;

        let dni = draft.dni;
        self.ensure_dni_available(dni).await?;

        let member = FamilyMember::from_draft(FamilyMemberId::random(), *holder_id, draft);
        if let Err(error) = self.members.insert(&member).await {
            return Err(self.write_error(error, dni).await);
        }

        info!(
            holder_id = %holder_id,
            family_member_id = %member.id,
            relationship = member.relationship.as_str(),
            "family member registered",
        );
        Ok(member)
    }

    async fn update(
        &self,
        holder_id: &UserId,
        member_id: &FamilyMemberId,
        draft: FamilyMemberDraft,
    ) -> Result<FamilyMember, Error> {
        let existing = self.owned_member(holder_id, member_id).await?;

        let dni = draft.dni;
        if existing.dni != dni {
            self.ensure_dni_available(dni).await?;
        }

        let updated = existing.apply(draft);
        if let Err(error) = self.members.update(&updated).await {
            return Err(self.write_error(error, dni).await);
        }

        info!(
            holder_id = %holder_id,
            family_member_id = %updated.id,
            "family member updated",
        );
        Ok(updated)
    }
}

#[async_trait]
impl<U, F> FamilyMembersQuery for FamilyRegistry<U, F>
where
    U: UserRepository,
    F: FamilyMemberRepository,
{
    async fn require_holder(&self, caller: &UserId) -> Result<User, Error> {
        let user = self
            .users
            .find_by_id(caller)
            .await
            .map_err(user_error)?
            .ok_or_else(|| Error::not_found("Usuario titular no encontrado"))?;
        if !user.is_patient() {
            return Err(Error::forbidden(
                "Solo los pacientes pueden gestionar su grupo familiar",
            ));
        }
        Ok(user)
    }

    async fn list_by_holder(&self, holder_id: &UserId) -> Result<Vec<FamilyMember>, Error> {
        self.members
            .list_by_holder(holder_id)
            .await
            .map_err(family_error)
    }

    async fn list_by_holders(
        &self,
        holder_ids: &[UserId],
    ) -> Result<HashMap<UserId, Vec<FamilyMember>>, Error> {
        if holder_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let members = self
            .members
            .list_by_holders(holder_ids)
            .await
            .map_err(family_error)?;
        let mut grouped: HashMap<UserId, Vec<FamilyMember>> = HashMap::new();
        for member in members {
            grouped.entry(member.holder_id).or_default().push(member);
        }
        Ok(grouped)
    }
}

#[cfg(test)]
#[path = "family_registry_tests.rs"]
mod tests;
