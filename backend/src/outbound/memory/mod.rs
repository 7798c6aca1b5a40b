//! In-process storage implementing every repository port.
//!
//! Used when no database URL is configured and by integration tests. The
//! store enforces the same uniqueness rules as the PostgreSQL schema: family
//! member DNIs are unique, and a doctor holds at most one non-cancelled turn
//! per instant.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    FamilyMemberPersistenceError, FamilyMemberRepository, TurnPersistenceError, TurnRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Dni, FamilyMember, FamilyMemberId, Turn, TurnId, TurnStatus, User, UserId};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    members: Vec<FamilyMember>,
    turns: Vec<Turn>,
}

impl Tables {
    fn slot_taken(&self, candidate: &Turn) -> bool {
        candidate.status.occupies_slot()
            && self.turns.iter().any(|turn| {
                turn.id != candidate.id
                    && turn.doctor_id == candidate.doctor_id
                    && turn.scheduled_at == candidate.scheduled_at
                    && turn.status.occupies_slot()
            })
    }

    fn member_dni_taken(&self, dni: Dni, except: Option<FamilyMemberId>) -> bool {
        self.members
            .iter()
            .any(|member| member.dni == dni && Some(member.id) != except)
    }
}

fn sorted(mut members: Vec<FamilyMember>) -> Vec<FamilyMember> {
    members.sort_by(|a, b| {
        (a.surname.as_str(), a.name.as_str()).cmp(&(b.surname.as_str(), b.name.as_str()))
    });
    members
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account, replacing any account with the same id.
    pub async fn seed_user(&self, user: User) {
        let mut tables = self.tables.write().await;
        tables.users.retain(|existing| existing.id != user.id);
        tables.users.push(user);
    }

    /// Store a turn as-is, bypassing booking rules.
    ///
    /// # Errors
    ///
    /// Returns [`TurnPersistenceError::SlotTaken`] when the slot is occupied.
    pub async fn seed_turn(&self, turn: Turn) -> Result<(), TurnPersistenceError> {
        TurnRepository::insert(self, &turn).await
    }

    /// Change the status of a stored turn. Returns `false` if it is unknown.
    pub async fn set_turn_status(&self, id: TurnId, status: TurnStatus) -> bool {
        let mut tables = self.tables.write().await;
        match tables.turns.iter_mut().find(|turn| turn.id == id) {
            Some(turn) => {
                turn.status = status;
                true
            }
            None => false,
        }
    }

    /// Every stored turn, in insertion order.
    pub async fn turns(&self) -> Vec<Turn> {
        self.tables.read().await.turns.clone()
    }

    /// Every stored family member, in insertion order.
    pub async fn family_members(&self) -> Vec<FamilyMember> {
        self.tables.read().await.members.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == *id).cloned())
    }

    async fn exists_by_dni(&self, dni: Dni) -> Result<bool, UserPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|user| user.dni == dni))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl FamilyMemberRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &FamilyMemberId,
    ) -> Result<Option<FamilyMember>, FamilyMemberPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.members.iter().find(|member| member.id == *id).cloned())
    }

    async fn exists_by_dni(&self, dni: Dni) -> Result<bool, FamilyMemberPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.member_dni_taken(dni, None))
    }

    async fn list_by_holder(
        &self,
        holder_id: &UserId,
    ) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables
                .members
                .iter()
                .filter(|member| member.holder_id == *holder_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_holders(
        &self,
        holder_ids: &[UserId],
    ) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables
                .members
                .iter()
                .filter(|member| holder_ids.contains(&member.holder_id))
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, member: &FamilyMember) -> Result<(), FamilyMemberPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.member_dni_taken(member.dni, None) {
            return Err(FamilyMemberPersistenceError::duplicate_dni(member.dni.value()));
        }
        tables.members.push(member.clone());
        Ok(())
    }

    async fn update(&self, member: &FamilyMember) -> Result<(), FamilyMemberPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.member_dni_taken(member.dni, Some(member.id)) {
            return Err(FamilyMemberPersistenceError::duplicate_dni(member.dni.value()));
        }
        let Some(slot) = tables.members.iter_mut().find(|stored| stored.id == member.id) else {
            return Err(FamilyMemberPersistenceError::query(format!(
                "family member {} not found",
                member.id
            )));
        };
        *slot = member.clone();
        Ok(())
    }
}

#[async_trait]
impl TurnRepository for InMemoryStore {
    async fn exists_active_for_doctor_at(
        &self,
        doctor_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, TurnPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.turns.iter().any(|turn| {
            turn.doctor_id == *doctor_id && turn.scheduled_at == at && turn.status.occupies_slot()
        }))
    }

    async fn insert(&self, turn: &Turn) -> Result<(), TurnPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.slot_taken(turn) {
            return Err(TurnPersistenceError::slot_taken());
        }
        tables.turns.push(turn.clone());
        Ok(())
    }

    async fn has_completed_turn_since(
        &self,
        patient_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<bool, TurnPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.turns.iter().any(|turn| {
            turn.patient_id == *patient_id
                && turn.status == TurnStatus::Completed
                && turn.scheduled_at >= since
        }))
    }
}

#[cfg(test)]
mod tests;
