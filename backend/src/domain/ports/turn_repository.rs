//! Port abstraction for turn persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Turn, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by turn repository adapters.
    pub enum TurnPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "turn repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "turn repository query failed: {message}",
        /// Another non-cancelled turn already holds the doctor's slot.
        SlotTaken => "doctor slot already booked",
    }
}

/// Storage for turns.
///
/// Adapters must reject a second non-cancelled turn for the same doctor and
/// instant with [`TurnPersistenceError::SlotTaken`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TurnRepository: Send + Sync {
    /// Whether a non-cancelled turn exists for `doctor_id` at exactly `at`.
    async fn exists_active_for_doctor_at(
        &self,
        doctor_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, TurnPersistenceError>;

    /// Persist a new turn.
    async fn insert(&self, turn: &Turn) -> Result<(), TurnPersistenceError>;

    /// Whether `patient_id` has a COMPLETED turn scheduled at or after `since`.
    async fn has_completed_turn_since(
        &self,
        patient_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<bool, TurnPersistenceError>;
}
