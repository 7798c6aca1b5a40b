//! Driving port for booking turns.
//!
//! HTTP handlers build a [`CreateTurnRequest`] from validated input and call
//! [`TurnBookingCommand::create_turn`]; the domain performs every
//! existence, ownership and availability check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, FamilyMemberId, Motive, Turn, UserId};

/// Request to book a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurnRequest {
    /// Attending doctor.
    pub doctor_id: UserId,
    /// Patient of record (payer and holder).
    pub patient_id: UserId,
    /// Appointment instant; must be strictly in the future.
    pub scheduled_at: DateTime<Utc>,
    /// Optional reason.
    pub motive: Option<Motive>,
    /// Beneficiary, when booking for a family member of the patient.
    pub family_member_id: Option<FamilyMemberId>,
}

/// Driving port for turn creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TurnBookingCommand: Send + Sync {
    /// Validate and persist a turn with status PENDING.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the instant is not in the future or the
    ///   family member belongs to another patient.
    /// - `not_found` when the doctor, patient or family member is missing.
    /// - `conflict` when the doctor already has a turn at that instant.
    async fn create_turn(&self, request: CreateTurnRequest) -> Result<Turn, Error>;
}
