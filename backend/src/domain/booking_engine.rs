//! Turn booking service.
//!
//! Every check runs before the single write: the instant must be in the
//! future, the doctor and patient must exist, a named family member must
//! belong to the patient, and the doctor's slot must be free. The storage
//! adapter's slot constraint is the final arbiter for concurrent bookings and
//! its signal maps to the same conflict as the pre-check.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::port_errors::{family_error, turn_error, user_error};
use crate::domain::ports::{
    BadgeEvaluationTrigger, BookingNotifier, CreateTurnRequest, FamilyMemberRepository,
    TurnBookingCommand, TurnPersistenceError, TurnRepository, UserRepository,
};
use crate::domain::{Error, Turn, TurnId, TurnStatus, User, UserId};

/// Repositories the engine reads from and writes to.
pub struct BookingRepositories<U, F, T> {
    /// Doctors and patients.
    pub users: Arc<U>,
    /// Family members, read for ownership checks only.
    pub members: Arc<F>,
    /// Turns.
    pub turns: Arc<T>,
}

/// Service creating turns.
pub struct BookingEngine<U, F, T> {
    users: Arc<U>,
    members: Arc<F>,
    turns: Arc<T>,
    notifier: Arc<dyn BookingNotifier>,
    badges: Arc<dyn BadgeEvaluationTrigger>,
    clock: Arc<dyn Clock>,
}

impl<U, F, T> BookingEngine<U, F, T> {
    /// Create an engine.
    pub fn new(
        repositories: BookingRepositories<U, F, T>,
        notifier: Arc<dyn BookingNotifier>,
        badges: Arc<dyn BadgeEvaluationTrigger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let BookingRepositories {
            users,
            members,
            turns,
        } = repositories;
        Self {
            users,
            members,
            turns,
            notifier,
            badges,
            clock,
        }
    }
}

fn slot_conflict() -> Error {
    Error::conflict("doctor not available at requested time").with_details(json!({
        "code": "slot_taken",
    }))
}

impl<U, F, T> BookingEngine<U, F, T>
where
    U: UserRepository,
    F: FamilyMemberRepository,
    T: TurnRepository,
{
    async fn require_user(&self, id: &UserId, what: &str) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(user_error)?
            .ok_or_else(|| Error::not_found(format!("{what} not found")))
    }

    async fn announce(&self, turn: &Turn) {
        if let Err(error) = self.notifier.booking_created(turn).await {
            warn!(turn_id = %turn.id, %error, "booking notification failed");
        }
        if let Err(error) = self.badges.evaluate(&turn.patient_id).await {
            warn!(patient_id = %turn.patient_id, %error, "badge evaluation trigger failed");
        }
    }
}

#[async_trait]
impl<U, F, T> TurnBookingCommand for BookingEngine<U, F, T>
where
    U: UserRepository,
    F: FamilyMemberRepository,
    T: TurnRepository,
{
    async fn create_turn(&self, request: CreateTurnRequest) -> Result<Turn, Error> {
        let now = self.clock.utc();
        if request.scheduled_at <= now {
            return Err(
                Error::invalid_request("scheduled time must be in the future").with_details(
                    json!({ "field": "scheduledAt", "code": "not_in_future" }),
                ),
            );
        }

        self.require_user(&request.doctor_id, "doctor").await?;
        self.require_user(&request.patient_id, "patient").await?;

        if let Some(member_id) = request.family_member_id {
            let member = self
                .members
                .find_by_id(&member_id)
                .await
                .map_err(family_error)?
                .ok_or_else(|| Error::not_found("family member not found"))?;
            if !member.belongs_to(request.patient_id) {
                return Err(
                    Error::invalid_request("family member does not belong to the patient")
                        .with_details(json!({
                            "field": "familyMemberId",
                            "code": "family_member_not_owned",
                        })),
                );
            }
        }

        let taken = self
            .turns
            .exists_active_for_doctor_at(&request.doctor_id, request.scheduled_at)
            .await
            .map_err(turn_error)?;
        if taken {
            return Err(slot_conflict());
        }

        let turn = Turn {
            id: TurnId::random(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            family_member_id: request.family_member_id,
            scheduled_at: request.scheduled_at,
            motive: request.motive,
            status: TurnStatus::Pending,
            created_at: now,
        };
        self.turns.insert(&turn).await.map_err(|error| match error {
            TurnPersistenceError::SlotTaken => slot_conflict(),
            other => turn_error(other),
        })?;

        info!(
            turn_id = %turn.id,
            doctor_id = %turn.doctor_id,
            patient_id = %turn.patient_id,
            on_behalf_of_family = turn.family_member_id.is_some(),
            scheduled_at = %turn.scheduled_at,
            "turn booked",
        );

        self.announce(&turn).await;
        Ok(turn)
    }
}

#[cfg(test)]
#[path = "booking_engine_tests.rs"]
mod tests;
