//! Log-only booking side effects.
//!
//! Delivery of e-mails and badge computation live in other services; this
//! deployment records the events as structured log lines so they can be
//! shipped and replayed by the log pipeline.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    BadgeEvaluationError, BadgeEvaluationTrigger, BookingNotificationError, BookingNotifier,
};
use crate::domain::{Turn, UserId};

/// [`BookingNotifier`] emitting a `booking_created` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBookingNotifier;

#[async_trait]
impl BookingNotifier for TracingBookingNotifier {
    async fn booking_created(&self, turn: &Turn) -> Result<(), BookingNotificationError> {
        info!(
            target: "medibook::events",
            event = "booking_created",
            turn_id = %turn.id,
            doctor_id = %turn.doctor_id,
            patient_id = %turn.patient_id,
            scheduled_at = %turn.scheduled_at,
        );
        Ok(())
    }
}

/// [`BadgeEvaluationTrigger`] emitting a `badge_evaluation_requested` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBadgeEvaluationTrigger;

#[async_trait]
impl BadgeEvaluationTrigger for TracingBadgeEvaluationTrigger {
    async fn evaluate(&self, patient_id: &UserId) -> Result<(), BadgeEvaluationError> {
        info!(
            target: "medibook::events",
            event = "badge_evaluation_requested",
            patient_id = %patient_id,
        );
        Ok(())
    }
}
