//! Best-effort collaborators notified after a turn is booked.
//!
//! Failures from these ports are logged by the booking engine and never
//! undo or fail a booking.

use async_trait::async_trait;

use crate::domain::{Turn, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while announcing a booking.
    pub enum BookingNotificationError {
        /// The downstream channel refused or failed the delivery.
        Delivery { message: String } => "booking notification failed: {message}",
    }
}

define_port_error! {
    /// Errors raised while scheduling badge evaluation.
    pub enum BadgeEvaluationError {
        /// The evaluation could not be scheduled.
        Trigger { message: String } => "badge evaluation trigger failed: {message}",
    }
}

/// Announces newly created turns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    /// Called once per successfully persisted turn.
    async fn booking_created(&self, turn: &Turn) -> Result<(), BookingNotificationError>;
}

/// Schedules recomputation of a patient's achievement badges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeEvaluationTrigger: Send + Sync {
    /// Request an evaluation for `patient_id`.
    async fn evaluate(&self, patient_id: &UserId) -> Result<(), BadgeEvaluationError>;
}
