//! Health-certificate lookup backed by attended turns.
//!
//! A patient holds a valid certificate when at least one COMPLETED turn in
//! which they are the patient of record was scheduled within the last 365
//! days.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;

use crate::domain::Error;
use crate::domain::port_errors::{turn_error, user_error};
use crate::domain::ports::{HealthCertificateLookup, TurnRepository, UserRepository};

/// Certificate validity window, in days.
pub const CERTIFICATE_VALIDITY_DAYS: i64 = 365;

/// [`HealthCertificateLookup`] reading users and turns.
#[derive(Clone)]
pub struct CompletedTurnCertificateLookup<U, T> {
    users: Arc<U>,
    turns: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, T> CompletedTurnCertificateLookup<U, T> {
    /// Create the lookup.
    pub fn new(users: Arc<U>, turns: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            turns,
            clock,
        }
    }
}

#[async_trait]
impl<U, T> HealthCertificateLookup for CompletedTurnCertificateLookup<U, T>
where
    U: UserRepository,
    T: TurnRepository,
{
    async fn has_certificate_within_last_year(&self, email: &str) -> Result<bool, Error> {
        let Some(user) = self.users.find_by_email(email).await.map_err(user_error)? else {
            return Ok(false);
        };
        let since = self.clock.utc() - TimeDelta::days(CERTIFICATE_VALIDITY_DAYS);
        self.turns
            .has_completed_turn_since(&user.id, since)
            .await
            .map_err(turn_error)
    }
}
