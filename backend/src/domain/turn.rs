//! Booked appointments between a doctor and a patient.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FamilyMemberId, TurnId, UnknownLabel, UserId};

/// Longest accepted motive, in characters.
pub const MOTIVE_MAX: usize = 500;

/// Lifecycle status of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnStatus {
    /// Booked, awaiting confirmation.
    Pending,
    /// Confirmed by the doctor.
    Confirmed,
    /// Cancelled; frees the doctor's slot.
    Cancelled,
    /// Attended.
    Completed,
    /// The patient did not attend.
    NoShow,
}

impl TurnStatus {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// Whether the turn still occupies the doctor's slot.
    #[must_use]
    pub const fn occupies_slot(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl FromStr for TurnStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            "NO_SHOW" => Ok(Self::NoShow),
            other => Err(UnknownLabel {
                kind: "turn status",
                label: other.to_owned(),
            }),
        }
    }
}

/// Motive exceeded [`MOTIVE_MAX`] characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("motive must be at most {MOTIVE_MAX} characters")]
pub struct MotiveTooLong;

/// Free-text reason for the appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Motive(String);

impl Motive {
    /// Validate and wrap a motive.
    pub fn new(value: impl Into<String>) -> Result<Self, MotiveTooLong> {
        let value = value.into();
        if value.chars().count() > MOTIVE_MAX {
            return Err(MotiveTooLong);
        }
        Ok(Self(value))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Motive {
    type Error = MotiveTooLong;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Motive> for String {
    fn from(value: Motive) -> Self {
        value.0
    }
}

impl fmt::Display for Motive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted appointment.
///
/// `patient_id` is the holder of record; `family_member_id`, when present,
/// names the beneficiary and always belongs to that patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Stable identifier.
    pub id: TurnId,
    /// Attending doctor.
    pub doctor_id: UserId,
    /// Patient of record.
    pub patient_id: UserId,
    /// Beneficiary when booking on behalf of a family member.
    pub family_member_id: Option<FamilyMemberId>,
    /// Appointment instant.
    pub scheduled_at: DateTime<Utc>,
    /// Optional reason.
    pub motive: Option<Motive>,
    /// Lifecycle status.
    pub status: TurnStatus,
    /// When the turn was booked.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TurnStatus::Pending, true)]
    #[case(TurnStatus::Confirmed, true)]
    #[case(TurnStatus::Completed, true)]
    #[case(TurnStatus::NoShow, true)]
    #[case(TurnStatus::Cancelled, false)]
    fn only_cancelled_frees_the_slot(#[case] status: TurnStatus, #[case] occupies: bool) {
        assert_eq!(status.occupies_slot(), occupies);
        assert_eq!(status.as_str().parse::<TurnStatus>(), Ok(status));
    }

    #[rstest]
    fn motive_length_is_bounded() {
        assert!(Motive::new("x".repeat(MOTIVE_MAX)).is_ok());
        assert_eq!(Motive::new("x".repeat(MOTIVE_MAX + 1)), Err(MotiveTooLong));
    }

    #[rstest]
    fn no_show_serialises_with_underscore() {
        let value = serde_json::to_value(TurnStatus::NoShow).expect("serialise");
        assert_eq!(value, serde_json::json!("NO_SHOW"));
    }
}
