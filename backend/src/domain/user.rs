//! Registered accounts as seen by the booking core.
//!
//! Users are owned by the identity system; this crate only reads them to
//! resolve doctors, patients and holders, and to check DNI uniqueness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Smallest accepted DNI.
pub const DNI_MIN: i64 = 1_000_000;
/// Largest accepted DNI.
pub const DNI_MAX: i64 = 99_999_999;

/// Validation failure for [`Dni`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("DNI must be between {DNI_MIN} and {DNI_MAX}, got {value}")]
pub struct DniError {
    /// Rejected input.
    pub value: i64,
}

/// National identity number, unique across users and family members.
///
/// # Examples
/// ```
/// use medibook::domain::Dni;
///
/// assert!(Dni::new(30_123_456).is_ok());
/// assert!(Dni::new(999_999).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Dni(u32);

impl Dni {
    /// Validate and wrap a DNI.
    pub fn new(value: i64) -> Result<Self, DniError> {
        if !(DNI_MIN..=DNI_MAX).contains(&value) {
            return Err(DniError { value });
        }
        u32::try_from(value).map(Self).map_err(|_| DniError { value })
    }

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Dni {
    type Error = DniError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Dni> for i64 {
    fn from(value: Dni) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for Dni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error returned when a stored enum label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label}")]
pub struct UnknownLabel {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected label.
    pub label: String,
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Healthcare professional receiving turns.
    Doctor,
    /// Patient booking turns; may hold family members.
    Patient,
    /// Administrative account.
    Admin,
}

impl UserRole {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "DOCTOR",
            Self::Patient => "PATIENT",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for UserRole {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOCTOR" => Ok(Self::Doctor),
            "PATIENT" => Ok(Self::Patient),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UnknownLabel {
                kind: "user role",
                label: other.to_owned(),
            }),
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Fully enabled.
    Active,
    /// Awaiting approval.
    Pending,
    /// Disabled by an administrator.
    Disabled,
}

impl UserStatus {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Pending => "PENDING",
            Self::Disabled => "DISABLED",
        }
    }
}

impl FromStr for UserStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "PENDING" => Ok(Self::Pending),
            "DISABLED" => Ok(Self::Disabled),
            other => Err(UnknownLabel {
                kind: "user status",
                label: other.to_owned(),
            }),
        }
    }
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// National identity number.
    pub dni: Dni,
    /// Login e-mail, stored lowercased.
    pub email: String,
    /// Name shown to other users.
    pub display_name: String,
    /// Account role.
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
}

impl User {
    /// Whether the account may hold family members and book as a patient.
    #[must_use]
    pub fn is_patient(&self) -> bool {
        self.role == UserRole::Patient
    }
}
