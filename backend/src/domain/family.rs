//! Family members registered under a patient holder.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{Dni, FamilyMemberId, UnknownLabel, UserId};

/// Minimum length for names and surnames, in characters.
pub const NAME_MIN: usize = 2;
/// Maximum length for names and surnames, in characters.
pub const NAME_MAX: usize = 50;

/// Validation errors for family member fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FamilyValidationError {
    /// Name shorter or longer than allowed.
    #[error("name must be between {NAME_MIN} and {NAME_MAX} characters")]
    NameLength,
    /// Name contains characters other than letters and spaces.
    #[error("name may only contain letters and spaces")]
    NameCharacters,
    /// Name is made only of whitespace.
    #[error("name must contain at least one letter")]
    NameBlank,
    /// Birthdate is today or in the future.
    #[error("birthdate must be in the past")]
    BirthdateNotInPast,
}

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_RE.get_or_init(|| {
        // Length is enforced separately.
        let pattern = r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("name regex failed to compile: {error}"))
    })
}

/// Given name or surname restricted to letters (Spanish accents included)
/// and spaces.
///
/// # Examples
/// ```
/// use medibook::domain::PersonName;
///
/// assert!(PersonName::new("María José").is_ok());
/// assert!(PersonName::new("R2").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and wrap a name.
    pub fn new(value: impl Into<String>) -> Result<Self, FamilyValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&length) {
            return Err(FamilyValidationError::NameLength);
        }
        if !name_regex().is_match(&value) {
            return Err(FamilyValidationError::NameCharacters);
        }
        if value.trim().is_empty() {
            return Err(FamilyValidationError::NameBlank);
        }
        Ok(Self(value))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PersonName {
    type Error = FamilyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Birthdate that was strictly in the past when validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Birthdate(NaiveDate);

impl Birthdate {
    /// Validate `date` against `today`.
    pub fn new(date: NaiveDate, today: NaiveDate) -> Result<Self, FamilyValidationError> {
        if date >= today {
            return Err(FamilyValidationError::BirthdateNotInPast);
        }
        Ok(Self(date))
    }

    /// Rehydrate a stored birthdate without re-validating it.
    #[must_use]
    pub const fn from_stored(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Calendar date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

/// Gender recorded for a family member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Gender {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(UnknownLabel {
                kind: "gender",
                label: other.to_owned(),
            }),
        }
    }
}

/// Relationship of the family member to the holder.
///
/// Labels are Spanish and travel unchanged on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    /// Son.
    Hijo,
    /// Daughter.
    Hija,
    /// Mother.
    Madre,
    /// Father.
    Padre,
    /// Brother.
    Hermano,
    /// Sister.
    Hermana,
}

impl Relationship {
    /// Every accepted label, in display order.
    pub const ALL: [Self; 6] = [
        Self::Hijo,
        Self::Hija,
        Self::Madre,
        Self::Padre,
        Self::Hermano,
        Self::Hermana,
    ];

    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hijo => "Hijo",
            Self::Hija => "Hija",
            Self::Madre => "Madre",
            Self::Padre => "Padre",
            Self::Hermano => "Hermano",
            Self::Hermana => "Hermana",
        }
    }
}

impl FromStr for Relationship {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|relationship| relationship.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "relationship",
                label: s.to_owned(),
            })
    }
}

/// Validated mutable fields of a family member.
///
/// Used both to create a member and to fully replace an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMemberDraft {
    /// Given name.
    pub name: PersonName,
    /// Surname.
    pub surname: PersonName,
    /// National identity number.
    pub dni: Dni,
    /// Date of birth.
    pub birthdate: Birthdate,
    /// Gender.
    pub gender: Gender,
    /// Relationship to the holder.
    pub relationship: Relationship,
}

/// Persisted family member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    /// Stable identifier.
    pub id: FamilyMemberId,
    /// Patient who registered the member.
    pub holder_id: UserId,
    /// Given name.
    pub name: PersonName,
    /// Surname.
    pub surname: PersonName,
    /// National identity number.
    pub dni: Dni,
    /// Date of birth.
    pub birthdate: Birthdate,
    /// Gender.
    pub gender: Gender,
    /// Relationship to the holder.
    pub relationship: Relationship,
}

impl FamilyMember {
    /// Build a new member from a validated draft.
    #[must_use]
    pub fn from_draft(id: FamilyMemberId, holder_id: UserId, draft: FamilyMemberDraft) -> Self {
        let FamilyMemberDraft {
            name,
            surname,
            dni,
            birthdate,
            gender,
            relationship,
        } = draft;
        Self {
            id,
            holder_id,
            name,
            surname,
            dni,
            birthdate,
            gender,
            relationship,
        }
    }

    /// Replace every mutable field, keeping identity and holder.
    #[must_use]
    pub fn apply(self, draft: FamilyMemberDraft) -> Self {
        Self::from_draft(self.id, self.holder_id, draft)
    }

    /// Whether `holder_id` owns this member.
    #[must_use]
    pub fn belongs_to(&self, holder_id: UserId) -> bool {
        self.holder_id == holder_id
    }
}
