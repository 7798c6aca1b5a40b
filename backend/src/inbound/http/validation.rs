//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure is an `invalid_request` whose details name the offending
//! `field`, a stable `code` and, where useful, the rejected `value`.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Dni, Error, FamilyValidationError, Gender, Motive, MotiveTooLong, PersonName, Relationship,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidDate,
    InvalidName,
    InvalidDni,
    InvalidBirthdate,
    InvalidGender,
    InvalidRelationship,
    MotiveTooLong,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidDate => "invalid_date",
            Self::InvalidName => "invalid_name",
            Self::InvalidDni => "invalid_dni",
            Self::InvalidBirthdate => "invalid_birthdate",
            Self::InvalidGender => "invalid_gender",
            Self::InvalidRelationship => "invalid_relationship",
            Self::MotiveTooLong => "motive_too_long",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl serde::Serialize) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_optional_uuid(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            ValidationError::new(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
            )
            .with_value(ErrorCode::InvalidTimestamp, value)
        })
}

pub(crate) fn parse_calendar_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("{} must be a YYYY-MM-DD date", field.as_str()))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_person_name(value: String, field: FieldName) -> Result<PersonName, Error> {
    PersonName::new(value).map_err(|err| family_field_error(field, &err))
}

pub(crate) fn parse_dni(value: i64, field: FieldName) -> Result<Dni, Error> {
    Dni::new(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidDni, value)
    })
}

pub(crate) fn parse_gender(value: &str, field: FieldName) -> Result<Gender, Error> {
    value.parse().map_err(|_| {
        ValidationError::new(field, format!("{} must be MALE or FEMALE", field.as_str()))
            .with_value(ErrorCode::InvalidGender, value)
    })
}

pub(crate) fn parse_relationship(value: &str, field: FieldName) -> Result<Relationship, Error> {
    value.parse().map_err(|_| {
        let allowed: Vec<&str> = Relationship::ALL.iter().map(|r| r.as_str()).collect();
        ValidationError::new(
            field,
            format!("{} must be one of {}", field.as_str(), allowed.join(", ")),
        )
        .with_value(ErrorCode::InvalidRelationship, value)
    })
}

pub(crate) fn parse_optional_motive(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<Motive>, Error> {
    value
        .map(|raw| {
            Motive::new(raw).map_err(|err: MotiveTooLong| {
                ValidationError::new(field, err.to_string()).with_code(ErrorCode::MotiveTooLong)
            })
        })
        .transpose()
}

/// Map a family field failure onto the field that produced it.
pub(crate) fn family_field_error(field: FieldName, err: &FamilyValidationError) -> Error {
    let code = match err {
        FamilyValidationError::NameLength
        | FamilyValidationError::NameCharacters
        | FamilyValidationError::NameBlank => ErrorCode::InvalidName,
        FamilyValidationError::BirthdateNotInPast => ErrorCode::InvalidBirthdate,
    };
    ValidationError::new(field, err.to_string()).with_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    fn detail<'a>(err: &'a Error, key: &str) -> Option<&'a serde_json::Value> {
        err.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn uuid_errors_name_field_and_value() {
        let err = parse_uuid("nope", FieldName::new("doctorId")).expect_err("invalid uuid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&err, "field"), Some(&json!("doctorId")));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_uuid")));
        assert_eq!(detail(&err, "value"), Some(&json!("nope")));
    }

    #[rstest]
    fn absent_optional_uuid_is_none() {
        let parsed = parse_optional_uuid(None, FieldName::new("familyMemberId"))
            .expect("absent is fine");
        assert!(parsed.is_none());
    }

    #[rstest]
    #[case("2025-06-01T10:00:00Z", true)]
    #[case("2025-06-01T12:00:00+02:00", true)]
    #[case("2025-06-01 10:00", false)]
    fn timestamps_require_rfc3339(#[case] raw: &str, #[case] ok: bool) {
        let parsed = parse_rfc3339_timestamp(raw, FieldName::new("scheduledAt"));
        assert_eq!(parsed.is_ok(), ok);
    }

    #[rstest]
    fn offsets_are_normalised_to_utc() {
        let parsed = parse_rfc3339_timestamp("2025-06-01T12:00:00+02:00", FieldName::new("at"))
            .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2025-06-01T10:00:00+00:00");
    }

    #[rstest]
    #[case("2015-06-15", true)]
    #[case("15/06/2015", false)]
    #[case("2015-02-30", false)]
    fn dates_require_iso_calendar_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_calendar_date(raw, FieldName::new("birthdate")).is_ok(), ok);
    }

    #[rstest]
    #[case(999_999)]
    #[case(100_000_000)]
    fn dni_out_of_range_is_rejected(#[case] raw: i64) {
        let err = parse_dni(raw, FieldName::new("dni")).expect_err("out of range");
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_dni")));
        assert_eq!(detail(&err, "value"), Some(&json!(raw)));
    }

    #[rstest]
    fn names_with_digits_are_invalid_name() {
        let err = parse_person_name("R2D2".to_owned(), FieldName::new("name"))
            .expect_err("digits rejected");
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_name")));
        assert_eq!(detail(&err, "field"), Some(&json!("name")));
    }

    #[rstest]
    fn blank_surname_is_invalid_name() {
        let err = parse_person_name("    ".to_owned(), FieldName::new("surname"))
            .expect_err("blank rejected");
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_name")));
        assert_eq!(detail(&err, "field"), Some(&json!("surname")));
    }

    #[rstest]
    fn unknown_relationship_lists_allowed_labels() {
        let err = parse_relationship("Primo", FieldName::new("relationship"))
            .expect_err("unknown label");
        assert!(err.message().contains("Hijo, Hija"));
        assert_eq!(detail(&err, "code"), Some(&json!("invalid_relationship")));
    }

    #[rstest]
    fn lowercase_gender_is_rejected() {
        assert!(parse_gender("female", FieldName::new("gender")).is_err());
        assert_eq!(
            parse_gender("FEMALE", FieldName::new("gender")).ok(),
            Some(Gender::Female)
        );
    }

    #[rstest]
    fn long_motive_is_rejected() {
        let err = parse_optional_motive(Some("x".repeat(501)), FieldName::new("motive"))
            .expect_err("too long");
        assert_eq!(detail(&err, "code"), Some(&json!("motive_too_long")));
    }
}
