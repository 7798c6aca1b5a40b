//! Shared test doubles for unit tests.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock whose reading only changes when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Parse an RFC 3339 instant for fixtures.
pub fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap_or_else(|error| panic!("invalid fixture instant {raw}: {error}"))
        .with_timezone(&Utc)
}

/// Account fixture with the given role and DNI.
pub fn user(role: crate::domain::UserRole, dni: i64) -> crate::domain::User {
    crate::domain::User {
        id: crate::domain::UserId::random(),
        dni: crate::domain::Dni::new(dni).unwrap_or_else(|error| panic!("fixture dni: {error}")),
        email: format!("user{dni}@medibook.test"),
        display_name: format!("User {dni}"),
        role,
        status: crate::domain::UserStatus::Active,
    }
}

/// Valid family member draft carrying `dni`.
pub fn member_draft(dni: i64) -> crate::domain::FamilyMemberDraft {
    use crate::domain::{Birthdate, Dni, FamilyMemberDraft, Gender, PersonName, Relationship};

    let birthdate = chrono::NaiveDate::from_ymd_opt(2015, 6, 15)
        .unwrap_or_else(|| panic!("fixture birthdate"));
    FamilyMemberDraft {
        name: PersonName::new("Sofía").unwrap_or_else(|error| panic!("fixture name: {error}")),
        surname: PersonName::new("Pérez").unwrap_or_else(|error| panic!("fixture surname: {error}")),
        dni: Dni::new(dni).unwrap_or_else(|error| panic!("fixture dni: {error}")),
        birthdate: Birthdate::from_stored(birthdate),
        gender: Gender::Female,
        relationship: Relationship::Hija,
    }
}
