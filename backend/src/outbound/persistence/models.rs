//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence layer. Decoding stored labels can fail
//! when the database holds values this build does not know; such rows are
//! reported as query errors by the repositories.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Birthdate, Dni, FamilyMember, FamilyMemberId, Motive, PersonName, Turn, TurnId, UnknownLabel,
    User, UserId,
};

use super::schema::{family_members, turns, users};

fn label<T>(raw: &str) -> Result<T, String>
where
    T: std::str::FromStr<Err = UnknownLabel>,
{
    raw.parse().map_err(|err: UnknownLabel| err.to_string())
}

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub dni: i32,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            dni: Dni::new(i64::from(row.dni)).map_err(|err| err.to_string())?,
            email: row.email,
            display_name: row.display_name,
            role: label(&row.role)?,
            status: label(&row.status)?,
        })
    }
}

/// Row read from and written to `family_members`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = family_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FamilyMemberRow {
    pub id: Uuid,
    pub holder_id: Uuid,
    pub name: String,
    pub surname: String,
    pub dni: i32,
    pub birthdate: NaiveDate,
    pub gender: String,
    pub relationship: String,
}

/// Changeset replacing every mutable family member column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = family_members)]
pub(crate) struct FamilyMemberUpdate<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub dni: i32,
    pub birthdate: NaiveDate,
    pub gender: &'a str,
    pub relationship: &'a str,
}

pub(crate) fn dni_column(dni: Dni) -> i32 {
    // DNI_MAX is below i32::MAX.
    i32::try_from(dni.value()).unwrap_or(i32::MAX)
}

impl From<&FamilyMember> for FamilyMemberRow {
    fn from(member: &FamilyMember) -> Self {
        Self {
            id: *member.id.as_uuid(),
            holder_id: *member.holder_id.as_uuid(),
            name: member.name.as_str().to_owned(),
            surname: member.surname.as_str().to_owned(),
            dni: dni_column(member.dni),
            birthdate: member.birthdate.date(),
            gender: member.gender.as_str().to_owned(),
            relationship: member.relationship.as_str().to_owned(),
        }
    }
}

impl<'a> From<&'a FamilyMember> for FamilyMemberUpdate<'a> {
    fn from(member: &'a FamilyMember) -> Self {
        Self {
            name: member.name.as_str(),
            surname: member.surname.as_str(),
            dni: dni_column(member.dni),
            birthdate: member.birthdate.date(),
            gender: member.gender.as_str(),
            relationship: member.relationship.as_str(),
        }
    }
}

impl TryFrom<FamilyMemberRow> for FamilyMember {
    type Error = String;

    fn try_from(row: FamilyMemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FamilyMemberId::from_uuid(row.id),
            holder_id: UserId::from_uuid(row.holder_id),
            name: PersonName::new(row.name).map_err(|err| err.to_string())?,
            surname: PersonName::new(row.surname).map_err(|err| err.to_string())?,
            dni: Dni::new(i64::from(row.dni)).map_err(|err| err.to_string())?,
            birthdate: Birthdate::from_stored(row.birthdate),
            gender: label(&row.gender)?,
            relationship: label(&row.relationship)?,
        })
    }
}

/// Row read from and written to `turns`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = turns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TurnRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub family_member_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub motive: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Turn> for TurnRow {
    fn from(turn: &Turn) -> Self {
        Self {
            id: *turn.id.as_uuid(),
            doctor_id: *turn.doctor_id.as_uuid(),
            patient_id: *turn.patient_id.as_uuid(),
            family_member_id: turn.family_member_id.map(Uuid::from),
            scheduled_at: turn.scheduled_at,
            motive: turn.motive.as_ref().map(|motive| motive.as_str().to_owned()),
            status: turn.status.as_str().to_owned(),
            created_at: turn.created_at,
        }
    }
}

impl TryFrom<TurnRow> for Turn {
    type Error = String;

    fn try_from(row: TurnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TurnId::from_uuid(row.id),
            doctor_id: UserId::from_uuid(row.doctor_id),
            patient_id: UserId::from_uuid(row.patient_id),
            family_member_id: row.family_member_id.map(FamilyMemberId::from_uuid),
            scheduled_at: row.scheduled_at,
            motive: row
                .motive
                .map(Motive::new)
                .transpose()
                .map_err(|err| err.to_string())?,
            status: label(&row.status)?,
            created_at: row.created_at,
        })
    }
}
