//! Family member HTTP handlers.
//!
//! ```text
//! POST /api/v1/family
//! GET /api/v1/family
//! PUT /api/v1/family/{id}
//! ```
//!
//! Every route resolves the caller as a holder first, so non-patients get
//! `403` before their payload is looked at.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Birthdate, Error, FamilyMember, FamilyMemberDraft, FamilyMemberId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, family_field_error, parse_calendar_date, parse_dni, parse_gender,
    parse_person_name, parse_relationship, parse_uuid,
};

/// Request payload for creating or replacing a family member.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberRequestBody {
    #[schema(min_length = 2, max_length = 50, example = "Sofía")]
    pub name: String,
    #[schema(min_length = 2, max_length = 50, example = "Pérez")]
    pub surname: String,
    #[schema(minimum = 1_000_000, maximum = 99_999_999)]
    pub dni: i64,
    #[schema(format = "date", example = "2015-06-15")]
    pub birthdate: String,
    #[schema(example = "FEMALE")]
    pub gender: String,
    #[schema(example = "Hija")]
    pub relationship: String,
}

/// Family member as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub holder_id: String,
    pub name: String,
    pub surname: String,
    pub dni: u32,
    #[schema(format = "date")]
    pub birthdate: String,
    pub gender: String,
    pub relationship: String,
}

impl From<FamilyMember> for FamilyMemberResponseBody {
    fn from(member: FamilyMember) -> Self {
        Self {
            id: member.id.to_string(),
            holder_id: member.holder_id.to_string(),
            name: member.name.into(),
            surname: member.surname.into(),
            dni: member.dni.value(),
            birthdate: member.birthdate.date().format("%Y-%m-%d").to_string(),
            gender: member.gender.as_str().to_owned(),
            relationship: member.relationship.as_str().to_owned(),
        }
    }
}

fn parse_draft(
    payload: FamilyMemberRequestBody,
    today: NaiveDate,
) -> Result<FamilyMemberDraft, Error> {
    let birthdate_field = FieldName::new("birthdate");
    let birthdate = parse_calendar_date(&payload.birthdate, birthdate_field)?;
    Ok(FamilyMemberDraft {
        name: parse_person_name(payload.name, FieldName::new("name"))?,
        surname: parse_person_name(payload.surname, FieldName::new("surname"))?,
        dni: parse_dni(payload.dni, FieldName::new("dni"))?,
        birthdate: Birthdate::new(birthdate, today)
            .map_err(|err| family_field_error(birthdate_field, &err))?,
        gender: parse_gender(&payload.gender, FieldName::new("gender"))?,
        relationship: parse_relationship(&payload.relationship, FieldName::new("relationship"))?,
    })
}

fn today(state: &HttpState) -> NaiveDate {
    state.clock.utc().date_naive()
}

/// Register a family member under the calling patient.
#[utoipa::path(
    post,
    path = "/api/v1/family",
    request_body = FamilyMemberRequestBody,
    responses(
        (status = 201, description = "Family member created", body = FamilyMemberResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a patient", body = ErrorSchema),
        (status = 404, description = "Holder not found", body = ErrorSchema),
        (status = 409, description = "DNI already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    params(("X-Authenticated-User" = String, Header, description = "Caller account id")),
    tags = ["family"],
    operation_id = "createFamilyMember"
)]
#[post("/family")]
pub async fn create_family_member(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<FamilyMemberRequestBody>,
) -> ApiResult<HttpResponse> {
    let holder = state.family_query.require_holder(&caller.user_id()).await?;
    let draft = parse_draft(payload.into_inner(), today(&state))?;
    let member = state.family.create(&holder.id, draft).await?;
    Ok(HttpResponse::Created().json(FamilyMemberResponseBody::from(member)))
}

/// List the calling patient's family members ordered by surname and name.
#[utoipa::path(
    get,
    path = "/api/v1/family",
    responses(
        (status = 200, description = "Family members", body = [FamilyMemberResponseBody]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a patient", body = ErrorSchema),
        (status = 404, description = "Holder not found", body = ErrorSchema)
    ),
    params(("X-Authenticated-User" = String, Header, description = "Caller account id")),
    tags = ["family"],
    operation_id = "listFamilyMembers"
)]
#[get("/family")]
pub async fn list_family_members(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<FamilyMemberResponseBody>>> {
    let holder = state.family_query.require_holder(&caller.user_id()).await?;
    let members = state.family_query.list_by_holder(&holder.id).await?;
    Ok(web::Json(
        members.into_iter().map(FamilyMemberResponseBody::from).collect(),
    ))
}

/// Replace every field of one of the calling patient's family members.
#[utoipa::path(
    put,
    path = "/api/v1/family/{id}",
    request_body = FamilyMemberRequestBody,
    responses(
        (status = 200, description = "Family member updated", body = FamilyMemberResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Caller is not a patient", body = ErrorSchema),
        (status = 404, description = "Family member not found", body = ErrorSchema),
        (status = 409, description = "DNI already registered", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Family member id"),
        ("X-Authenticated-User" = String, Header, description = "Caller account id")
    ),
    tags = ["family"],
    operation_id = "updateFamilyMember"
)]
#[put("/family/{id}")]
pub async fn update_family_member(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<FamilyMemberRequestBody>,
) -> ApiResult<web::Json<FamilyMemberResponseBody>> {
    let member_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let member_id = FamilyMemberId::from_uuid(member_id);
    let holder = state.family_query.require_holder(&caller.user_id()).await?;
    let draft = parse_draft(payload.into_inner(), today(&state))?;
    let member = state.family.update(&holder.id, &member_id, draft).await?;
    Ok(web::Json(FamilyMemberResponseBody::from(member)))
}

#[cfg(test)]
#[path = "family_tests.rs"]
mod tests;
