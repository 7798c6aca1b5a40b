//! Turn booking HTTP handlers.
//!
//! ```text
//! POST /api/v1/turns
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateTurnRequest;
use crate::domain::{Error, FamilyMemberId, Turn, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_motive, parse_optional_uuid, parse_rfc3339_timestamp, parse_uuid,
};

/// Request payload for booking a turn.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurnRequestBody {
    #[schema(format = "uuid")]
    pub doctor_id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "date-time")]
    pub scheduled_at: String,
    #[schema(max_length = 500)]
    pub motive: Option<String>,
    #[schema(format = "uuid")]
    pub family_member_id: Option<String>,
}

/// Booked turn as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub doctor_id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "uuid")]
    pub family_member_id: Option<String>,
    #[schema(format = "date-time")]
    pub scheduled_at: String,
    pub motive: Option<String>,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Turn> for TurnResponseBody {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id.to_string(),
            doctor_id: turn.doctor_id.to_string(),
            patient_id: turn.patient_id.to_string(),
            family_member_id: turn.family_member_id.map(|id| id.to_string()),
            scheduled_at: turn.scheduled_at.to_rfc3339(),
            motive: turn.motive.map(String::from),
            status: turn.status.as_str().to_owned(),
            created_at: turn.created_at.to_rfc3339(),
        }
    }
}

fn parse_create_turn(payload: CreateTurnRequestBody) -> Result<CreateTurnRequest, Error> {
    Ok(CreateTurnRequest {
        doctor_id: UserId::from_uuid(parse_uuid(&payload.doctor_id, FieldName::new("doctorId"))?),
        patient_id: UserId::from_uuid(parse_uuid(
            &payload.patient_id,
            FieldName::new("patientId"),
        )?),
        scheduled_at: parse_rfc3339_timestamp(
            &payload.scheduled_at,
            FieldName::new("scheduledAt"),
        )?,
        motive: parse_optional_motive(payload.motive, FieldName::new("motive"))?,
        family_member_id: parse_optional_uuid(
            payload.family_member_id.as_deref(),
            FieldName::new("familyMemberId"),
        )?
        .map(FamilyMemberId::from_uuid),
    })
}

/// Book a turn with a doctor, optionally on behalf of a family member.
#[utoipa::path(
    post,
    path = "/api/v1/turns",
    request_body = CreateTurnRequestBody,
    responses(
        (status = 201, description = "Turn booked", body = TurnResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Doctor, patient or family member not found", body = ErrorSchema),
        (status = 409, description = "Doctor not available", body = ErrorSchema),
        (status = 429, description = "Too many requests"),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["turns"],
    operation_id = "createTurn"
)]
#[post("/turns")]
pub async fn create_turn(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTurnRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_turn(payload.into_inner())?;
    let turn = state.bookings.create_turn(request).await?;
    Ok(HttpResponse::Created().json(TurnResponseBody::from(turn)))
}

#[cfg(test)]
#[path = "turns_tests.rs"]
mod tests;
