//! Partner-facing health certificate lookup.
//!
//! ```text
//! POST /api/gymcloud/health-certificate
//! Authorization: Bearer <key>
//! {"email":"patient@example.com"}
//! ```
//!
//! The body is read raw so the content-type and credential checks run
//! before any JSON is parsed.

use actix_web::http::header;
use actix_web::{HttpRequest, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::PartnerLookupRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request payload for a partner lookup.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct HealthCertificateRequestBody {
    #[schema(format = "email", example = "patient@example.com")]
    pub email: String,
}

/// Lookup answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCertificateResponseBody {
    pub has_health_certificate: bool,
}

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Malformed bodies yield no e-mail; the gate then reports `invalid_email`.
fn email_from_body(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("email")?
        .as_str()
        .map(str::to_owned)
}

/// Tell a partner whether a patient holds a health certificate from the last
/// year.
#[utoipa::path(
    post,
    path = "/api/gymcloud/health-certificate",
    request_body = HealthCertificateRequestBody,
    responses(
        (status = 200, description = "Lookup answered", body = HealthCertificateResponseBody),
        (status = 400, description = "Unsupported content type or invalid email", body = ErrorSchema),
        (status = 401, description = "Missing or unknown API key", body = ErrorSchema),
        (status = 429, description = "Credential rate limit exceeded", body = ErrorSchema),
        (status = 500, description = "Lookup failed", body = ErrorSchema)
    ),
    tags = ["partners"],
    operation_id = "lookupHealthCertificate",
    security(("PartnerApiKey" = []))
)]
#[post("/health-certificate")]
pub async fn lookup_health_certificate(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<HealthCertificateResponseBody>> {
    let request = PartnerLookupRequest {
        content_type: header_value(&req, header::CONTENT_TYPE),
        authorization: header_value(&req, header::AUTHORIZATION),
        email: email_from_body(&body),
    };
    let has_health_certificate = state.partner_gate.check(request).await?;
    Ok(web::Json(HealthCertificateResponseBody {
        has_health_certificate,
    }))
}
