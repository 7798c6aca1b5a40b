//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the
//! adapter-side schema wrappers for domain errors and the bearer scheme used
//! by partner integrations. Swagger UI serves it in debug builds.

use crate::inbound::http::family::{FamilyMemberRequestBody, FamilyMemberResponseBody};
use crate::inbound::http::partner::{HealthCertificateRequestBody, HealthCertificateResponseBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, RateLimitRejectionSchema};
use crate::inbound::http::turns::{CreateTurnRequestBody, TurnResponseBody};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the partner bearer scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "PartnerApiKey",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("API key issued to a partner integration."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "MediBook booking API",
        description = "Turn booking, family group management and partner certificate lookups."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::turns::create_turn,
        crate::inbound::http::family::create_family_member,
        crate::inbound::http::family::list_family_members,
        crate::inbound::http::family::update_family_member,
        crate::inbound::http::partner::lookup_health_certificate,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RateLimitRejectionSchema,
        CreateTurnRequestBody,
        TurnResponseBody,
        FamilyMemberRequestBody,
        FamilyMemberResponseBody,
        HealthCertificateRequestBody,
        HealthCertificateResponseBody,
    )),
    tags(
        (name = "turns", description = "Appointment booking"),
        (name = "family", description = "Family members of the calling patient"),
        (name = "partners", description = "Partner integrations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
