//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

use crate::domain::Error;

pub mod error;
pub mod family;
pub mod health;
pub mod identity;
pub mod partner;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod turns;
pub mod validation;

pub use error::ApiResult;

/// JSON extractor configuration answering malformed bodies with the domain
/// error envelope instead of Actix's plain-text default.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    })
}

/// Register every route. Callers provide [`state::HttpState`] and
/// [`health::HealthState`] as app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use medibook::inbound::http::{configure, json_config};
///
/// let app = App::new().app_data(json_config()).configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(turns::create_turn)
            .service(family::create_family_member)
            .service(family::list_family_members)
            .service(family::update_family_member),
    )
    .service(web::scope("/api/gymcloud").service(partner::lookup_health_certificate))
    .service(health::ready)
    .service(health::live);
}
