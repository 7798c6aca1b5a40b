//! Caller identity asserted by the upstream authentication layer.
//!
//! The gateway in front of this service authenticates users and forwards the
//! account id in [`AUTHENTICATED_USER_HEADER`]. Handlers extract
//! [`AuthenticatedUser`] and never look at the header themselves.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

/// Header carrying the authenticated account id.
pub const AUTHENTICATED_USER_HEADER: &str = "X-Authenticated-User";

/// Authenticated caller. Extraction fails with `401 Unauthorized` when the
/// header is missing or is not a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Account id of the caller.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.0
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, Error> {
        let Some(raw) = req.headers().get(AUTHENTICATED_USER_HEADER) else {
            return Err(Error::unauthorized("authentication required"));
        };
        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .map(Self)
            .ok_or_else(|| {
                warn!("malformed authenticated user header");
                Error::unauthorized("authentication required")
            })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn echo(caller: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(caller.user_id().to_string())
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some("not-a-uuid"), StatusCode::UNAUTHORIZED)]
    #[case(Some("3fa85f64-5717-4562-b3fc-2c963f66afa6"), StatusCode::OK)]
    #[actix_web::test]
    async fn header_must_carry_a_uuid(#[case] header: Option<&str>, #[case] status: StatusCode) {
        let app = test::init_service(App::new().route("/", web::get().to(echo))).await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((AUTHENTICATED_USER_HEADER, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), status);
    }

    #[actix_web::test]
    async fn extracted_id_matches_header() {
        let app = test::init_service(App::new().route("/", web::get().to(echo))).await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHENTICATED_USER_HEADER, "3fa85f64-5717-4562-b3fc-2c963f66afa6"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }
}
