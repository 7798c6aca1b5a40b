//! Tests for family member HTTP handlers.

use super::*;
use crate::domain::{User, UserRole};
use crate::inbound::http::identity::AUTHENTICATED_USER_HEADER;
use crate::inbound::http::test_utils::{TestPorts, http_state};
use crate::test_support::{member_draft, user};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

fn app(
    ports: TestPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(http_state(ports)).service(
        web::scope("/api/v1")
            .service(create_family_member)
            .service(list_family_members)
            .service(update_family_member),
    )
}

fn payload(birthdate: &str) -> Value {
    json!({
        "name": "Sofía",
        "surname": "Pérez",
        "dni": 40_000_000,
        "birthdate": birthdate,
        "gender": "FEMALE",
        "relationship": "Hija",
    })
}

fn holder_ports(holder: &User) -> TestPorts {
    let mut ports = TestPorts::default();
    let resolved = holder.clone();
    ports
        .family_query
        .expect_require_holder()
        .returning(move |_| Ok(resolved.clone()));
    ports
}

#[actix_web::test]
async fn create_returns_created_member() {
    let holder = user(UserRole::Patient, 20_000_000);
    let holder_id = holder.id;
    let mut ports = holder_ports(&holder);
    ports
        .family
        .expect_create()
        .withf(move |id, draft| *id == holder_id && draft.dni.value() == 40_000_000)
        .times(1)
        .returning(|holder, draft| Ok(FamilyMember::from_draft(FamilyMemberId::random(), *holder, draft)));

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/family")
        .insert_header((AUTHENTICATED_USER_HEADER, holder_id.to_string()))
        .set_json(payload("2015-06-15"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["holderId"], holder_id.to_string());
    assert_eq!(body["birthdate"], "2015-06-15");
    assert_eq!(body["relationship"], "Hija");
}

#[actix_web::test]
async fn missing_identity_is_unauthorized() {
    let mut ports = TestPorts::default();
    ports.family_query.expect_require_holder().never();
    ports.family.expect_create().never();

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/family")
        .set_json(payload("2015-06-15"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn non_patients_are_forbidden() {
    let mut ports = TestPorts::default();
    ports.family_query.expect_require_holder().times(1).returning(|_| {
        Err(Error::forbidden(
            "Solo los pacientes pueden gestionar su grupo familiar",
        ))
    });
    ports.family.expect_create().never();

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/family")
        .insert_header((AUTHENTICATED_USER_HEADER, crate::domain::UserId::random().to_string()))
        .set_json(payload("2015-06-15"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case::today("2025-05-01")]
#[case::future("2030-01-01")]
#[actix_web::test]
async fn birthdate_must_be_in_the_past(#[case] birthdate: &str) {
    let holder = user(UserRole::Patient, 20_000_000);
    let mut ports = holder_ports(&holder);
    ports.family.expect_create().never();

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/family")
        .insert_header((AUTHENTICATED_USER_HEADER, holder.id.to_string()))
        .set_json(payload(birthdate))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "birthdate");
    assert_eq!(body["details"]["code"], "invalid_birthdate");
}

#[actix_web::test]
async fn list_returns_members_in_query_order() {
    let holder = user(UserRole::Patient, 20_000_000);
    let holder_id = holder.id;
    let mut ports = holder_ports(&holder);
    ports
        .family_query
        .expect_list_by_holder()
        .times(1)
        .returning(move |holder| {
            Ok(vec![
                FamilyMember::from_draft(FamilyMemberId::random(), *holder, member_draft(40_000_001)),
                FamilyMember::from_draft(FamilyMemberId::random(), *holder, member_draft(40_000_002)),
            ])
        });

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/v1/family")
        .insert_header((AUTHENTICATED_USER_HEADER, holder_id.to_string()))
        .to_request();
    let body: Vec<FamilyMemberResponseBody> =
        actix_test::call_and_read_body_json(&app, req).await;

    let dnis: Vec<u32> = body.iter().map(|member| member.dni).collect();
    assert_eq!(dnis, vec![40_000_001, 40_000_002]);
}

#[actix_web::test]
async fn update_rejects_malformed_member_id() {
    let mut ports = TestPorts::default();
    ports.family.expect_update().never();

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::put()
        .uri("/api/v1/family/not-a-uuid")
        .insert_header((AUTHENTICATED_USER_HEADER, crate::domain::UserId::random().to_string()))
        .set_json(payload("2015-06-15"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn update_surfaces_duplicate_dni_conflict() {
    let holder = user(UserRole::Patient, 20_000_000);
    let member_id = FamilyMemberId::random();
    let mut ports = holder_ports(&holder);
    ports
        .family
        .expect_update()
        .withf(move |_, id, _| *id == member_id)
        .times(1)
        .returning(|_, _, draft| {
            Err(Error::conflict("El DNI ya pertenece a un familiar registrado").with_details(
                json!({"field": "dni", "code": "duplicate_dni", "value": draft.dni.value()}),
            ))
        });

    let app = actix_test::init_service(app(ports)).await;
    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/family/{member_id}"))
        .insert_header((AUTHENTICATED_USER_HEADER, holder.id.to_string()))
        .set_json(payload("2015-06-15"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "duplicate_dni");
    assert_eq!(body["details"]["value"], 40_000_000);
}
