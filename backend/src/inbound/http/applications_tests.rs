//! Tests for application ledger HTTP handlers.

use super::*;
use crate::domain::{DisplayName, Error, ProfileLinks, RejectionReason, Role, UserProfile, Username};
use crate::inbound::http::test_utils::{TestPorts, administrator, init_app, regular, session_cookie};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

#[actix_web::test]
async fn apply_records_the_caller_as_applicant() {
    let caller = regular();
    let posting_id = PostingId::random();
    let mut ports = TestPorts::default();
    ports
        .applications
        .expect_apply()
        .withf(move |ctx, user_id, id| {
            ctx == &caller && user_id == &caller.user_id && id == &posting_id
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, caller).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/postings/{posting_id}/applications"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: AppliedResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.status, "pending");
    assert_eq!(body.user_id, caller.user_id.to_string());
}

#[rstest]
#[case::duplicate(RejectionReason::Duplicate, StatusCode::CONFLICT)]
#[case::not_available(RejectionReason::NotAvailable, StatusCode::CONFLICT)]
#[case::administrator(RejectionReason::RoleForbidden, StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn apply_rejections_carry_their_reason(
    #[case] reason: RejectionReason,
    #[case] status: StatusCode,
) {
    let mut ports = TestPorts::default();
    ports
        .applications
        .expect_apply()
        .return_once(move |_, _, _| Err(Error::rejected(reason)));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, regular()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/postings/{}/applications", PostingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), status);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "rejected");
    assert_eq!(body["details"]["reason"], reason.as_str());
}

#[actix_web::test]
async fn applicants_are_listed_with_their_status() {
    let applicant = UserProfile {
        id: UserId::random(),
        username: Username::new("grace").expect("username"),
        display_name: DisplayName::new("Grace Hopper").expect("display name"),
        role: Role::Regular,
        profile_links: ProfileLinks::default(),
    };
    let mut ports = TestPorts::default();
    ports
        .applications_query
        .expect_applicants_for()
        .times(1)
        .return_once(move |_, _| {
            Ok(vec![ApplicantView {
                user: applicant,
                status: ApplicationStatus::Approved,
            }])
        });
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, administrator()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/postings/{}/applicants", PostingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<ApplicantResponse> = actix_test::read_body_json(res).await;
    assert_eq!(body[0].user.username, "grace");
    assert_eq!(body[0].status, "approved");
}

#[actix_web::test]
async fn set_status_forwards_the_parsed_status() {
    let posting_id = PostingId::random();
    let user_id = UserId::random();
    let mut ports = TestPorts::default();
    ports
        .applications
        .expect_set_applicant_status()
        .withf(move |_, p, u, status| {
            p == &posting_id && u == &user_id && *status == ApplicationStatus::Declined
        })
        .times(1)
        .return_once(|_, _, _, _| Ok(()));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, administrator()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/postings/{posting_id}/applicants/{user_id}/status"
            ))
            .cookie(cookie)
            .set_json(json!({ "status": "declined" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[case::missing(json!({}), "missing_field")]
#[case::unknown(json!({ "status": "hired" }), "invalid_value")]
#[actix_web::test]
async fn set_status_validates_the_body(#[case] body: Value, #[case] code: &str) {
    let app = init_app(TestPorts::default()).await;
    let cookie = session_cookie(&app, administrator()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/postings/{}/applicants/{}/status",
                PostingId::random(),
                UserId::random()
            ))
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn terminal_status_changes_are_conflicts() {
    let mut ports = TestPorts::default();
    ports
        .applications
        .expect_set_applicant_status()
        .return_once(|_, _, _, _| Err(Error::rejected(RejectionReason::InvalidTransition)));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, administrator()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/postings/{}/applicants/{}/status",
                PostingId::random(),
                UserId::random()
            ))
            .cookie(cookie)
            .set_json(json!({ "status": "pending" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[rstest]
#[case::withdrawn(Ok(()), StatusCode::NO_CONTENT)]
#[case::absent(Err(Error::not_found("application not found")), StatusCode::NOT_FOUND)]
#[case::drift(
    Err(Error::inconsistent_state("application records disagree")),
    StatusCode::INTERNAL_SERVER_ERROR
)]
#[actix_web::test]
async fn withdraw_maps_outcomes(#[case] outcome: Result<(), Error>, #[case] status: StatusCode) {
    let caller = regular();
    let posting_id = PostingId::random();
    let mut ports = TestPorts::default();
    ports
        .applications
        .expect_withdraw()
        .withf(move |_, user_id, id| user_id == &caller.user_id && id == &posting_id)
        .times(1)
        .return_once(move |_, _, _| outcome);
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, caller).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!(
                "/api/v1/postings/{posting_id}/applicants/{}",
                caller.user_id
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), status);
}
