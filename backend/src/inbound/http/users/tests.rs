//! Tests for user profile and application history handlers.

use super::*;
use crate::domain::{
    ApplicationStatus, ApplicationView, DisplayName, Error, JobPosting, PostingId, PostingStatus,
    ProfileLinks, Role, Username,
};
use crate::inbound::http::test_utils::{TestPorts, administrator, init_app, regular, session_cookie};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::Value;

fn profile_of(ctx: &SessionContext) -> UserProfile {
    UserProfile {
        id: ctx.user_id,
        username: Username::new("ada").expect("username"),
        display_name: DisplayName::new("Ada Lovelace").expect("display name"),
        role: ctx.role,
        profile_links: ProfileLinks {
            linkedin: None,
            github: Some("https://github.com/ada".into()),
        },
    }
}

fn view(status: ApplicationStatus) -> ApplicationView {
    ApplicationView {
        posting: JobPosting {
            id: PostingId::random(),
            company: "Acme".into(),
            location: "Remote".into(),
            title: "Platform Engineer".into(),
            description: Some("Keep the lights on".into()),
            status: PostingStatus::Inactive,
            applicants: Vec::new(),
            revision: 4,
        },
        status,
    }
}

#[actix_web::test]
async fn current_user_returns_the_profile_without_credentials() {
    let caller = regular();
    let profile = profile_of(&caller);
    let mut ports = TestPorts::default();
    ports
        .identity
        .expect_profile()
        .withf(move |ctx, user_id| ctx == &caller && user_id == &caller.user_id)
        .times(1)
        .return_once(move |_, _| Ok(profile));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, caller).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["username"], "ada");
    assert_eq!(body["displayName"], "Ada Lovelace");
    assert_eq!(body["role"], Role::Regular.as_str());
    assert!(body.get("linkedin").is_none());
    assert!(body.get("credentialHash").is_none());
}

#[actix_web::test]
async fn my_applications_lists_the_callers_history() {
    let caller = regular();
    let mut ports = TestPorts::default();
    ports
        .applications_query
        .expect_applications_for()
        .withf(move |_, user_id| user_id == &caller.user_id)
        .times(1)
        .return_once(|_, _| Ok(vec![view(ApplicationStatus::Declined)]));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, caller).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me/applications")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<ApplicationResponse> = actix_test::read_body_json(res).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].status, "declined");
    assert_eq!(body[0].posting.status, "inactive");
}

#[actix_web::test]
async fn administrators_read_other_users_applications() {
    let target = UserId::random();
    let mut ports = TestPorts::default();
    ports
        .applications_query
        .expect_applications_for()
        .withf(move |ctx, user_id| ctx.role == Role::Administrator && user_id == &target)
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, administrator()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{target}/applications"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn strangers_are_forbidden_from_other_users_applications() {
    let mut ports = TestPorts::default();
    ports
        .applications_query
        .expect_applications_for()
        .return_once(|_, _| Err(Error::forbidden("owner or administrator role required")));
    let app = init_app(ports).await;
    let cookie = session_cookie(&app, regular()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/applications", UserId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
