//! End-to-end HTTP flow through the production app factory over the
//! in-memory adapters.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use jobboard::domain::ports::{CredentialHasher, FixtureCredentialHasher};
use jobboard::domain::{
    IdentityService, MAX_PASSWORD_BYTES, Registration, RegistrationInput, RetryPolicy,
    TRACE_ID_HEADER,
};
use jobboard::inbound::http::health::HealthState;
use jobboard::outbound::credentials::BcryptHasher;
use jobboard::outbound::memory::{MemoryPostingRepository, MemoryUserRepository};
use jobboard::server::{AppDependencies, SESSION_COOKIE_NAME, build_app, services_over};
use rstest::rstest;
use serde_json::{Value, json};

const API: &str = "/api/v1";

fn dependencies(users: Arc<MemoryUserRepository>) -> AppDependencies {
    dependencies_hashing_with(users, FixtureCredentialHasher)
}

fn dependencies_hashing_with<H>(users: Arc<MemoryUserRepository>, hasher: H) -> AppDependencies
where
    H: CredentialHasher + 'static,
{
    let postings = Arc::new(MemoryPostingRepository::default());
    let http_state = services_over(users, postings, Arc::new(hasher), RetryPolicy::default());
    AppDependencies {
        health_state: web::Data::new(HealthState::new()),
        http_state: web::Data::new(http_state),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

async fn seed_administrator(users: &Arc<MemoryUserRepository>) {
    let registration = Registration::try_from_input(RegistrationInput {
        username: "ada",
        password: "admin pass",
        confirm_password: "admin pass",
        display_name: "Ada Lovelace",
        linkedin: None,
        github: None,
    })
    .expect("valid registration");
    IdentityService::new(Arc::clone(users), Arc::new(FixtureCredentialHasher))
        .register_administrator(&registration)
        .await
        .expect("administrator registered");
}

async fn login<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("{API}/auth/login"))
            .set_json(json!({ "username": username, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie")
}

async fn send<S>(app: &S, req: test::TestRequest) -> (StatusCode, Option<String>, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let trace_id = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, trace_id, json)
}

#[rstest]
#[actix_web::test]
async fn member_applies_and_administrator_declines() {
    let users = Arc::new(MemoryUserRepository::default());
    seed_administrator(&users).await;
    let app = test::init_service(build_app(dependencies(Arc::clone(&users)))).await;

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/auth/register"))
            .set_json(json!({
                "username": "grace",
                "password": "pw",
                "confirmPassword": "pw",
                "displayName": "Grace Hopper",
                "github": "https://github.com/grace"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let member_id = body["id"].as_str().expect("member id").to_owned();

    let admin = login(&app, "ada", "admin pass").await;
    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/postings"))
            .cookie(admin.clone())
            .set_json(json!({
                "company": "Acme",
                "location": "Lisbon",
                "title": "Platform Engineer"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "active");
    let posting_id = body["id"].as_str().expect("posting id").to_owned();

    let member = login(&app, "grace", "pw").await;
    let (_, _, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("{API}/postings?unapplied=true"))
            .cookie(member.clone()),
    )
    .await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let apply_uri = format!("{API}/postings/{posting_id}/applications");
    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&apply_uri)
            .cookie(member.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");

    let (status, trace_id, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&apply_uri)
            .cookie(member.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["reason"], "duplicate");
    assert_eq!(body["traceId"].as_str(), trace_id.as_deref());

    let (_, _, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("{API}/postings?unapplied=true"))
            .cookie(member.clone()),
    )
    .await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let (status, _, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!(
                "{API}/postings/{posting_id}/applicants/{member_id}/status"
            ))
            .cookie(admin.clone())
            .set_json(json!({ "status": "declined" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("{API}/users/me/applications"))
            .cookie(member.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["posting"]["id"], posting_id.as_str());
    assert_eq!(body[0]["status"], "declined");

    let (status, _, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("{API}/postings/{posting_id}/applicants"))
            .cookie(admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["user"]["id"], member_id.as_str());
    assert_eq!(body[0]["user"]["github"], "https://github.com/grace");
    assert_eq!(body[0]["status"], "declined");
}

#[rstest]
#[actix_web::test]
async fn members_cannot_manage_postings() {
    let users = Arc::new(MemoryUserRepository::default());
    let app = test::init_service(build_app(dependencies(users))).await;
    send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/auth/register"))
            .set_json(json!({
                "username": "grace",
                "password": "pw",
                "confirmPassword": "pw",
                "displayName": "Grace Hopper"
            })),
    )
    .await;
    let member = login(&app, "grace", "pw").await;

    let (status, trace_id, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/postings"))
            .cookie(member)
            .set_json(json!({ "company": "Acme", "location": "Lisbon", "title": "Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"]["reason"], "role-forbidden");
    assert!(trace_id.is_some());
}

#[rstest]
#[actix_web::test]
async fn wrong_passwords_are_unauthorised() {
    let users = Arc::new(MemoryUserRepository::default());
    seed_administrator(&users).await;
    let app = test::init_service(build_app(dependencies(users))).await;

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/auth/login"))
            .set_json(json!({ "username": "ada", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"]["reason"], "invalid-credentials");
}

fn register_request(password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("{API}/auth/register"))
        .set_json(json!({
            "username": "grace",
            "password": password,
            "confirmPassword": password,
            "displayName": "Grace Hopper"
        }))
}

#[rstest]
#[actix_web::test]
async fn passwords_sharing_the_hashed_prefix_do_not_log_in() {
    let users = Arc::new(MemoryUserRepository::default());
    let app =
        test::init_service(build_app(dependencies_hashing_with(users, BcryptHasher::new(4)))).await;
    let password = "a".repeat(MAX_PASSWORD_BYTES);

    let (status, _, _) = send(&app, register_request(&password)).await;
    assert_eq!(status, StatusCode::CREATED);
    login(&app, "grace", &password).await;

    let (status, _, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/auth/login"))
            .set_json(json!({ "username": "grace", "password": format!("{password}WRONG") })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"]["reason"], "invalid-credentials");
}

#[rstest]
#[actix_web::test]
async fn overlong_passwords_cannot_register() {
    let app = test::init_service(build_app(dependencies(Arc::default()))).await;
    let password = "a".repeat(MAX_PASSWORD_BYTES + 1);

    let (status, _, body) = send(&app, register_request(&password)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "password");
}

#[rstest]
#[actix_web::test]
async fn logout_clears_the_session_cookie() {
    let users = Arc::new(MemoryUserRepository::default());
    seed_administrator(&users).await;
    let app = test::init_service(build_app(dependencies(users))).await;
    let admin = login(&app, "ada", "admin pass").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("{API}/auth/logout"))
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("removal cookie");
    assert!(cleared.value().is_empty());
}

#[rstest]
#[case::profile("/users/me")]
#[case::postings("/postings")]
#[case::applications("/users/me/applications")]
#[actix_web::test]
async fn anonymous_callers_must_log_in(#[case] path: &str) {
    let app = test::init_service(build_app(dependencies(Arc::default()))).await;
    let (status, trace_id, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("{API}{path}")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    assert!(trace_id.is_some());
}

#[rstest]
#[actix_web::test]
async fn probes_report_liveness_before_readiness() {
    let app = test::init_service(build_app(dependencies(Arc::default()))).await;
    let (live, _, _) = send(&app, test::TestRequest::get().uri("/health/live")).await;
    let (ready, _, _) = send(&app, test::TestRequest::get().uri("/health/ready")).await;
    assert_eq!(live, StatusCode::OK);
    assert_eq!(ready, StatusCode::SERVICE_UNAVAILABLE);
}
