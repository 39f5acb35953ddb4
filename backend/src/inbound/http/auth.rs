//! Registration and session handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"ada","password":"pw","confirmPassword":"pw","displayName":"Ada"}
//! POST /api/v1/auth/login {"username":"ada","password":"pw"}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{LoginCredentials, Registration, RegistrationInput, SessionContext};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::HttpSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::credentials_error;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

impl RegisterRequest {
    fn as_input(&self) -> RegistrationInput<'_> {
        RegistrationInput {
            username: &self.username,
            password: &self.password,
            confirm_password: &self.confirm_password,
            display_name: &self.display_name,
            linkedin: self.linkedin.as_deref(),
            github: self.github.as_deref(),
        }
    }
}

/// Identifier of a newly registered user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    pub id: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The caller established by a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    #[schema(example = "regular")]
    pub role: String,
}

impl From<SessionContext> for SessionResponse {
    fn from(ctx: SessionContext) -> Self {
        Self {
            user_id: ctx.user_id.to_string(),
            role: ctx.role.as_str().to_owned(),
        }
    }
}

/// Register a regular user account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisteredResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username taken or passwords differ", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from_input(payload.as_input()).map_err(credentials_error)?;
    let user_id = state.identity.register(&registration).await?;
    Ok(HttpResponse::Created().json(RegisteredResponse {
        id: user_id.to_string(),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: HttpSession,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(credentials_error)?;
    let ctx = state.identity.authenticate(&credentials).await?;
    session.persist(&ctx)?;
    Ok(web::Json(SessionResponse::from(ctx)))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: HttpSession) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{Error, RejectionReason, Role, UserId};
    use crate::inbound::http::test_utils::{TestPorts, init_app};

    fn register_body(confirm: &str) -> Value {
        json!({
            "username": "ada",
            "password": "correct horse",
            "confirmPassword": confirm,
            "displayName": "Ada Lovelace",
            "github": "https://github.com/ada"
        })
    }

    #[actix_web::test]
    async fn register_returns_the_new_id() {
        let user_id = UserId::random();
        let mut ports = TestPorts::default();
        ports
            .identity
            .expect_register()
            .withf(|registration| {
                registration.username().as_ref() == "ada"
                    && registration.profile_links().github.as_deref()
                        == Some("https://github.com/ada")
            })
            .times(1)
            .return_once(move |_| Ok(user_id));
        let app = init_app(ports).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(register_body("correct horse"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: RegisteredResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.id, user_id.to_string());
    }

    #[actix_web::test]
    async fn register_rejections_are_conflicts() {
        let mut ports = TestPorts::default();
        ports
            .identity
            .expect_register()
            .return_once(|_| Err(Error::rejected(RejectionReason::CredentialMismatch)));
        let app = init_app(ports).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(register_body("battery staple"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["reason"], "credential-mismatch");
    }

    #[rstest]
    #[case::blank_username(json!({ "username": " ", "password": "pw" }), "username")]
    #[case::blank_password(json!({ "username": "ada", "password": "" }), "password")]
    #[actix_web::test]
    async fn login_validation_names_the_field(#[case] body: Value, #[case] field: &str) {
        let app = init_app(TestPorts::default()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(body)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn login_sets_a_session_cookie() {
        let ctx = SessionContext::new(UserId::random(), Role::Regular);
        let mut ports = TestPorts::default();
        ports
            .identity
            .expect_authenticate()
            .withf(|credentials| credentials.username() == "ada")
            .return_once(move |_| Ok(ctx));
        let app = init_app(ports).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "username": " ada ", "password": "pw" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.response().cookies().any(|cookie| cookie.name() == "session"));
        let body: SessionResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.user_id, ctx.user_id.to_string());
        assert_eq!(body.role, "regular");
    }

    #[actix_web::test]
    async fn invalid_credentials_are_unauthorised() {
        let mut ports = TestPorts::default();
        ports
            .identity
            .expect_authenticate()
            .return_once(|_| Err(Error::rejected(RejectionReason::InvalidCredentials)));
        let app = init_app(ports).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "username": "ada", "password": "wrong" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.response().cookies().all(|cookie| cookie.name() != "session"));
    }
}
