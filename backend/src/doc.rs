//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every job board endpoint, the DTOs they exchange and
//! the error envelope, plus the session cookie security scheme. Swagger UI
//! serves it in debug builds and `openapi-dump` exports it for tooling.

use crate::inbound::http::applications::{
    ApplicantResponse, ApplicantStatusRequest, ApplicationResponse, AppliedResponse,
};
use crate::inbound::http::auth::{
    LoginRequest, RegisterRequest, RegisteredResponse, SessionResponse,
};
use crate::inbound::http::postings::{
    CreatePostingRequest, PostingResponse, UpdatePostingRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, RejectionReasonSchema};
use crate::inbound::http::users::UserProfileResponse;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Job board API",
        description = "Session-authenticated job postings and applications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::my_applications,
        crate::inbound::http::users::user_applications,
        crate::inbound::http::postings::list_postings,
        crate::inbound::http::postings::create_posting,
        crate::inbound::http::postings::get_posting,
        crate::inbound::http::postings::update_posting,
        crate::inbound::http::postings::delete_posting,
        crate::inbound::http::applications::apply,
        crate::inbound::http::applications::list_applicants,
        crate::inbound::http::applications::set_applicant_status,
        crate::inbound::http::applications::withdraw,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RejectionReasonSchema,
        RegisterRequest,
        RegisteredResponse,
        LoginRequest,
        SessionResponse,
        UserProfileResponse,
        PostingResponse,
        CreatePostingRequest,
        UpdatePostingRequest,
        ApplicationResponse,
        ApplicantResponse,
        AppliedResponse,
        ApplicantStatusRequest,
    )),
    tags(
        (name = "auth", description = "Registration and session lifecycle"),
        (name = "users", description = "Profiles and per-user applications"),
        (name = "postings", description = "Job posting management and browsing"),
        (name = "applications", description = "Applying and reviewing applicants"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
