//! User profile and application history handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! GET /api/v1/users/me/applications
//! GET /api/v1/users/{id}/applications
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{SessionContext, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::applications::ApplicationResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::HttpSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// Public view of a user; never includes credentials.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[schema(example = "regular")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username.into(),
            display_name: value.display_name.into(),
            role: value.role.as_str().to_owned(),
            linkedin: value.profile_links.linkedin,
            github: value.profile_links.github,
        }
    }
}

/// Profile of the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: HttpSession,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let ctx = session.require_context()?;
    let profile = state.identity.profile(&ctx, &ctx.user_id).await?;
    Ok(web::Json(profile.into()))
}

async fn applications_of(
    state: &HttpState,
    ctx: &SessionContext,
    user_id: &UserId,
) -> ApiResult<web::Json<Vec<ApplicationResponse>>> {
    let applications = state.applications_query.applications_for(ctx, user_id).await?;
    Ok(web::Json(
        applications
            .into_iter()
            .map(ApplicationResponse::from)
            .collect(),
    ))
}

/// Applications submitted by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/applications",
    responses(
        (status = 200, description = "Applications", body = [ApplicationResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "myApplications"
)]
#[get("/users/me/applications")]
pub async fn my_applications(
    state: web::Data<HttpState>,
    session: HttpSession,
) -> ApiResult<web::Json<Vec<ApplicationResponse>>> {
    let ctx = session.require_context()?;
    applications_of(&state, &ctx, &ctx.user_id).await
}

/// Applications submitted by a given user; owner or administrator only.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/applications",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Applications", body = [ApplicationResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "userApplications"
)]
#[get("/users/{id}/applications")]
pub async fn user_applications(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ApplicationResponse>>> {
    let ctx = session.require_context()?;
    let user_id = parse_user_id(&path, FieldName::new("id"))?;
    applications_of(&state, &ctx, &user_id).await
}

#[cfg(test)]
mod tests;
