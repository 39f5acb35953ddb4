//! Application ledger handlers.
//!
//! ```text
//! POST   /api/v1/postings/{id}/applications
//! GET    /api/v1/postings/{id}/applicants
//! PUT    /api/v1/postings/{id}/applicants/{userId}/status {"status":"approved"}
//! DELETE /api/v1/postings/{id}/applicants/{userId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApplicantView, ApplicationStatus, ApplicationView, PostingId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::postings::PostingResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::HttpSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserProfileResponse;
use crate::inbound::http::validation::{
    FieldName, parse_application_status, parse_posting_id, parse_user_id, require,
};

const POSTING_ID: FieldName = FieldName::new("id");
const USER_ID: FieldName = FieldName::new("userId");

/// A posting the user applied to, with the application's status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub posting: PostingResponse,
    #[schema(example = "pending")]
    pub status: String,
}

impl From<ApplicationView> for ApplicationResponse {
    fn from(value: ApplicationView) -> Self {
        Self {
            posting: value.posting.into(),
            status: value.status.as_str().to_owned(),
        }
    }
}

/// An applicant of a posting, with the application's status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantResponse {
    pub user: UserProfileResponse,
    #[schema(example = "pending")]
    pub status: String,
}

impl From<ApplicantView> for ApplicantResponse {
    fn from(value: ApplicantView) -> Self {
        Self {
            user: value.user.into(),
            status: value.status.as_str().to_owned(),
        }
    }
}

/// Acknowledgement of a recorded application.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedResponse {
    pub posting_id: String,
    pub user_id: String,
    #[schema(example = "pending")]
    pub status: String,
}

/// Body for adjudicating an applicant.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantStatusRequest {
    #[schema(example = "approved")]
    pub status: Option<String>,
}

fn parse_pair(path: &(String, String)) -> ApiResult<(PostingId, UserId)> {
    let (posting_id, user_id) = path;
    Ok((
        parse_posting_id(posting_id, POSTING_ID)?,
        parse_user_id(user_id, USER_ID)?,
    ))
}

/// Apply to a posting as the calling user.
#[utoipa::path(
    post,
    path = "/api/v1/postings/{id}/applications",
    params(("id" = String, Path, description = "Posting identifier")),
    responses(
        (status = 201, description = "Application recorded", body = AppliedResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators cannot apply", body = ErrorSchema),
        (status = 409, description = "Not available or already applied", body = ErrorSchema),
        (status = 503, description = "Storage contended", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "applyToPosting"
)]
#[post("/postings/{id}/applications")]
pub async fn apply(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let ctx = session.require_context()?;
    let posting_id = parse_posting_id(&path, POSTING_ID)?;
    state
        .applications
        .apply(&ctx, &ctx.user_id, &posting_id)
        .await?;
    Ok(HttpResponse::Created().json(AppliedResponse {
        posting_id: posting_id.to_string(),
        user_id: ctx.user_id.to_string(),
        status: ApplicationStatus::Pending.as_str().to_owned(),
    }))
}

/// List a posting's applicants.
#[utoipa::path(
    get,
    path = "/api/v1/postings/{id}/applicants",
    params(("id" = String, Path, description = "Posting identifier")),
    responses(
        (status = 200, description = "Applicants", body = [ApplicantResponse]),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "listApplicants"
)]
#[get("/postings/{id}/applicants")]
pub async fn list_applicants(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ApplicantResponse>>> {
    let ctx = session.require_context()?;
    let posting_id = parse_posting_id(&path, POSTING_ID)?;
    let applicants = state
        .applications_query
        .applicants_for(&ctx, &posting_id)
        .await?;
    Ok(web::Json(
        applicants.into_iter().map(ApplicantResponse::from).collect(),
    ))
}

/// Approve or decline an applicant.
#[utoipa::path(
    put,
    path = "/api/v1/postings/{id}/applicants/{userId}/status",
    params(
        ("id" = String, Path, description = "Posting identifier"),
        ("userId" = String, Path, description = "Applicant identifier")
    ),
    request_body = ApplicantStatusRequest,
    responses(
        (status = 204, description = "Status recorded"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema),
        (status = 409, description = "Transition not permitted", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "setApplicantStatus"
)]
#[put("/postings/{id}/applicants/{user_id}/status")]
pub async fn set_applicant_status(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<(String, String)>,
    payload: web::Json<ApplicantStatusRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = session.require_context()?;
    let (posting_id, user_id) = parse_pair(&path)?;
    let raw = require(payload.into_inner().status, FieldName::new("status"))?;
    let status = parse_application_status(&raw, FieldName::new("status"))?;
    state
        .applications
        .set_applicant_status(&ctx, &posting_id, &user_id, status)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Withdraw an application; the applicant or an administrator may do so.
#[utoipa::path(
    delete,
    path = "/api/v1/postings/{id}/applicants/{userId}",
    params(
        ("id" = String, Path, description = "Posting identifier"),
        ("userId" = String, Path, description = "Applicant identifier")
    ),
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "withdrawApplication"
)]
#[delete("/postings/{id}/applicants/{user_id}")]
pub async fn withdraw(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let ctx = session.require_context()?;
    let (posting_id, user_id) = parse_pair(&path)?;
    state
        .applications
        .withdraw(&ctx, &user_id, &posting_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "applications_tests.rs"]
mod tests;
