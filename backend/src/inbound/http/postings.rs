//! Job posting handlers.
//!
//! ```text
//! GET    /api/v1/postings?status=active&unapplied=true
//! POST   /api/v1/postings {"company":"Acme","location":"Remote","title":"Engineer"}
//! GET    /api/v1/postings/{id}
//! PATCH  /api/v1/postings/{id} {"status":"inactive"}
//! DELETE /api/v1/postings/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::PostingFilter;
use crate::domain::{JobPosting, NewPosting, PostingPatch, PostingPatchInput, PostingStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::HttpSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_posting_id, parse_posting_status, posting_error, require,
};

const ID: FieldName = FieldName::new("id");
const STATUS: FieldName = FieldName::new("status");

/// Job posting as returned to clients. Applicant lists are served separately.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingResponse {
    pub id: String,
    pub company: String,
    pub location: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(example = "active")]
    pub status: String,
}

impl From<JobPosting> for PostingResponse {
    fn from(value: JobPosting) -> Self {
        Self {
            id: value.id.to_string(),
            company: value.company,
            location: value.location,
            title: value.title,
            description: value.description,
            status: value.status.as_str().to_owned(),
        }
    }
}

/// Query string accepted by the posting listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPostingsQuery {
    /// `active` (default) or `inactive`; inactive listings need administrator.
    pub status: Option<String>,
    /// Hide postings the caller already applied to.
    #[serde(default)]
    pub unapplied: bool,
}

/// Body for creating a posting.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostingRequest {
    pub company: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Body for a partial posting update; an empty description clears it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostingRequest {
    pub company: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

fn parse_new_posting(payload: CreatePostingRequest) -> ApiResult<NewPosting> {
    let company = require(payload.company, FieldName::new("company"))?;
    let location = require(payload.location, FieldName::new("location"))?;
    let title = require(payload.title, FieldName::new("title"))?;
    let posting = NewPosting::try_new(&company, &location, &title, payload.description.as_deref())
        .map_err(posting_error)?;
    match payload.status {
        Some(raw) => Ok(posting.with_status(parse_posting_status(&raw, STATUS)?)),
        None => Ok(posting),
    }
}

fn parse_patch(payload: &UpdatePostingRequest) -> ApiResult<PostingPatch> {
    let status = payload
        .status
        .as_deref()
        .map(|raw| parse_posting_status(raw, STATUS))
        .transpose()?;
    PostingPatch::try_from_input(PostingPatchInput {
        company: payload.company.as_deref(),
        location: payload.location.as_deref(),
        title: payload.title.as_deref(),
        description: payload.description.as_deref(),
        status,
    })
    .map_err(posting_error)
}

/// List postings by status.
#[utoipa::path(
    get,
    path = "/api/v1/postings",
    params(ListPostingsQuery),
    responses(
        (status = 200, description = "Postings", body = [PostingResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["postings"],
    operation_id = "listPostings"
)]
#[get("/postings")]
pub async fn list_postings(
    state: web::Data<HttpState>,
    session: HttpSession,
    query: web::Query<ListPostingsQuery>,
) -> ApiResult<web::Json<Vec<PostingResponse>>> {
    let ctx = session.require_context()?;
    let status = match query.status.as_deref() {
        Some(raw) => parse_posting_status(raw, STATUS)?,
        None => PostingStatus::Active,
    };
    let filter = PostingFilter {
        status,
        exclude_applied_by: query.unapplied.then_some(ctx.user_id),
    };
    let postings = state.postings_query.list_postings(&ctx, filter).await?;
    Ok(web::Json(
        postings.into_iter().map(PostingResponse::from).collect(),
    ))
}

/// Create a posting.
#[utoipa::path(
    post,
    path = "/api/v1/postings",
    request_body = CreatePostingRequest,
    responses(
        (status = 201, description = "Created", body = PostingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["postings"],
    operation_id = "createPosting"
)]
#[post("/postings")]
pub async fn create_posting(
    state: web::Data<HttpState>,
    session: HttpSession,
    payload: web::Json<CreatePostingRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = session.require_context()?;
    let posting = parse_new_posting(payload.into_inner())?;
    let created = state.postings.create_posting(&ctx, posting).await?;
    Ok(HttpResponse::Created().json(PostingResponse::from(created)))
}

/// Fetch one posting.
#[utoipa::path(
    get,
    path = "/api/v1/postings/{id}",
    params(("id" = String, Path, description = "Posting identifier")),
    responses(
        (status = 200, description = "Posting", body = PostingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["postings"],
    operation_id = "getPosting"
)]
#[get("/postings/{id}")]
pub async fn get_posting(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostingResponse>> {
    let ctx = session.require_context()?;
    let id = parse_posting_id(&path, ID)?;
    let posting = state.postings_query.get_posting(&ctx, &id).await?;
    Ok(web::Json(PostingResponse::from(posting)))
}

/// Partially update a posting.
#[utoipa::path(
    patch,
    path = "/api/v1/postings/{id}",
    params(("id" = String, Path, description = "Posting identifier")),
    request_body = UpdatePostingRequest,
    responses(
        (status = 200, description = "Updated posting", body = PostingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Storage contended", body = ErrorSchema)
    ),
    tags = ["postings"],
    operation_id = "updatePosting"
)]
#[patch("/postings/{id}")]
pub async fn update_posting(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<String>,
    payload: web::Json<UpdatePostingRequest>,
) -> ApiResult<web::Json<PostingResponse>> {
    let ctx = session.require_context()?;
    let id = parse_posting_id(&path, ID)?;
    let patch = parse_patch(&payload)?;
    let posting = state.postings.update_posting(&ctx, &id, patch).await?;
    Ok(web::Json(PostingResponse::from(posting)))
}

/// Delete a posting and every application to it.
#[utoipa::path(
    delete,
    path = "/api/v1/postings/{id}",
    params(("id" = String, Path, description = "Posting identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["postings"],
    operation_id = "deletePosting"
)]
#[delete("/postings/{id}")]
pub async fn delete_posting(
    state: web::Data<HttpState>,
    session: HttpSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let ctx = session.require_context()?;
    let id = parse_posting_id(&path, ID)?;
    state.postings.delete_posting(&ctx, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "postings_tests.rs"]
mod tests;
