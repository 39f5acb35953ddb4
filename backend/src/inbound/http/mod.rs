//! HTTP inbound adapter exposing the job board REST endpoints.

use actix_web::web;

pub mod applications;
pub mod auth;
pub mod error;
pub mod health;
pub mod postings;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every API handler on `cfg`.
///
/// Callers mount this under their versioned scope and supply
/// [`state::HttpState`] as app data together with session middleware.
///
/// `/users/me/...` routes are registered before `/users/{id}/...` so the
/// literal segment wins.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(users::current_user)
        .service(users::my_applications)
        .service(users::user_applications)
        .service(postings::list_postings)
        .service(postings::create_posting)
        .service(postings::get_posting)
        .service(postings::update_posting)
        .service(postings::delete_posting)
        .service(applications::apply)
        .service(applications::list_applicants)
        .service(applications::set_applicant_status)
        .service(applications::withdraw);
}
