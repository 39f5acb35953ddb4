//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::Trace;
use crate::domain::ports::{
    MockApplicationCommand, MockApplicationQuery, MockIdentityCommand, MockPostingCommand,
    MockPostingQuery,
};
use crate::domain::{Error, Role, SessionContext, UserId};

use super::configure_api;
use super::session::HttpSession;
use super::state::HttpState;

const SESSION_SEED_PATH: &str = "/api/v1/__test/session";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mock driving ports; tests set expectations before building the app.
#[derive(Default)]
pub struct TestPorts {
    pub identity: MockIdentityCommand,
    pub postings: MockPostingCommand,
    pub postings_query: MockPostingQuery,
    pub applications: MockApplicationCommand,
    pub applications_query: MockApplicationQuery,
}

impl TestPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            identity: Arc::new(self.identity),
            postings: Arc::new(self.postings),
            postings_query: Arc::new(self.postings_query),
            applications: Arc::new(self.applications),
            applications_query: Arc::new(self.applications_query),
        }
    }
}

async fn seed_session(
    session: HttpSession,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (user_id, role) = path.into_inner();
    let user_id = UserId::new(user_id).map_err(|err| Error::invalid_request(err.to_string()))?;
    let role = role
        .parse::<Role>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist(&SessionContext::new(user_id, role))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Initialise the API scope over mock ports, plus a route that seeds sessions.
pub async fn init_app(
    ports: TestPorts,
) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(ports.into_state()))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .route(
                        "/__test/session/{user_id}/{role}",
                        web::post().to(seed_session),
                    )
                    .configure(configure_api),
            ),
    )
    .await
}

/// Obtain a session cookie for `ctx` from an app built by [`init_app`].
pub async fn session_cookie<S>(app: &S, ctx: SessionContext) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let uri = format!("{SESSION_SEED_PATH}/{}/{}", ctx.user_id, ctx.role);
    let res = test::call_service(app, test::TestRequest::post().uri(&uri).to_request()).await;
    assert!(res.status().is_success(), "session seeding failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

pub fn regular() -> SessionContext {
    SessionContext::new(UserId::random(), Role::Regular)
}

pub fn administrator() -> SessionContext {
    SessionContext::new(UserId::random(), Role::Administrator)
}
