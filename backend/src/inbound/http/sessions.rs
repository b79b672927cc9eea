//! Sign-in and sign-out handlers.
//!
//! ```text
//! GET  /signin   sign-in form
//! POST /signin   establish a session   (form fields: email, password)
//! POST /signout  destroy the session
//! ```
//!
//! Failed credential checks re-render the form with an alert rather than
//! surfacing an error status; everything else propagates through the domain
//! error type.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::{ErrorCode, LoginCredentials};
use crate::domain::ports::INVALID_CREDENTIALS;

use super::authz::{current_user, see_other};
use super::pages::{self, ROOT_PATH};
use super::session::SessionContext;
use super::state::HttpState;
use super::{ApiResult, html};

/// Sign-in form payload for `POST /signin`.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Render the sign-in form.
#[get("/signin")]
pub async fn signin_form(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let viewer = current_user(&session, state.users.as_ref()).await?;
    Ok(html(pages::signin(viewer.as_ref(), None, "")))
}

/// Authenticate the submitted credentials and establish a session.
///
/// On success the one-shot intended destination is consumed; without one the
/// visitor lands on their own profile page.
#[post("/signin")]
pub async fn signin_submit(
    session: SessionContext,
    state: web::Data<HttpState>,
    form: web::Form<SignInForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let Ok(credentials) = LoginCredentials::try_from_parts(&form.email, &form.password) else {
        return Ok(html(pages::signin(
            None,
            Some(INVALID_CREDENTIALS),
            &form.email,
        )));
    };

    let user = match state.login.authenticate(&credentials).await {
        Ok(user) => user,
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            return Ok(html(pages::signin(
                None,
                Some(INVALID_CREDENTIALS),
                &form.email,
            )));
        }
        Err(err) => return Err(err),
    };

    session.persist_user(user.id())?;
    info!(user_id = %user.id(), "session established");

    let destination = session
        .take_return_to()?
        .unwrap_or_else(|| pages::user_path(user.id()));
    Ok(see_other(&destination))
}

/// Destroy the current session.
#[post("/signout")]
pub async fn signout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.purge();
    info!("session destroyed");
    Ok(see_other(ROOT_PATH))
}
