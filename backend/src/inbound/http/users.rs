//! Users resource handlers.
//!
//! ```text
//! GET    /users            index (protected)
//! GET    /users/new        registration form (anonymous only)
//! POST   /users            create account (anonymous only)
//! GET    /users/{id}       profile page (public)
//! GET    /users/{id}/edit  settings form (self only)
//! PATCH  /users/{id}       update account (self only)
//! DELETE /users/{id}       delete account (admin only, never self)
//! ```
//!
//! Every handler resolves the acting user, runs the domain policy, and only
//! then touches the repository. Denials leave this module as redirects built
//! by [`super::authz::enforce`].

use actix_web::{HttpResponse, delete, get, post, route, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::policy::UserAction;
use crate::domain::ports::UserPersistenceError;
use crate::domain::{
    DisplayName, EmailAddress, Error, NewPassword, User, UserId, evaluate,
};

use super::authz::{current_user, enforce, map_user_persistence_error, see_other};
use super::pages::{self, SignupPrefill, USERS_PATH};
use super::session::SessionContext;
use super::state::HttpState;
use super::{ApiResult, html};

fn parse_target(raw: &str) -> ApiResult<UserId> {
    UserId::new(raw).map_err(|_| Error::not_found("user not found"))
}

/// List all users.
#[get("/users")]
pub async fn index(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(
        evaluate(actor.as_ref(), UserAction::Index),
        &session,
        Some(USERS_PATH),
    )? {
        return Ok(denied);
    }
    let viewer = actor.ok_or_else(|| Error::internal("index allowed without a session"))?;

    let users = state
        .users
        .list()
        .await
        .map_err(map_user_persistence_error)?;
    let flash = session.take_flash()?;
    Ok(html(pages::users_index(&viewer, &users, flash.as_deref())))
}

/// Render the registration form.
#[get("/users/new")]
pub async fn new_form(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(evaluate(actor.as_ref(), UserAction::NewForm), &session, None)? {
        return Ok(denied);
    }
    Ok(html(pages::signup(None, &SignupPrefill::default())))
}

/// Registration payload for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

fn validate_signup(
    form: &SignupForm,
) -> Result<(DisplayName, EmailAddress, NewPassword), String> {
    let name = DisplayName::new(form.name.clone()).map_err(|err| err.to_string())?;
    let email = EmailAddress::new(&form.email).map_err(|err| err.to_string())?;
    let password = NewPassword::try_from_parts(&form.password, &form.password_confirmation)
        .map_err(|err| err.to_string())?;
    Ok((name, email, password))
}

/// Create a new account and sign it in.
#[post("/users")]
pub async fn create(
    session: SessionContext,
    state: web::Data<HttpState>,
    form: web::Form<SignupForm>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(evaluate(actor.as_ref(), UserAction::Create), &session, None)? {
        return Ok(denied);
    }

    let form = form.into_inner();
    let prefill = SignupPrefill {
        name: form.name.clone(),
        email: form.email.clone(),
    };
    let (name, email, password) = match validate_signup(&form) {
        Ok(validated) => validated,
        Err(message) => return Ok(html(pages::signup(Some(&message), &prefill))),
    };

    let password_hash = state
        .vault
        .hash(password.reveal())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
    let user = User::new(UserId::random(), email, name, password_hash, false);

    match state.users.insert(&user).await {
        Ok(()) => {}
        Err(UserPersistenceError::DuplicateEmail { .. }) => {
            return Ok(html(pages::signup(
                Some("Email address already taken"),
                &prefill,
            )));
        }
        Err(err) => return Err(map_user_persistence_error(err)),
    }

    session.persist_user(user.id())?;
    info!(user_id = %user.id(), "account created");
    Ok(see_other(&pages::user_path(user.id())))
}

/// Show a user's profile page.
#[get("/users/{id}")]
pub async fn show(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_target(&path.into_inner())?;
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(
        evaluate(actor.as_ref(), UserAction::Show { target: &target }),
        &session,
        None,
    )? {
        return Ok(denied);
    }

    let user = state
        .users
        .find_by_id(&target)
        .await
        .map_err(map_user_persistence_error)?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(html(pages::profile(actor.as_ref(), &user)))
}

/// Render the settings form for the signed-in user's own account.
#[get("/users/{id}/edit")]
pub async fn edit_form(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_target(&path.into_inner())?;
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(
        evaluate(actor.as_ref(), UserAction::Edit { target: &target }),
        &session,
        Some(&pages::edit_user_path(&target)),
    )? {
        return Ok(denied);
    }
    let viewer = actor.ok_or_else(|| Error::internal("edit allowed without a session"))?;

    Ok(html(pages::edit_user(&viewer, None)))
}

/// Update payload for `PATCH /users/{id}`.
///
/// A blank password leaves the stored credential unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

fn apply_update(viewer: &User, form: &UpdateForm) -> Result<(User, Option<NewPassword>), String> {
    let name = DisplayName::new(form.name.clone()).map_err(|err| err.to_string())?;
    let email = EmailAddress::new(&form.email).map_err(|err| err.to_string())?;
    let password = if form.password.is_empty() && form.password_confirmation.is_empty() {
        None
    } else {
        Some(
            NewPassword::try_from_parts(&form.password, &form.password_confirmation)
                .map_err(|err| err.to_string())?,
        )
    };
    let updated = viewer.clone().with_display_name(name).with_email(email);
    Ok((updated, password))
}

/// Apply changes to the signed-in user's own account.
///
/// The hidden `_method` field in the settings form lets plain HTML submit
/// through POST; both verbs resolve here.
#[route("/users/{id}", method = "PATCH", method = "POST")]
pub async fn update(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    form: web::Form<UpdateForm>,
) -> ApiResult<HttpResponse> {
    let target = parse_target(&path.into_inner())?;
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(
        evaluate(actor.as_ref(), UserAction::Update { target: &target }),
        &session,
        None,
    )? {
        return Ok(denied);
    }
    let viewer = actor.ok_or_else(|| Error::internal("update allowed without a session"))?;

    let form = form.into_inner();
    let (mut updated, new_password) = match apply_update(&viewer, &form) {
        Ok(applied) => applied,
        Err(message) => return Ok(html(pages::edit_user(&viewer, Some(&message)))),
    };
    if let Some(password) = new_password {
        let password_hash = state
            .vault
            .hash(password.reveal())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        updated = updated.with_password_hash(password_hash);
    }

    match state.users.update(&updated).await {
        Ok(()) => {}
        Err(UserPersistenceError::DuplicateEmail { .. }) => {
            return Ok(html(pages::edit_user(
                &viewer,
                Some("Email address already taken"),
            )));
        }
        Err(err) => return Err(map_user_persistence_error(err)),
    }

    info!(user_id = %updated.id(), "profile updated");
    Ok(see_other(&pages::user_path(updated.id())))
}

/// Delete a user account.
#[delete("/users/{id}")]
pub async fn destroy(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_target(&path.into_inner())?;
    let actor = current_user(&session, state.users.as_ref()).await?;
    if let Some(denied) = enforce(
        evaluate(actor.as_ref(), UserAction::Destroy { target: &target }),
        &session,
        None,
    )? {
        return Ok(denied);
    }

    let deleted = state
        .users
        .delete(&target)
        .await
        .map_err(map_user_persistence_error)?;
    if !deleted {
        return Err(Error::not_found("user not found"));
    }

    info!(user_id = %target, "user deleted");
    session.set_flash("User deleted")?;
    Ok(see_other(USERS_PATH))
}
