//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use crate::domain::password::test_vault;
use crate::domain::ports::{PasswordLoginService, UserRepository};
use crate::domain::{DisplayName, EmailAddress, User, UserId};
use crate::outbound::persistence::InMemoryUserRepository;

use super::state::HttpState;

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

/// Build HTTP state over an in-memory store seeded with the given users.
pub fn state_with_users(seed: impl IntoIterator<Item = User>) -> web::Data<HttpState> {
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::with_users(seed));
    let vault = test_vault();
    let login = Arc::new(PasswordLoginService::new(users.clone(), vault.clone()));
    web::Data::new(HttpState::new(users, login, vault))
}

/// Construct a user whose password hash matches `password` under the test
/// vault.
pub fn seeded_user(name: &str, email: &str, password: &str, admin: bool) -> User {
    let vault = test_vault();
    User::new(
        UserId::random(),
        EmailAddress::new(email).expect("fixture email"),
        DisplayName::new(name).expect("fixture name"),
        vault.hash(password).expect("fixture password hash"),
        admin,
    )
}

/// Assemble a test application with the full route set behind test session
/// middleware.
pub fn site_test_app(
    state: web::Data<HttpState>,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    actix_web::App::new()
        .app_data(state)
        .wrap(test_session_middleware())
        .service(super::site::home)
        .service(super::sessions::signin_form)
        .service(super::sessions::signin_submit)
        .service(super::sessions::signout)
        .service(super::users::new_form)
        .service(super::users::index)
        .service(super::users::create)
        .service(super::users::edit_form)
        .service(super::users::show)
        .service(super::users::update)
        .service(super::users::destroy)
}
