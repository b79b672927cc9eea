//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::domain::PasswordVault;
use crate::domain::ports::{LoginService, PasswordLoginService, UserRepository};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::sessions::{signin_form, signin_submit, signout};
use crate::inbound::http::site::home;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{create, destroy, edit_form, index, new_form, show, update};
use crate::middleware::Trace;
use crate::outbound::persistence::{DieselUserRepository, InMemoryUserRepository};

/// Dependency bundle handed to the per-worker app factory.
#[derive(Clone)]
pub struct AppDependencies {
    /// Shared readiness/liveness state.
    pub health_state: web::Data<HealthState>,
    /// Shared port implementations for HTTP handlers.
    pub http_state: web::Data<HttpState>,
    /// Session cookie signing key.
    pub key: Key,
    /// Whether session cookies carry the `Secure` flag.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Assemble the application: session middleware, tracing, and all routes.
///
/// Route registration order matters for `/users/new` versus `/users/{id}`;
/// the registration form must match first.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session)
        .wrap(Trace)
        .service(home)
        .service(signin_form)
        .service(signin_submit)
        .service(signout)
        .service(new_form)
        .service(index)
        .service(create)
        .service(edit_form)
        .service(show)
        .service(update)
        .service(destroy)
        .service(ready)
        .service(live)
}

/// Build the HTTP state from configuration.
///
/// Uses the Diesel-backed repository when a pool is configured, otherwise an
/// in-memory store suitable for development and tests.
fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let users: Arc<dyn UserRepository> = match &config.db_pool {
        Some(pool) => Arc::new(DieselUserRepository::new(pool.clone())),
        None => Arc::new(InMemoryUserRepository::new()),
    };
    let vault = PasswordVault::new()
        .map_err(|err| std::io::Error::other(format!("password vault init failed: {err}")))?;
    let login: Arc<dyn LoginService> =
        Arc::new(PasswordLoginService::new(users.clone(), vault.clone()));
    Ok(web::Data::new(HttpState::new(users, login, vault)))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the
/// server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
