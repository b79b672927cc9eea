//! Policy enforcement at the HTTP edge.
//!
//! Handlers resolve the acting user from the session, evaluate the domain
//! policy, and let this module translate denials into the redirect each
//! deny reason calls for. No handler mutates anything before the policy has
//! answered.

use actix_web::HttpResponse;
use actix_web::http::header;
use tracing::debug;

use crate::domain::policy::{Decision, DenyReason};
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Error, User};

use super::pages::{ROOT_PATH, SIGNIN_PATH, USERS_PATH};
use super::session::SessionContext;
use super::ApiResult;

/// Notice stored when an administrator tries to delete their own account.
pub const SELF_DELETE_NOTICE: &str = "You can't delete yourself";

/// Map repository failures to transport-ready domain errors.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail { email } => {
            Error::invalid_request(format!("email address already taken: {email}"))
        }
    }
}

/// Build a `303 See Other` redirect to the given location.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Resolve the acting user behind the current session.
///
/// A session naming a user that no longer exists is purged and treated as
/// anonymous, so deleted accounts cannot keep acting through a stale cookie.
pub async fn current_user(
    session: &SessionContext,
    users: &dyn UserRepository,
) -> ApiResult<Option<User>> {
    let Some(id) = session.user_id()? else {
        return Ok(None);
    };
    match users
        .find_by_id(&id)
        .await
        .map_err(map_user_persistence_error)?
    {
        Some(user) => Ok(Some(user)),
        None => {
            debug!(user_id = %id, "session references a deleted user, purging");
            session.purge();
            Ok(None)
        }
    }
}

/// Translate a policy decision into a redirect response, or `None` on allow.
///
/// `requested` is the path to remember as the intended destination when an
/// anonymous visitor is sent to sign in; pass `None` for non-navigation
/// requests (mutations are not worth returning to).
pub fn enforce(
    decision: Decision,
    session: &SessionContext,
    requested: Option<&str>,
) -> ApiResult<Option<HttpResponse>> {
    let Decision::Deny(reason) = decision else {
        return Ok(None);
    };

    debug!(%reason, "users action denied");
    let response = match reason {
        DenyReason::Unauthenticated => {
            if let Some(path) = requested {
                session.remember_return_to(path)?;
            }
            see_other(SIGNIN_PATH)
        }
        DenyReason::WrongUser | DenyReason::NotAdmin | DenyReason::AlreadyAuthenticated => {
            see_other(ROOT_PATH)
        }
        DenyReason::SelfDeleteBlocked => {
            session.set_flash(SELF_DELETE_NOTICE)?;
            see_other(USERS_PATH)
        }
    };
    Ok(Some(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use rstest::rstest;

    use crate::domain::policy::Decision;

    fn location(res: &HttpResponse) -> String {
        res.headers()
            .get(header::LOCATION)
            .expect("location header")
            .to_str()
            .expect("ascii header")
            .to_owned()
    }

    #[rstest]
    #[case(DenyReason::WrongUser, "/")]
    #[case(DenyReason::NotAdmin, "/")]
    #[case(DenyReason::AlreadyAuthenticated, "/")]
    #[case(DenyReason::Unauthenticated, "/signin")]
    #[case(DenyReason::SelfDeleteBlocked, "/users")]
    #[actix_web::test]
    async fn denials_redirect_to_their_destination(
        #[case] reason: DenyReason,
        #[case] expected: String,
    ) {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/probe",
                    web::get().to(move |session: SessionContext| async move {
                        let denied = enforce(Decision::Deny(reason), &session, None)?
                            .ok_or_else(|| Error::internal("expected a denial response"))?;
                        Ok::<_, Error>(denied)
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/probe").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let loc = res
            .headers()
            .get(header::LOCATION)
            .expect("location header")
            .to_str()
            .expect("ascii header");
        assert_eq!(loc, expected);
    }

    #[actix_web::test]
    async fn allow_produces_no_response() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/probe",
                    web::get().to(|session: SessionContext| async move {
                        let outcome = enforce(Decision::Allow, &session, Some("/users"))?;
                        let body = if outcome.is_none() { "allowed" } else { "denied" };
                        Ok::<_, Error>(HttpResponse::Ok().body(body))
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/probe").to_request()).await;
        let body = test::read_body(res).await;
        assert_eq!(body, "allowed");
    }

    #[::core::prelude::v1::test]
    fn see_other_sets_location() {
        let res = see_other("/somewhere");
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/somewhere");
    }

    mod current_user_resolution {
        use super::*;
        use crate::domain::ports::MockUserRepository;
        use crate::domain::{DisplayName, EmailAddress, PasswordHash, User, UserId};
        use crate::inbound::http::session::SessionContext;
        use actix_web::HttpResponse;

        fn stored(id: UserId) -> User {
            User::new(
                id,
                EmailAddress::new("ada@example.com").expect("fixture email"),
                DisplayName::new("Ada Lovelace").expect("fixture name"),
                PasswordHash::new("$argon2id$v=19$m=8192,t=1,p=1$c2FsdA$aGFzaA")
                    .expect("fixture hash"),
                false,
            )
        }

        fn resolution_app(
            repo_factory: fn() -> MockUserRepository,
        ) -> actix_web::App<
            impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
        > {
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&UserId::random())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/probe",
                    web::get().to(move |session: SessionContext| async move {
                        let repo = repo_factory();
                        let user = current_user(&session, &repo).await?;
                        let outcome = match (user, session.user_id()?) {
                            (Some(_), _) => "user",
                            (None, Some(_)) => "anonymous-stale",
                            (None, None) => "anonymous",
                        };
                        Ok::<_, Error>(HttpResponse::Ok().body(outcome))
                    }),
                )
        }

        async fn probe_with_session(repo_factory: fn() -> MockUserRepository) -> String {
            let app = test::init_service(resolution_app(repo_factory)).await;
            let set_res =
                test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
            let cookie = set_res
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .expect("session cookie set")
                .into_owned();

            let res = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/probe")
                    .cookie(cookie)
                    .to_request(),
            )
            .await;
            let body = test::read_body(res).await;
            String::from_utf8(body.to_vec()).expect("utf8 body")
        }

        #[actix_web::test]
        async fn resolves_the_stored_user() {
            let outcome = probe_with_session(|| {
                let mut repo = MockUserRepository::new();
                repo.expect_find_by_id()
                    .returning(|id| Ok(Some(stored(*id))));
                repo
            })
            .await;
            assert_eq!(outcome, "user");
        }

        #[actix_web::test]
        async fn purges_sessions_referencing_deleted_users() {
            let outcome = probe_with_session(|| {
                let mut repo = MockUserRepository::new();
                repo.expect_find_by_id().returning(|_| Ok(None));
                repo
            })
            .await;
            assert_eq!(outcome, "anonymous");
        }

        #[actix_web::test]
        async fn connection_failures_surface_as_service_unavailable() {
            let app = test::init_service(resolution_app(|| {
                let mut repo = MockUserRepository::new();
                repo.expect_find_by_id().returning(|_| {
                    Err(crate::domain::ports::UserPersistenceError::connection(
                        "database unavailable",
                    ))
                });
                repo
            }))
            .await;
            let set_res =
                test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
            let cookie = set_res
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .expect("session cookie set")
                .into_owned();

            let res = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/probe")
                    .cookie(cookie)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }
}
