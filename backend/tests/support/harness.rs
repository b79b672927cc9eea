//! Server harness and shared world for the authentication suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The `WorldFixture` ensures the server
//! is stopped even if a test panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{HttpServer, web};
use argon2::ParamsBuilder;
use awc::Client;
use rstest::fixture;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use roster::domain::ports::{LoginService, PasswordLoginService, UserRepository};
use roster::domain::{DisplayName, EmailAddress, PasswordVault, User, UserId};
use roster::inbound::http::health::HealthState;
use roster::inbound::http::state::HttpState;
use roster::outbound::persistence::InMemoryUserRepository;
use roster::server::{AppDependencies, build_app};

/// Password shared by every seeded account.
pub(crate) const FIXTURE_PASSWORD: &str = "foobar";

/// Fast Argon2 parameters so the suite does not pay production hashing cost.
fn test_vault() -> PasswordVault {
    let params = ParamsBuilder::new()
        .m_cost(8 * 1024)
        .t_cost(1)
        .p_cost(1)
        .output_len(32)
        .build()
        .expect("test Argon2 parameters");
    PasswordVault::with_params(params)
}

fn seeded_user(vault: &PasswordVault, name: &str, email: &str, admin: bool) -> User {
    User::new(
        UserId::random(),
        EmailAddress::new(email).expect("fixture email"),
        DisplayName::new(name).expect("fixture name"),
        vault.hash(FIXTURE_PASSWORD).expect("fixture password hash"),
        admin,
    )
}

pub(crate) struct AuthWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) users: Arc<InMemoryUserRepository>,
    pub(crate) user: User,
    pub(crate) wrong_user: User,
    pub(crate) admin: User,
    pub(crate) seeded_count: u64,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_location: Option<String>,
    pub(crate) last_body: Option<String>,
    pub(crate) session_cookie: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<AuthWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we lock the
    // world while calling `block_on`. The future must not try to lock the
    // world.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// Current stored user count, for mutation assertions.
pub(crate) fn user_count(world: &SharedWorld) -> u64 {
    let ctx = world.borrow();
    let users = ctx.users.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        users.count().await.expect("count succeeds")
    })
}

/// Fetch a stored user by id, for mutation assertions.
pub(crate) fn stored_user(world: &SharedWorld, id: &UserId) -> Option<User> {
    let ctx = world.borrow();
    let users = ctx.users.clone();
    let id = *id;
    ctx.local.block_on(&ctx.runtime, async move {
        users.find_by_id(&id).await.expect("lookup succeeds")
    })
}

/// Issue a request, recording status, location, body, and any session cookie.
pub(crate) fn perform(
    world: &SharedWorld,
    method: Method,
    path: &str,
    include_cookie: bool,
    form: Option<Vec<(String, String)>>,
) {
    let cookie = include_cookie
        .then(|| world.borrow().session_cookie.clone())
        .flatten();
    let path = path.to_owned();
    let (status, location, set_cookie, body) = with_world_async(world, |base_url| async move {
        let client = Client::builder().disable_redirects().finish();
        let mut request = client.request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match form {
            Some(fields) => request.send_form(&fields).await.expect("request succeeds"),
            None => request.send().await.expect("request succeeds"),
        };
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_owned());
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.to_owned());
        let body_bytes = response.body().await.expect("body read succeeds");
        let body = String::from_utf8(body_bytes.to_vec()).expect("utf8 body");
        (status, location, set_cookie, body)
    });

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_location = location;
    ctx.last_body = Some(body);
    if let Some(cookie) = set_cookie {
        ctx.session_cookie = Some(cookie);
    }
}

/// Follow the last redirect and return the rendered page.
pub(crate) fn follow_last_location(world: &SharedWorld) -> String {
    let location = world
        .borrow()
        .last_location
        .clone()
        .expect("a redirect to follow");
    perform(world, Method::GET, &location, true, None);
    world.borrow().last_body.clone().expect("page body")
}

/// Sign in through the form, carrying any existing session cookie.
pub(crate) fn submit_signin(world: &SharedWorld, email: &str, password: &str) {
    perform(
        world,
        Method::POST,
        "/signin",
        true,
        Some(vec![
            ("email".to_owned(), email.to_owned()),
            ("password".to_owned(), password.to_owned()),
        ]),
    );
}

fn spawn_site_server(
    http_state: web::Data<HttpState>,
) -> impl std::future::Future<Output = Result<(String, ServerHandle), String>> {
    async move {
        let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
        let addr = listener.local_addr().map_err(|err| err.to_string())?;
        let key = Key::generate();
        let health_state = web::Data::new(HealthState::new());

        let server = HttpServer::new(move || {
            build_app(AppDependencies {
                health_state: health_state.clone(),
                http_state: http_state.clone(),
                key: key.clone(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            })
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .map_err(|err| err.to_string())?
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Ok((format!("http://{addr}"), handle))
    }
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    let vault = test_vault();
    let user = seeded_user(&vault, "Example User", "user@example.com", false);
    let wrong_user = seeded_user(&vault, "Wrong User", "wrong@example.com", false);
    let admin = seeded_user(&vault, "Admin User", "admin@example.com", true);
    let users = Arc::new(InMemoryUserRepository::with_users([
        user.clone(),
        wrong_user.clone(),
        admin.clone(),
    ]));

    let repo: Arc<dyn UserRepository> = users.clone();
    let login: Arc<dyn LoginService> =
        Arc::new(PasswordLoginService::new(repo.clone(), vault.clone()));
    let http_state = web::Data::new(HttpState::new(repo, login, vault));

    let (base_url, server) = local
        .block_on(&runtime, spawn_site_server(http_state))
        .expect("server should start");

    let world = Rc::new(RefCell::new(AuthWorld {
        runtime,
        local,
        base_url,
        server,
        users,
        user,
        wrong_user,
        admin,
        seeded_count: 3,
        last_status: None,
        last_location: None,
        last_body: None,
        session_cookie: None,
    }));

    WorldFixture { world }
}
