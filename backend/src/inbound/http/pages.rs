//! Server-rendered pages for the site.
//!
//! No templating engine is involved; each page is a small string-composed
//! document sharing one layout. The layout owns the `<title>` and the
//! session-aware navigation, so access-control outcomes (which links exist
//! for whom) are decided in exactly one place.

use std::fmt::Write as _;

use crate::domain::{User, UserId};

/// Site name appended to every page title.
pub const SITE_NAME: &str = "Roster";

/// Path of the sign-in page.
pub const SIGNIN_PATH: &str = "/signin";
/// Path of the sign-out endpoint.
pub const SIGNOUT_PATH: &str = "/signout";
/// Path of the users index.
pub const USERS_PATH: &str = "/users";
/// Path of the registration form.
pub const SIGNUP_PATH: &str = "/users/new";
/// Path of the home page.
pub const ROOT_PATH: &str = "/";

/// Path of a user's profile page.
pub fn user_path(id: &UserId) -> String {
    format!("{USERS_PATH}/{id}")
}

/// Path of a user's settings (edit) page.
pub fn edit_user_path(id: &UserId) -> String {
    format!("{USERS_PATH}/{id}/edit")
}

/// Compose the document title for a page.
pub fn full_title(page_title: &str) -> String {
    if page_title.is_empty() {
        SITE_NAME.to_owned()
    } else {
        format!("{page_title} | {SITE_NAME}")
    }
}

/// Escape text for safe interpolation into HTML content and attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn nav(viewer: Option<&User>) -> String {
    let mut items = String::new();
    let _ = write!(items, r#"<li><a href="{ROOT_PATH}">Home</a></li>"#);
    match viewer {
        Some(user) => {
            let profile = user_path(user.id());
            let settings = edit_user_path(user.id());
            let _ = write!(
                items,
                concat!(
                    r#"<li><a href="{users}">Users</a></li>"#,
                    r#"<li><a href="{profile}">Profile</a></li>"#,
                    r#"<li><a href="{settings}">Settings</a></li>"#,
                    r#"<li><a href="{signout}" data-method="post">Sign out</a></li>"#,
                ),
                users = USERS_PATH,
                profile = profile,
                settings = settings,
                signout = SIGNOUT_PATH,
            );
        }
        None => {
            let _ = write!(items, r#"<li><a href="{SIGNIN_PATH}">Sign in</a></li>"#);
        }
    }

    format!(
        concat!(
            r#"<header class="navbar"><a id="logo" href="{root}">{site}</a>"#,
            r#"<nav><ul class="nav navbar-nav">{items}</ul></nav></header>"#,
        ),
        root = ROOT_PATH,
        site = SITE_NAME,
        items = items,
    )
}

fn alert_danger(message: &str) -> String {
    format!(
        r#"<div class="alert alert-danger">{}</div>"#,
        escape(message)
    )
}

/// Assemble a full document around the given body.
pub fn layout(page_title: &str, viewer: Option<&User>, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">",
            "<title>{title}</title></head><body>{nav}",
            "<main class=\"container\">{body}</main></body></html>",
        ),
        title = escape(&full_title(page_title)),
        nav = nav(viewer),
        body = body,
    )
}

/// Home page.
pub fn home(viewer: Option<&User>) -> String {
    let body = format!(
        concat!(
            "<h1>Welcome to {site}</h1>",
            r#"<p>This is the {site} user directory.</p>"#,
            r#"<a class="btn" href="{signup}">Sign up now!</a>"#,
        ),
        site = SITE_NAME,
        signup = SIGNUP_PATH,
    );
    layout("Home", viewer, &body)
}

/// Sign-in form, optionally carrying a credential alert.
pub fn signin(viewer: Option<&User>, alert: Option<&str>, email_prefill: &str) -> String {
    let alert_html = alert.map(alert_danger).unwrap_or_default();
    let body = format!(
        concat!(
            "<h1>Sign in</h1>{alert}",
            r#"<form action="{signin}" method="post">"#,
            r#"<label for="email">Email</label>"#,
            r#"<input id="email" name="email" type="email" value="{email}">"#,
            r#"<label for="password">Password</label>"#,
            r#"<input id="password" name="password" type="password">"#,
            r#"<button type="submit">Sign in</button>"#,
            "</form>",
            r#"<p>New user? <a href="{signup}">Sign up now!</a></p>"#,
        ),
        alert = alert_html,
        signin = SIGNIN_PATH,
        email = escape(email_prefill),
        signup = SIGNUP_PATH,
    );
    layout("Sign in", viewer, &body)
}

/// Pre-filled values for the sign-up form.
#[derive(Debug, Default, Clone)]
pub struct SignupPrefill {
    pub name: String,
    pub email: String,
}

/// Registration form, optionally carrying a validation alert.
pub fn signup(alert: Option<&str>, prefill: &SignupPrefill) -> String {
    let alert_html = alert.map(alert_danger).unwrap_or_default();
    let body = format!(
        concat!(
            "<h1>Sign up</h1>{alert}",
            r#"<form action="{users}" method="post">"#,
            r#"<label for="name">Name</label>"#,
            r#"<input id="name" name="name" value="{name}">"#,
            r#"<label for="email">Email</label>"#,
            r#"<input id="email" name="email" type="email" value="{email}">"#,
            r#"<label for="password">Password</label>"#,
            r#"<input id="password" name="password" type="password">"#,
            r#"<label for="password_confirmation">Confirmation</label>"#,
            r#"<input id="password_confirmation" name="password_confirmation" type="password">"#,
            r#"<button type="submit">Create my account</button>"#,
            "</form>",
        ),
        alert = alert_html,
        users = USERS_PATH,
        name = escape(&prefill.name),
        email = escape(&prefill.email),
    );
    layout("Sign up", None, &body)
}

/// Users index listing every account.
///
/// Delete links render only for administrators and never against the
/// administrator's own row.
pub fn users_index(viewer: &User, users: &[User], flash: Option<&str>) -> String {
    let flash_html = flash.map(alert_danger).unwrap_or_default();
    let mut rows = String::new();
    for user in users {
        let _ = write!(
            rows,
            r#"<li><a href="{path}">{name}</a>"#,
            path = user_path(user.id()),
            name = escape(user.display_name().as_ref()),
        );
        if viewer.is_admin() && viewer.id() != user.id() {
            let _ = write!(
                rows,
                r#" | <a href="{path}" data-method="delete">delete</a>"#,
                path = user_path(user.id()),
            );
        }
        rows.push_str("</li>");
    }

    let body = format!(
        concat!(
            "{flash}<h1>All users</h1>",
            r#"<ul class="users">{rows}</ul>"#,
        ),
        flash = flash_html,
        rows = rows,
    );
    layout("All users", Some(viewer), &body)
}

/// A user's public profile page, titled with their name.
pub fn profile(viewer: Option<&User>, user: &User) -> String {
    let name = escape(user.display_name().as_ref());
    let body = format!(
        concat!(
            "<h1>{name}</h1>",
            r#"<p class="email">{email}</p>"#,
        ),
        name = name,
        email = escape(user.email().as_ref()),
    );
    layout(user.display_name().as_ref(), viewer, &body)
}

/// Settings form for editing the signed-in user's own account.
pub fn edit_user(viewer: &User, alert: Option<&str>) -> String {
    let alert_html = alert.map(alert_danger).unwrap_or_default();
    let body = format!(
        concat!(
            "<h1>Update your profile</h1>{alert}",
            r#"<form action="{action}" method="post">"#,
            r#"<input name="_method" type="hidden" value="patch">"#,
            r#"<label for="name">Name</label>"#,
            r#"<input id="name" name="name" value="{name}">"#,
            r#"<label for="email">Email</label>"#,
            r#"<input id="email" name="email" type="email" value="{email}">"#,
            r#"<label for="password">Password</label>"#,
            r#"<input id="password" name="password" type="password">"#,
            r#"<label for="password_confirmation">Confirmation</label>"#,
            r#"<input id="password_confirmation" name="password_confirmation" type="password">"#,
            r#"<button type="submit">Save changes</button>"#,
            "</form>",
        ),
        alert = alert_html,
        action = user_path(viewer.id()),
        name = escape(viewer.display_name().as_ref()),
        email = escape(viewer.email().as_ref()),
    );
    layout("Edit user", Some(viewer), &body)
}
