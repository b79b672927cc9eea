//! HTTP inbound adapter serving the site's pages and redirects.

use actix_web::HttpResponse;

pub mod authz;
pub mod error;
pub mod health;
pub mod pages;
pub mod session;
pub mod session_config;
pub mod sessions;
pub mod site;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Wrap a rendered page in a `200 OK` HTML response.
pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
