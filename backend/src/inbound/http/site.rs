//! Static site pages.

use actix_web::{HttpResponse, get, web};

use super::authz::current_user;
use super::pages;
use super::session::SessionContext;
use super::state::HttpState;
use super::{ApiResult, html};

/// Home page.
#[get("/")]
pub async fn home(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let viewer = current_user(&session, state.users.as_ref()).await?;
    Ok(html(pages::home(viewer.as_ref())))
}
