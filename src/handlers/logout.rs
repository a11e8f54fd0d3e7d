//! Logout handler
//!
//! Clears the session cookie unconditionally and hands the browser (or the
//! calling script) the portal logout URL. GET answers with a 302 for plain
//! links; POST answers `{redirect}` as JSON for programmatic logout.

use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::portal::urls::logout_url;
use crate::session::SessionManager;
use crate::settings::RamsgateSettings;
use crate::utils::redirect::{absolute_redirect, request_origin};
use crate::utils::responses;

#[derive(Deserialize)]
pub struct LogoutQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize)]
pub struct LogoutBody {
    pub redirect: Option<String>,
}

/// Logout endpoint (`GET|POST /logout`, also `/api/logout`)
pub async fn logout(
    req: HttpRequest,
    query: web::Query<LogoutQuery>,
    body: Option<web::Json<LogoutBody>>,
    settings: web::Data<RamsgateSettings>,
    session_manager: web::Data<SessionManager>,
) -> HttpResponse {
    let origin = request_origin(&req);
    let redirect_param = body
        .as_ref()
        .and_then(|body| body.redirect.clone())
        .or_else(|| query.redirect.clone());
    let return_to = absolute_redirect(redirect_param.as_deref(), &origin);
    let target = logout_url(&settings.portal.base_url, &return_to);

    debug!("clearing session and handing off to portal logout");
    let clear_cookie = session_manager.clear();

    if req.method() == Method::POST {
        responses::ok_json(&json!({ "redirect": target }), Some(clear_cookie))
    } else {
        responses::redirect_with_cookie(&target, clear_cookie)
    }
}
