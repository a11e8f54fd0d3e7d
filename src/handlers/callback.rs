//! Portal callback handler
//!
//! First landing point after the portal authenticates a user: the browser
//! arrives with a one-time signed token in the query string. A valid token
//! becomes a session cookie and a 302 to the sanitized redirect target; an
//! absent, forged, expired or wrong-application token sends the browser back
//! to the portal login page instead. Either way the response is a pure
//! redirect with no body.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error};
use serde::Deserialize;

use crate::models::SessionRecord;
use crate::portal::token::verify_portal_token;
use crate::portal::urls::login_url;
use crate::session::SessionManager;
use crate::settings::RamsgateSettings;
use crate::utils::redirect::{absolute_redirect, request_origin};
use crate::utils::responses;

#[derive(Deserialize)]
pub struct CallbackQuery {
    #[serde(rename = "portalToken")]
    pub portal_token: Option<String>,
    pub redirect: Option<String>,
}

/// Portal callback endpoint (`GET /portal-callback`, also `/portal/callback`)
pub async fn portal_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    settings: web::Data<RamsgateSettings>,
    session_manager: web::Data<SessionManager>,
) -> HttpResponse {
    let origin = request_origin(&req);
    let return_to = absolute_redirect(query.redirect.as_deref(), &origin);

    let Some(token) = query.portal_token.as_deref() else {
        debug!("portal callback without token; sending browser to portal login");
        return responses::redirect(&login_url(&settings.portal.base_url, &return_to));
    };

    let now_ms = Utc::now().timestamp_millis();
    let Some(claims) = verify_portal_token(
        token,
        settings.portal.shared_secret.as_bytes(),
        &settings.portal.app_id,
        now_ms,
    ) else {
        // Covers forged signatures, expiry and wrong-application tokens; all
        // are a normal unauthenticated state, not a server error.
        debug!("portal token rejected; sending browser to portal login");
        return responses::redirect(&login_url(&settings.portal.base_url, &return_to));
    };

    let record = SessionRecord::from(claims);
    match session_manager.issue(&record) {
        Ok(cookie) => responses::redirect_with_cookie(&return_to, cookie),
        Err(err) => {
            error!("failed to issue session cookie for uid {}: {err}", record.uid);
            responses::redirect(&login_url(&settings.portal.base_url, &return_to))
        }
    }
}
