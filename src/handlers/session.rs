//! Session exchange handler
//!
//! The endpoint the client application polls to turn its session cookie (or,
//! in development, the bypass configuration) into a downstream identity
//! token. The request moves through a small state machine:
//!
//! - cookie present and decodable -> authenticated
//! - cookie present but undecodable -> rejected (401, cookie cleared)
//! - cookie absent, dev bypass enabled -> authenticated with a synthetic
//!   session, and a fresh cookie is issued so later requests take the normal
//!   path
//! - cookie absent otherwise -> rejected (401)
//!
//! An authenticated request is then synchronized against the identity
//! directory and answered with `{token, email, displayName, uid, redirect}`.
//! Directory failures are the one 500 on this surface and carry a portal
//! logout URL so the client can restart the flow.

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, warn};
use serde::Deserialize;

use crate::identity::{sync_session, SharedIdentityProvider};
use crate::models::{SessionExchangeResponse, SessionRecord};
use crate::portal::urls::{launch_url, logout_url};
use crate::session::{SessionLookup, SessionManager};
use crate::settings::RamsgateSettings;
use crate::utils::redirect::{absolute_redirect, request_origin, sanitize_redirect};
use crate::utils::responses;

#[derive(Deserialize)]
pub struct ExchangeQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize)]
pub struct ExchangeBody {
    pub redirect: Option<String>,
}

/// Session exchange endpoint (`GET|POST|HEAD /session`, also `/api/session`)
pub async fn session_exchange(
    req: HttpRequest,
    query: web::Query<ExchangeQuery>,
    body: Option<web::Json<ExchangeBody>>,
    settings: web::Data<RamsgateSettings>,
    session_manager: web::Data<SessionManager>,
    identity: web::Data<SharedIdentityProvider>,
) -> HttpResponse {
    let method = req.method();
    if method != Method::GET && method != Method::POST && method != Method::HEAD {
        return responses::method_not_allowed();
    }

    let origin = request_origin(&req);
    let redirect_param = body
        .as_ref()
        .and_then(|body| body.redirect.clone())
        .or_else(|| query.redirect.clone());
    let redirect = sanitize_redirect(redirect_param.as_deref(), &origin);
    let return_to = absolute_redirect(redirect_param.as_deref(), &origin);

    // A fresh cookie is only attached when the dev bypass promotes itself
    // into a regular session.
    let mut reissued_cookie: Option<Cookie<'static>> = None;

    let record = match session_manager.lookup(&req) {
        SessionLookup::Found(record) => record,
        SessionLookup::Invalid => {
            debug!("session cookie failed to decode; rejecting");
            return reject(&settings, &session_manager, &return_to);
        }
        SessionLookup::Missing => {
            if settings.dev_bypass.enabled {
                let record = SessionRecord {
                    uid: settings.dev_bypass.uid.clone(),
                    email: settings.dev_bypass.email.clone(),
                    display_name: settings.dev_bypass.display_name.clone(),
                };
                warn!("dev bypass active: synthesizing session for uid {}", record.uid);
                match session_manager.issue(&record) {
                    Ok(cookie) => reissued_cookie = Some(cookie),
                    Err(err) => {
                        error!("failed to issue bypass session cookie: {err}");
                        return responses::identity_failure(&logout_url(
                            &settings.portal.base_url,
                            &return_to,
                        ));
                    }
                }
                record
            } else {
                return reject(&settings, &session_manager, &return_to);
            }
        }
    };

    match sync_session(identity.get_ref().as_ref(), &record).await {
        Ok((user, token)) => responses::ok_json(
            &SessionExchangeResponse {
                token,
                email: user.email,
                display_name: user.display_name,
                uid: user.uid,
                redirect,
            },
            reissued_cookie,
        ),
        Err(err) => {
            error!("identity sync failed for uid {}: {err}", record.uid);
            responses::identity_failure(&logout_url(&settings.portal.base_url, &return_to))
        }
    }
}

/// 401 with the portal launch URL and a cleared session cookie
fn reject(
    settings: &RamsgateSettings,
    session_manager: &SessionManager,
    return_to: &str,
) -> HttpResponse {
    let launch = launch_url(&settings.portal.base_url, &settings.portal.app_id, return_to);
    responses::unauthenticated(&launch, session_manager.clear())
}
