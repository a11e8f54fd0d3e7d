//! HTTP response helpers for the session bridge
//!
//! Every response on the session paths carries `Cache-Control: no-store`;
//! session material must never land in a shared cache. The helpers here keep
//! that invariant in one place instead of at every handler return site.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpResponse, HttpResponseBuilder};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::json;

/// Methods accepted by the session exchange endpoint
pub const ALLOWED_METHODS: &str = "GET,POST,HEAD";

/// Pre-serialized 405 body; the only response whose content never varies
static METHOD_NOT_ALLOWED_BODY: Lazy<String> = Lazy::new(|| {
    serde_json::to_string(&json!({
        "error": "method_not_allowed",
        "message": "Only GET, POST and HEAD are accepted",
    }))
    .expect("static JSON body serializes")
});

/// Apply the no-store cache policy to a response builder
fn no_store(mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
    builder.insert_header((header::CACHE_CONTROL, "no-store"));
    builder
}

/// 200 JSON response with the no-store policy and optional extra cookie
pub fn ok_json<T: Serialize>(body: &T, cookie: Option<Cookie<'static>>) -> HttpResponse {
    let mut builder = no_store(HttpResponse::Ok());
    if let Some(cookie) = cookie {
        builder.cookie(cookie);
    }
    builder.json(body)
}

/// 401 with a portal launch URL the client can use to re-authenticate
///
/// Always clears the session cookie; an unauthenticated caller holding a
/// stale cookie would otherwise loop forever.
pub fn unauthenticated(launch: &str, clear_cookie: Cookie<'static>) -> HttpResponse {
    no_store(HttpResponse::Unauthorized())
        .cookie(clear_cookie)
        .json(json!({
            "error": "unauthenticated",
            "launch": launch,
        }))
}

/// 500 with a portal logout URL as the caller's recovery path
///
/// Forces the client to restart the flow instead of retrying a request that
/// keeps failing against the identity directory.
pub fn identity_failure(logout: &str) -> HttpResponse {
    no_store(HttpResponse::InternalServerError()).json(json!({
        "error": "identity_sync_failed",
        "logout": logout,
    }))
}

/// 405 enumerating the accepted methods
pub fn method_not_allowed() -> HttpResponse {
    no_store(HttpResponse::MethodNotAllowed())
        .insert_header((header::ALLOW, ALLOWED_METHODS))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .body(METHOD_NOT_ALLOWED_BODY.clone())
}

/// 302 redirect with the no-store policy
pub fn redirect(location: &str) -> HttpResponse {
    no_store(HttpResponse::Found())
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// 302 redirect that also sets a cookie
pub fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> HttpResponse {
    no_store(HttpResponse::Found())
        .cookie(cookie)
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_responses_are_no_store() {
        let clear = Cookie::new("ramsgate_session", "");
        for response in [
            ok_json(&json!({"ok": true}), None),
            unauthenticated("https://portal.example/launch/rams", clear),
            identity_failure("https://portal.example/login?logout=1"),
            method_not_allowed(),
            redirect("https://app.example/"),
        ] {
            assert_eq!(
                response
                    .headers()
                    .get(header::CACHE_CONTROL)
                    .and_then(|value| value.to_str().ok()),
                Some("no-store")
            );
        }
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let response = method_not_allowed();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response
                .headers()
                .get(header::ALLOW)
                .and_then(|value| value.to_str().ok()),
            Some(ALLOWED_METHODS)
        );
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = redirect("https://app.example/dashboard");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("https://app.example/dashboard")
        );
    }
}
