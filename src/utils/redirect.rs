//! Redirect sanitization and request origin derivation
//!
//! Every redirect this application hands back to a browser, whether in a
//! `Location` header, a JSON body or embedded in a portal URL, must resolve
//! to the same origin as the request that supplied it. Anything cross-origin
//! or unparseable collapses to `/` silently; neutralizing an open-redirect
//! attempt is a security control, not a user-facing error.

use actix_web::http::header::{self, HeaderMap};
use actix_web::HttpRequest;
use std::net::SocketAddr;
use url::Url;

/// Sanitize a client-supplied redirect target against a trusted origin
///
/// Returns a same-origin relative path (`pathname + search + hash`),
/// defaulting to `/`. A raw value starting with `/` is accepted verbatim only
/// when URL resolution itself fails.
#[must_use]
pub fn sanitize_redirect(candidate: Option<&str>, origin: &str) -> String {
    let Some(raw) = candidate.filter(|value| !value.is_empty()) else {
        return "/".to_string();
    };

    let Ok(base) = Url::parse(origin) else {
        return fallback_path(raw);
    };
    let Ok(resolved) = base.join(raw) else {
        return fallback_path(raw);
    };

    if resolved.origin() != base.origin() {
        return "/".to_string();
    }

    let mut target = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = resolved.fragment() {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// Last-resort handling when URL parsing fails outright
fn fallback_path(raw: &str) -> String {
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        "/".to_string()
    }
}

/// Sanitize a redirect target and resolve it to an absolute URL
///
/// Used wherever the redirect is embedded in a cross-service handoff, so the
/// portal can send the browser back to an unambiguous location.
#[must_use]
pub fn absolute_redirect(candidate: Option<&str>, origin: &str) -> String {
    format!(
        "{}{}",
        origin.trim_end_matches('/'),
        sanitize_redirect(candidate, origin)
    )
}

/// Derive the request origin from headers and the socket's local address
///
/// Honors `X-Forwarded-Proto` / `X-Forwarded-Host` (first value each) as set
/// by the fronting proxy, then the `Host` header, then the local address the
/// socket is bound to. This is the single derivation point every handler
/// shares; keeping it pure over its inputs keeps the policy testable.
#[must_use]
pub fn derive_origin(headers: &HeaderMap, local_addr: SocketAddr) -> String {
    let proto = first_header_value(headers, "x-forwarded-proto").unwrap_or("http");
    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
        })
        .map_or_else(|| local_addr.to_string(), ToOwned::to_owned);
    format!("{proto}://{host}")
}

/// First comma-separated value of a header, trimmed
fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Origin of an inbound request
#[must_use]
pub fn request_origin(req: &HttpRequest) -> String {
    derive_origin(req.headers(), req.app_config().local_addr())
}
