use actix_web::cookie::{Cookie, SameSite};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;

use crate::models::SessionRecord;

/// Default session cookie name, overridable via configuration
pub const DEFAULT_COOKIE_NAME: &str = "ramsgate_session";

/// Default session lifetime in hours
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 5;

/// Decoded content of a session cookie value
///
/// The cookie has two accepted wire forms. The current form is base64url JSON
/// carrying a [`SessionRecord`]; the legacy form, still honored for sessions
/// issued before the structured payload existed, is the bare user id as the
/// whole cookie value. Keeping the two as distinct variants lets callers see
/// which path a request took, and keeps the legacy fallback from swallowing
/// structured payloads that are merely invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookiePayload {
    /// Structured base64url JSON payload
    Session(SessionRecord),
    /// Pre-JSON cookie format: the raw value is the user id
    LegacyUid(String),
}

impl CookiePayload {
    /// Collapse either variant into the session record the handlers work with
    #[must_use]
    pub fn into_record(self) -> SessionRecord {
        match self {
            Self::Session(record) => record,
            Self::LegacyUid(uid) => SessionRecord {
                uid,
                email: None,
                display_name: None,
            },
        }
    }
}

/// Serialize a session record into a cookie value
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn encode_session(record: &SessionRecord) -> Result<String> {
    let json = serde_json::to_string(record).context("failed to serialize session record")?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a session cookie value
///
/// Returns `None` when the value is a structured payload that fails
/// validation (valid JSON without a usable `uid`); that is an authentication
/// failure, not a candidate for the legacy fallback. A value that does not
/// decode to JSON at all is treated as a legacy bare-uid cookie.
#[must_use]
pub fn decode_cookie_value(value: &str) -> Option<CookiePayload> {
    if value.is_empty() {
        return None;
    }

    let Some(json) = URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return Some(CookiePayload::LegacyUid(value.to_owned()));
    };
    let Ok(parsed) = serde_json::from_str::<Value>(&json) else {
        return Some(CookiePayload::LegacyUid(value.to_owned()));
    };

    let obj = parsed.as_object()?;
    let uid = obj.get("uid")?.as_str()?;
    if uid.is_empty() {
        return None;
    }

    Some(CookiePayload::Session(SessionRecord {
        uid: uid.to_owned(),
        email: obj.get("email").and_then(Value::as_str).map(ToOwned::to_owned),
        display_name: obj
            .get("displayName")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    }))
}

/// Cookie factory for the session cookie
///
/// Centralizes the attribute policy so issuance and clearing always agree on
/// name, path and flags.
#[derive(Clone)]
pub struct CookieFactory {
    cookie_name: String,
    cookie_secure: bool,
    session_ttl_hours: u64,
}

impl CookieFactory {
    /// Create a new cookie factory with the specified configuration
    #[must_use]
    pub fn new(cookie_name: String, cookie_secure: bool, session_ttl_hours: u64) -> Self {
        Self {
            cookie_name,
            cookie_secure,
            session_ttl_hours,
        }
    }

    /// Name of the session cookie
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Whether cookies are issued with the `Secure` attribute
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Create the session cookie for a record
    ///
    /// `SameSite=Lax` is required: the portal callback arrives as a top-level
    /// cross-site navigation and the cookie must be sent on the follow-up
    /// same-site requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized
    pub fn session_cookie(&self, record: &SessionRecord) -> Result<Cookie<'static>> {
        let value = encode_session(record)?;
        let max_age = i64::try_from(self.session_ttl_hours * 3600)
            .unwrap_or(i64::from(u32::MAX));

        Ok(Cookie::build(self.cookie_name.clone(), value)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(max_age))
            .finish())
    }

    /// Create an expired cookie to clear the session
    ///
    /// Same name, path and flags as issuance, empty value, `Max-Age=0`.
    /// Deliberately carries no `Expires` timestamp so repeated calls produce
    /// identical cookies.
    #[must_use]
    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone(), "")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(actix_web::cookie::time::Duration::ZERO)
            .finish()
    }
}
