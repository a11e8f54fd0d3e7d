//! Session Manager
//!
//! Facade over the cookie factory that the handlers talk to. Owns the
//! `Secure`-attribute policy (derived from the trusted portal base URL and
//! the production flag) and the cookie name, and turns inbound requests into
//! a three-way session lookup result.

use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use anyhow::Result;
use url::Url;

use crate::models::SessionRecord;
use crate::session::cookie::{decode_cookie_value, CookieFactory};
use crate::settings::RamsgateSettings;

/// Outcome of looking up the session cookie on a request
///
/// `Missing` and `Invalid` are distinct on purpose: an absent cookie may be
/// eligible for the development bypass, while an undecodable one is always an
/// authentication failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// No session cookie on the request (or an already-cleared empty one)
    Missing,
    /// A non-empty cookie that failed to decode to a usable record
    Invalid,
    /// A decoded session, from either the structured or the legacy format
    Found(SessionRecord),
}

/// Session manager for cookie-backed bridge sessions
#[derive(Clone)]
pub struct SessionManager {
    cookie_factory: CookieFactory,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// The `Secure` cookie attribute is set when the portal base URL itself
    /// is served over https or when the runtime is flagged production;
    /// otherwise it stays off so plain-http local development keeps working.
    #[must_use]
    pub fn new(
        cookie_name: &str,
        session_ttl_hours: u64,
        portal_base_url: &str,
        production: bool,
    ) -> Self {
        let portal_is_https = Url::parse(portal_base_url)
            .map(|url| url.scheme() == "https")
            .unwrap_or(false);
        let cookie_secure = portal_is_https || production;

        Self {
            cookie_factory: CookieFactory::new(
                cookie_name.to_string(),
                cookie_secure,
                session_ttl_hours,
            ),
        }
    }

    /// Build a session manager from loaded settings
    #[must_use]
    pub fn from_settings(settings: &RamsgateSettings) -> Self {
        Self::new(
            &settings.session.cookie_name,
            settings.session.ttl_hours,
            &settings.portal.base_url,
            settings.application.production,
        )
    }

    /// Issue a session cookie for a record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized
    pub fn issue(&self, record: &SessionRecord) -> Result<Cookie<'static>> {
        self.cookie_factory.session_cookie(record)
    }

    /// Create an expired cookie that clears the session
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        self.cookie_factory.expired_cookie()
    }

    /// Look up and decode the session cookie on a request
    #[must_use]
    pub fn lookup(&self, req: &HttpRequest) -> SessionLookup {
        let Some(cookie) = req.cookie(self.cookie_factory.cookie_name()) else {
            return SessionLookup::Missing;
        };
        if cookie.value().is_empty() {
            return SessionLookup::Missing;
        }
        match decode_cookie_value(cookie.value()) {
            Some(payload) => SessionLookup::Found(payload.into_record()),
            None => SessionLookup::Invalid,
        }
    }

    /// Whether cookies are issued with the `Secure` attribute
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_factory.cookie_secure()
    }

    /// Name of the session cookie
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        self.cookie_factory.cookie_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::cookie::DEFAULT_COOKIE_NAME;
    use crate::testing::RequestBuilder;

    fn manager() -> SessionManager {
        SessionManager::new(DEFAULT_COOKIE_NAME, 5, "http://localhost:4000", false)
    }

    #[test]
    fn test_secure_flag_follows_portal_scheme() {
        let plain = SessionManager::new(DEFAULT_COOKIE_NAME, 5, "http://localhost:4000", false);
        assert!(!plain.cookie_secure());

        let https = SessionManager::new(DEFAULT_COOKIE_NAME, 5, "https://portal.example", false);
        assert!(https.cookie_secure());

        let production = SessionManager::new(DEFAULT_COOKIE_NAME, 5, "http://portal.internal", true);
        assert!(production.cookie_secure());
    }

    #[test]
    fn test_issue_then_lookup_round_trip() {
        let manager = manager();
        let record = SessionRecord {
            uid: "user-123".to_string(),
            email: Some("user@example.com".to_string()),
            display_name: None,
        };

        let cookie = manager.issue(&record).unwrap();
        let req = RequestBuilder::new()
            .with_session_cookie(cookie.value().to_string())
            .to_http_request();

        assert_eq!(manager.lookup(&req), SessionLookup::Found(record));
    }

    #[test]
    fn test_lookup_without_cookie_is_missing() {
        let req = RequestBuilder::new().to_http_request();
        assert_eq!(manager().lookup(&req), SessionLookup::Missing);
    }

    #[test]
    fn test_lookup_with_cleared_cookie_is_missing() {
        let req = RequestBuilder::new()
            .with_session_cookie(String::new())
            .to_http_request();
        assert_eq!(manager().lookup(&req), SessionLookup::Missing);
    }

    #[test]
    fn test_lookup_with_garbage_json_is_invalid() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

        // Valid JSON without a uid: authentication failure, not legacy.
        let value = URL_SAFE_NO_PAD.encode(r#"{"email":"x@example.com"}"#);
        let req = RequestBuilder::new()
            .with_session_cookie(value)
            .to_http_request();
        assert_eq!(manager().lookup(&req), SessionLookup::Invalid);
    }

    #[test]
    fn test_lookup_with_legacy_cookie_is_found() {
        let req = RequestBuilder::new()
            .with_session_cookie("plain-legacy-uid".to_string())
            .to_http_request();

        match manager().lookup(&req) {
            SessionLookup::Found(record) => {
                assert_eq!(record.uid, "plain-legacy-uid");
                assert_eq!(record.email, None);
            }
            other => panic!("expected legacy session, got {other:?}"),
        }
    }
}
