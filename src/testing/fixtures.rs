//! Test fixtures providing pre-built test objects

use chrono::Utc;
use serde_json::{json, Value};

use crate::models::SessionRecord;
use crate::portal::token::sign_portal_payload;
use crate::session::cookie::encode_session;
use crate::session::SessionManager;
use crate::settings::RamsgateSettings;

use super::constants::{TEST_APP_ID, TEST_EMAIL, TEST_SECRET, TEST_UID, TEST_USER_NAME};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Settings wired for tests: https portal, test secret, bypass off
    #[must_use]
    pub fn settings() -> RamsgateSettings {
        let mut settings = RamsgateSettings::default();
        settings.portal.base_url = "https://portal.example".to_string();
        settings.portal.app_id = TEST_APP_ID.to_string();
        settings.portal.shared_secret = TEST_SECRET.to_string();
        settings
    }

    /// Settings with the development bypass switched on
    #[must_use]
    pub fn settings_with_bypass() -> RamsgateSettings {
        let mut settings = Self::settings();
        settings.dev_bypass.enabled = true;
        settings.dev_bypass.uid = "dev-user".to_string();
        settings.dev_bypass.email = Some("dev@example.com".to_string());
        settings
    }

    /// Session manager matching [`Self::settings`]
    #[must_use]
    pub fn session_manager() -> SessionManager {
        SessionManager::from_settings(&Self::settings())
    }

    /// A standard session record
    #[must_use]
    pub fn session_record() -> SessionRecord {
        SessionRecord {
            uid: TEST_UID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            display_name: Some(TEST_USER_NAME.to_string()),
        }
    }

    /// Cookie value encoding the standard session record
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which it cannot for the fixture record
    #[must_use]
    pub fn session_cookie_value() -> String {
        encode_session(&Self::session_record()).expect("fixture record serializes")
    }

    /// A signed portal token for the standard user, expiring in one minute
    #[must_use]
    pub fn portal_token() -> String {
        Self::portal_token_for(TEST_APP_ID, 60_000)
    }

    /// A signed portal token with a chosen application id and expiry offset
    #[must_use]
    pub fn portal_token_for(app_id: &str, expires_in_ms: i64) -> String {
        let payload = json!({
            "uid": TEST_UID,
            "appId": app_id,
            "exp": Utc::now().timestamp_millis() + expires_in_ms,
            "email": TEST_EMAIL,
            "displayName": TEST_USER_NAME,
        });
        sign_portal_payload(&payload, TEST_SECRET.as_bytes())
    }

    /// A signed portal token built from an arbitrary payload
    #[must_use]
    pub fn portal_token_from(payload: &Value) -> String {
        sign_portal_payload(payload, TEST_SECRET.as_bytes())
    }
}
