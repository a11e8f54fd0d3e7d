use serde::{Deserialize, Serialize};
use std::fs;
use url::Url;

use crate::session::cookie::{DEFAULT_COOKIE_NAME, DEFAULT_SESSION_TTL_HOURS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RamsgateSettings {
    pub application: ApplicationSettings,
    pub portal: PortalSettings,
    pub session: SessionSettings,
    pub dev_bypass: DevBypassSettings,
    pub identity: IdentitySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Forces the `Secure` cookie attribute even behind a plain-http portal
    pub production: bool,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSettings {
    /// Base URL of the external portal identity service
    pub base_url: String,
    /// This application's identifier; tokens minted for any other app are rejected
    pub app_id: String,
    /// HMAC secret shared with the portal. Absence is a startup-time fatal
    /// error, never a per-request failure.
    pub shared_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Session cookie lifetime in hours
    pub ttl_hours: u64,
}

/// Development-only session bypass
///
/// When enabled, a request without a session cookie is granted a synthetic
/// session built from these fields instead of a 401. Strictly an explicit
/// local-development opt-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevBypassSettings {
    pub enabled: bool,
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Base URL of the identity directory collaborator
    pub directory_url: String,
    /// Optional bearer key for directory requests
    pub api_key: Option<String>,
    /// Request timeout for directory calls, in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            production: false,
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            app_id: "rams".to_string(),
            shared_secret: String::new(), // Must be supplied; validated at startup
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl Default for DevBypassSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            uid: "dev-user".to_string(),
            email: None,
            display_name: None,
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            directory_url: "http://localhost:9099".to_string(),
            api_key: None,
            timeout_seconds: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RamsgateSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    /// - Validation fails (missing portal secret, unusable URLs)
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::initialize_environment()?;

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        settings.validate()?;

        Ok(settings)
    }

    /// Initialize environment variables and logging
    fn initialize_environment() -> Result<(), Box<dyn std::error::Error>> {
        Self::load_env_file();
        env_logger::try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading)
    /// 2. Settings.toml in `RAMSGATE_SECRETS_DIR` (if set and present)
    /// 3. Settings.toml in current directory (if present)
    /// 4. Default settings
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            let toml_content = fs::read_to_string(&default_config_path)?;
            settings = basic_toml::from_str(&toml_content)?;
        }

        if let Ok(secrets_dir) = std::env::var("RAMSGATE_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                let secrets_toml_content = fs::read_to_string(&secrets_path)?;
                settings = basic_toml::from_str(&secrets_toml_content)?;
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_portal_env_overrides(&mut settings.portal);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_dev_bypass_env_overrides(&mut settings.dev_bypass);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(production_str) = std::env::var("PRODUCTION") {
            if let Ok(production) = production_str.parse::<bool>() {
                app_settings.production = production;
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    pub fn apply_portal_env_overrides(portal_settings: &mut PortalSettings) {
        if let Ok(base_url) = std::env::var("PORTAL_BASE_URL") {
            portal_settings.base_url = base_url;
        }
        if let Ok(app_id) = std::env::var("PORTAL_APP_ID") {
            portal_settings.app_id = app_id;
        }
        if let Ok(secret) = std::env::var("PORTAL_SHARED_SECRET") {
            if !secret.is_empty() {
                portal_settings.shared_secret = secret;
            }
        }
    }

    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        if let Ok(cookie_name) = std::env::var("SESSION_COOKIE_NAME") {
            if !cookie_name.is_empty() {
                session_settings.cookie_name = cookie_name;
            }
        }
        Self::apply_numeric_env_override("SESSION_TTL_HOURS", &mut session_settings.ttl_hours);
    }

    fn apply_dev_bypass_env_overrides(bypass_settings: &mut DevBypassSettings) {
        if let Ok(enabled_str) = std::env::var("DEV_BYPASS") {
            if let Ok(enabled) = enabled_str.parse::<bool>() {
                bypass_settings.enabled = enabled;
            }
        }
        if let Ok(uid) = std::env::var("DEV_BYPASS_UID") {
            if !uid.is_empty() {
                bypass_settings.uid = uid;
            }
        }
        if let Ok(email) = std::env::var("DEV_BYPASS_EMAIL") {
            bypass_settings.email = (!email.is_empty()).then_some(email);
        }
        if let Ok(name) = std::env::var("DEV_BYPASS_NAME") {
            bypass_settings.display_name = (!name.is_empty()).then_some(name);
        }
    }

    fn apply_identity_env_overrides(identity_settings: &mut IdentitySettings) {
        if let Ok(directory_url) = std::env::var("IDENTITY_DIRECTORY_URL") {
            identity_settings.directory_url = directory_url;
        }
        if let Ok(api_key) = std::env::var("IDENTITY_API_KEY") {
            identity_settings.api_key = (!api_key.is_empty()).then_some(api_key);
        }
        Self::apply_numeric_env_override(
            "IDENTITY_TIMEOUT_SECONDS",
            &mut identity_settings.timeout_seconds,
        );
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Helper function to apply numeric environment variable overrides
    fn apply_numeric_env_override(env_var: &str, target: &mut u64) {
        if let Ok(value_str) = std::env::var(env_var) {
            if let Ok(value) = value_str.parse::<u64>() {
                *target = value;
            }
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Validate settings that must be usable for the process to run at all
    ///
    /// # Errors
    ///
    /// Returns an error if the portal shared secret is missing or a
    /// configured base URL does not parse. These are fatal: a process without
    /// a signing secret can only reject every token, and catching that per
    /// request would hide the misconfiguration.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.portal.shared_secret.is_empty() {
            return Err("PORTAL_SHARED_SECRET must be set: the portal token \
                        signature cannot be verified without it"
                .into());
        }
        Url::parse(&self.portal.base_url)
            .map_err(|err| format!("portal base URL {:?} is invalid: {err}", self.portal.base_url))?;
        Url::parse(&self.identity.directory_url).map_err(|err| {
            format!(
                "identity directory URL {:?} is invalid: {err}",
                self.identity.directory_url
            )
        })?;
        Ok(())
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Helper function to clean all relevant environment variables for tests
    fn clean_env_vars() {
        for var in [
            "PORTAL_BASE_URL",
            "PORTAL_APP_ID",
            "PORTAL_SHARED_SECRET",
            "SESSION_COOKIE_NAME",
            "SESSION_TTL_HOURS",
            "DEV_BYPASS",
            "DEV_BYPASS_UID",
            "DEV_BYPASS_EMAIL",
            "DEV_BYPASS_NAME",
            "RAMSGATE_SECRETS_DIR",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = RamsgateSettings::default();
        assert_eq!(settings.portal.base_url, "http://localhost:4000");
        assert_eq!(settings.portal.app_id, "rams");
        assert_eq!(settings.portal.shared_secret, "");
        assert_eq!(settings.session.cookie_name, "ramsgate_session");
        assert_eq!(settings.session.ttl_hours, 5);
        assert!(!settings.dev_bypass.enabled);
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let settings = RamsgateSettings::default();
        assert!(settings.validate().is_err());

        let mut configured = RamsgateSettings::default();
        configured.portal.shared_secret = "portal-shared-secret".to_string();
        assert!(configured.validate().is_ok());
    }

    #[test]
    fn test_invalid_portal_url_fails_validation() {
        let mut settings = RamsgateSettings::default();
        settings.portal.shared_secret = "portal-shared-secret".to_string();
        settings.portal.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_portal_env_overrides() {
        clean_env_vars();

        let mut portal_settings = PortalSettings::default();
        std::env::set_var("PORTAL_BASE_URL", "https://portal.example");
        std::env::set_var("PORTAL_APP_ID", "other-app");
        std::env::set_var("PORTAL_SHARED_SECRET", "env-secret");

        RamsgateSettings::apply_portal_env_overrides(&mut portal_settings);

        assert_eq!(portal_settings.base_url, "https://portal.example");
        assert_eq!(portal_settings.app_id, "other-app");
        assert_eq!(portal_settings.shared_secret, "env-secret");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_empty_secret_env_is_ignored() {
        clean_env_vars();

        let mut portal_settings = PortalSettings {
            shared_secret: "configured-secret".to_string(),
            ..Default::default()
        };
        std::env::set_var("PORTAL_SHARED_SECRET", "");

        RamsgateSettings::apply_portal_env_overrides(&mut portal_settings);

        // An empty env var must not clobber a configured secret.
        assert_eq!(portal_settings.shared_secret, "configured-secret");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_env_overrides() {
        clean_env_vars();

        let mut session_settings = SessionSettings::default();
        std::env::set_var("SESSION_COOKIE_NAME", "custom_session");
        std::env::set_var("SESSION_TTL_HOURS", "12");

        RamsgateSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.cookie_name, "custom_session");
        assert_eq!(session_settings.ttl_hours, 12);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_non_numeric_ttl_is_ignored() {
        clean_env_vars();

        let mut session_settings = SessionSettings::default();
        std::env::set_var("SESSION_TTL_HOURS", "five");

        RamsgateSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.ttl_hours, 5);

        clean_env_vars();
    }
}
