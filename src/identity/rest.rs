//! HTTP-backed identity directory client
//!
//! Talks to the user-directory service over a small REST surface:
//!
//! - `GET    /users/{uid}` - lookup by uid (404 = absent)
//! - `GET    /users/by-email/{email}` - lookup by email (404 = absent)
//! - `POST   /users` - create
//! - `PATCH  /users/{uid}` - update
//! - `POST   /tokens` - mint a downstream identity token
//!
//! Requests carry a bearer key when one is configured and are bounded by the
//! configured timeout; a timeout surfaces as a `Transport` error and reaches
//! the client as the generic 500 failure path.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::identity::provider::{DirectoryUser, IdentityError, IdentityProvider};
use crate::settings::RamsgateSettings;

/// REST client for the identity directory
#[derive(Clone)]
pub struct RestIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct MintedToken {
    token: String,
}

impl RestIdentityProvider {
    /// Create a new directory client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be constructed
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| IdentityError::Malformed(format!("invalid directory URL: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IdentityError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Build a directory client from loaded settings
    ///
    /// # Errors
    ///
    /// Returns an error if the configured directory URL is unusable
    pub fn from_settings(settings: &RamsgateSettings) -> Result<Self, IdentityError> {
        Self::new(
            &settings.identity.directory_url,
            settings.identity.api_key.clone(),
            Duration::from_secs(settings.identity.timeout_seconds),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut builder = self.client.request(method, self.endpoint(segments));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    async fn lookup(&self, segments: &[&str]) -> Result<Option<DirectoryUser>, IdentityError> {
        let response = self
            .request(Method::GET, segments)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = into_success(response).await?;
        let user = response
            .json::<DirectoryUser>()
            .await
            .map_err(|err| IdentityError::Malformed(err.to_string()))?;
        Ok(Some(user))
    }

    async fn send_user(
        &self,
        method: Method,
        segments: &[&str],
        user: &DirectoryUser,
    ) -> Result<DirectoryUser, IdentityError> {
        let response = self
            .request(method, segments)
            .json(user)
            .send()
            .await
            .map_err(transport)?;
        let response = into_success(response).await?;
        response
            .json::<DirectoryUser>()
            .await
            .map_err(|err| IdentityError::Malformed(err.to_string()))
    }
}

fn transport(err: reqwest::Error) -> IdentityError {
    IdentityError::Transport(err.to_string())
}

/// Map a non-success status to a `Provider` error carrying the body text
async fn into_success(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(IdentityError::Provider {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn get_user(&self, uid: &str) -> Result<Option<DirectoryUser>, IdentityError> {
        self.lookup(&["users", uid]).await
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<DirectoryUser>, IdentityError> {
        self.lookup(&["users", "by-email", email]).await
    }

    async fn create_user(&self, user: &DirectoryUser) -> Result<DirectoryUser, IdentityError> {
        self.send_user(Method::POST, &["users"], user).await
    }

    async fn update_user(&self, user: &DirectoryUser) -> Result<DirectoryUser, IdentityError> {
        self.send_user(Method::PATCH, &["users", &user.uid], user)
            .await
    }

    async fn mint_custom_token(
        &self,
        uid: &str,
        claims: &serde_json::Value,
    ) -> Result<String, IdentityError> {
        let response = self
            .request(Method::POST, &["tokens"])
            .json(&json!({ "uid": uid, "claims": claims }))
            .send()
            .await
            .map_err(transport)?;
        let response = into_success(response).await?;
        let minted = response
            .json::<MintedToken>()
            .await
            .map_err(|err| IdentityError::Malformed(err.to_string()))?;
        Ok(minted.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let provider =
            RestIdentityProvider::new("http://localhost:9099", None, Duration::from_secs(10))
                .unwrap();
        assert_eq!(
            provider.endpoint(&["users", "u-1"]).as_str(),
            "http://localhost:9099/users/u-1"
        );
    }

    #[test]
    fn test_endpoint_with_base_path() {
        let provider = RestIdentityProvider::new(
            "https://directory.internal/v1/",
            None,
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(&["tokens"]).as_str(),
            "https://directory.internal/v1/tokens"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = RestIdentityProvider::new("not a url", None, Duration::from_secs(10));
        assert!(matches!(result, Err(IdentityError::Malformed(_))));
    }
}
