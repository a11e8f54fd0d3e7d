use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A user record as the identity directory stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub uid: String,
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// Errors from the identity directory collaborator
///
/// All variants surface to the client as the generic 500 failure path; the
/// distinction exists for server-side logging.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Network-level failure, including request timeout
    #[error("identity directory request failed: {0}")]
    Transport(String),

    /// The directory answered with a non-success status
    #[error("identity directory rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The directory answered successfully but the body was unusable
    #[error("identity directory returned an unusable response: {0}")]
    Malformed(String),
}

/// External user-directory service
///
/// Create/update operations are idempotent-safe on the directory side, so
/// concurrent requests for the same uid are allowed to race (see the
/// concurrency notes in DESIGN.md).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up a user by uid
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable or misbehaves;
    /// an unknown uid is `Ok(None)`, not an error.
    async fn get_user(&self, uid: &str) -> Result<Option<DirectoryUser>, IdentityError>;

    /// Look up a user by email address
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable or misbehaves
    async fn get_user_by_email(&self, email: &str)
        -> Result<Option<DirectoryUser>, IdentityError>;

    /// Create a user record
    ///
    /// # Errors
    ///
    /// Returns an error if the directory rejects the record or is unreachable
    async fn create_user(&self, user: &DirectoryUser) -> Result<DirectoryUser, IdentityError>;

    /// Update an existing user record
    ///
    /// # Errors
    ///
    /// Returns an error if the directory rejects the update or is unreachable
    async fn update_user(&self, user: &DirectoryUser) -> Result<DirectoryUser, IdentityError>;

    /// Mint a downstream identity token for a uid with custom claims
    ///
    /// # Errors
    ///
    /// Returns an error if token minting fails
    async fn mint_custom_token(
        &self,
        uid: &str,
        claims: &serde_json::Value,
    ) -> Result<String, IdentityError>;
}

/// Shared handle to the identity provider, injected into handlers
pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;
