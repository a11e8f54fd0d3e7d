//! Session-to-directory reconciliation
//!
//! Once a request is authenticated, the session's identity must exist in the
//! directory before a downstream token can be minted. The reconciliation
//! policy:
//!
//! - known uid: push `email`/`displayName` drift from the session into the
//!   directory, but only for fields the session actually carries
//! - unknown uid whose email already belongs to another record: the
//!   pre-existing owner of the email wins over the session's claimed uid
//! - otherwise: create the record from the session
//!
//! The email-collision rule is deliberate conflict resolution, not an
//! accident: email uniqueness outranks session identity when they disagree.

use log::{debug, info};
use serde_json::{Map, Value};

use crate::identity::provider::{DirectoryUser, IdentityError, IdentityProvider};
use crate::models::SessionRecord;

/// Ensure a directory user exists for the session identity
///
/// # Errors
///
/// Returns an error if any directory operation fails
pub async fn ensure_user(
    provider: &dyn IdentityProvider,
    record: &SessionRecord,
) -> Result<DirectoryUser, IdentityError> {
    if let Some(existing) = provider.get_user(&record.uid).await? {
        let mut next = existing.clone();
        let mut changed = false;
        if record.email.is_some() && next.email != record.email {
            next.email.clone_from(&record.email);
            changed = true;
        }
        if record.display_name.is_some() && next.display_name != record.display_name {
            next.display_name.clone_from(&record.display_name);
            changed = true;
        }
        if changed {
            debug!("reconciling directory profile drift for uid {}", record.uid);
            return provider.update_user(&next).await;
        }
        return Ok(existing);
    }

    if let Some(email) = &record.email {
        if let Some(owner) = provider.get_user_by_email(email).await? {
            info!(
                "email {email} already owned by uid {}; session uid {} defers to it",
                owner.uid, record.uid
            );
            return Ok(owner);
        }
    }

    provider
        .create_user(&DirectoryUser {
            uid: record.uid.clone(),
            email: record.email.clone(),
            display_name: record.display_name.clone(),
        })
        .await
}

/// Mint a downstream identity token for a resolved directory user
///
/// `email`/`displayName` ride along as custom claims only when present.
///
/// # Errors
///
/// Returns an error if token minting fails
pub async fn mint_session_token(
    provider: &dyn IdentityProvider,
    user: &DirectoryUser,
) -> Result<String, IdentityError> {
    let mut claims = Map::new();
    if let Some(email) = &user.email {
        claims.insert("email".to_string(), Value::String(email.clone()));
    }
    if let Some(name) = &user.display_name {
        claims.insert("displayName".to_string(), Value::String(name.clone()));
    }
    provider
        .mint_custom_token(&user.uid, &Value::Object(claims))
        .await
}

/// Resolve the directory user for a session and mint its token
///
/// # Errors
///
/// Returns an error if any directory operation fails
pub async fn sync_session(
    provider: &dyn IdentityProvider,
    record: &SessionRecord,
) -> Result<(DirectoryUser, String), IdentityError> {
    let user = ensure_user(provider, record).await?;
    let token = mint_session_token(provider, &user).await?;
    Ok((user, token))
}
