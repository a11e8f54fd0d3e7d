//! In-memory identity directory for tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::identity::{DirectoryUser, IdentityError, IdentityProvider};

/// Mock identity provider backed by a `HashMap`
///
/// Records every mint call and counts updates so tests can assert on the
/// reconciliation traffic, not just the end state.
#[derive(Default)]
pub struct MockIdentityProvider {
    users: Mutex<HashMap<String, DirectoryUser>>,
    minted: Mutex<Vec<(String, Value)>>,
    update_calls: Mutex<usize>,
    fail_all: bool,
}

impl MockIdentityProvider {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with users
    #[must_use]
    pub fn with_users(users: Vec<DirectoryUser>) -> Self {
        let provider = Self::new();
        {
            let mut map = provider.users.lock().expect("users lock");
            for user in users {
                map.insert(user.uid.clone(), user);
            }
        }
        provider
    }

    /// Create a directory where every operation fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Current stored record for a uid, if any
    #[must_use]
    pub fn stored_user(&self, uid: &str) -> Option<DirectoryUser> {
        self.users.lock().expect("users lock").get(uid).cloned()
    }

    /// Number of `update_user` calls seen
    #[must_use]
    pub fn update_calls(&self) -> usize {
        *self.update_calls.lock().expect("update lock")
    }

    /// Claims passed to the most recent `mint_custom_token` call
    #[must_use]
    pub fn last_minted_claims(&self) -> Option<Value> {
        self.minted
            .lock()
            .expect("minted lock")
            .last()
            .map(|(_, claims)| claims.clone())
    }

    fn check_failure(&self) -> Result<(), IdentityError> {
        if self.fail_all {
            return Err(IdentityError::Transport(
                "mock directory configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn get_user(&self, uid: &str) -> Result<Option<DirectoryUser>, IdentityError> {
        self.check_failure()?;
        Ok(self.stored_user(uid))
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<DirectoryUser>, IdentityError> {
        self.check_failure()?;
        Ok(self
            .users
            .lock()
            .expect("users lock")
            .values()
            .find(|user| user.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_user(&self, user: &DirectoryUser) -> Result<DirectoryUser, IdentityError> {
        self.check_failure()?;
        self.users
            .lock()
            .expect("users lock")
            .insert(user.uid.clone(), user.clone());
        Ok(user.clone())
    }

    async fn update_user(&self, user: &DirectoryUser) -> Result<DirectoryUser, IdentityError> {
        self.check_failure()?;
        *self.update_calls.lock().expect("update lock") += 1;
        self.users
            .lock()
            .expect("users lock")
            .insert(user.uid.clone(), user.clone());
        Ok(user.clone())
    }

    async fn mint_custom_token(
        &self,
        uid: &str,
        claims: &Value,
    ) -> Result<String, IdentityError> {
        self.check_failure()?;
        self.minted
            .lock()
            .expect("minted lock")
            .push((uid.to_string(), claims.clone()));
        Ok(format!("custom-token:{uid}"))
    }
}
