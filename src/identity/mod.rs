//! Identity Directory Module
//!
//! The external user-directory collaborator: lookup/create/update of user
//! records and minting of downstream identity tokens. Handlers depend only on
//! the [`IdentityProvider`] trait; the REST client is the production
//! implementation and tests substitute a mock.
//!
//! # Modules
//!
//! - [`provider`] - `IdentityProvider` trait, `DirectoryUser`, error type
//! - [`rest`] - HTTP-backed implementation
//! - [`sync`] - Session-to-directory reconciliation and token minting

pub mod provider;
pub mod rest;
pub mod sync;

// Re-export commonly used items for convenience
pub use provider::{DirectoryUser, IdentityError, IdentityProvider, SharedIdentityProvider};
pub use rest::RestIdentityProvider;
pub use sync::{ensure_user, mint_session_token, sync_session};
