#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the ramsgate application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod identity;
pub mod models;
pub mod portal;
pub mod session;
pub mod settings;
pub mod utils;

// Test utilities are compiled for unit tests and, behind the `testing`
// feature, for the integration test suite.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use handlers::{health, logout, portal_callback, session_exchange};
pub use identity::{IdentityProvider, SharedIdentityProvider};
pub use models::SessionRecord;
pub use session::SessionManager;
pub use settings::RamsgateSettings;
