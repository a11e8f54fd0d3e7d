//! Unified testing utilities for ramsgate
//!
//! Consolidates the test helpers shared by the unit tests and, behind the
//! `testing` feature, the integration suite.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built test data (settings, records, signed tokens)
//! - [`requests`] - HTTP request builder for testing handlers
//! - [`mock`] - In-memory identity directory

pub mod fixtures;
pub mod mock;
pub mod requests;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use mock::MockIdentityProvider;
pub use requests::RequestBuilder;

/// Common test constants
pub mod constants {
    /// Shared secret used to sign test portal tokens
    pub const TEST_SECRET: &str = "test-portal-shared-secret";

    /// Application id test tokens are minted for
    pub const TEST_APP_ID: &str = "rams";

    /// Default test user id
    pub const TEST_UID: &str = "user-123";

    /// Default test email address
    pub const TEST_EMAIL: &str = "test@example.com";

    /// Default test user name
    pub const TEST_USER_NAME: &str = "Test User";
}
