//! Portal Protocol Module
//!
//! Everything that touches the wire format shared with the external portal
//! service: the signed one-time token and the outbound portal URLs.
//!
//! # Modules
//!
//! - [`token`] - Signed portal token codec and verification
//! - [`urls`] - Builders for the portal login / launch / logout URLs

pub mod token;
pub mod urls;

// Re-export commonly used items for convenience
pub use token::{sign_portal_payload, verify_portal_token};
pub use urls::{launch_url, login_url, logout_url};
