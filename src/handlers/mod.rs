// HTTP request handlers for the portal session bridge
pub mod callback;
pub mod health;
pub mod logout;
pub mod session;

// Re-export the main handler functions
pub use callback::portal_callback;
pub use health::health;
pub use logout::logout;
pub use session::session_exchange;
