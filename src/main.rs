#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use ramsgate::{
    handlers::{health, logout, portal_callback, session_exchange},
    identity::RestIdentityProvider,
    RamsgateSettings, SessionManager, SharedIdentityProvider,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables.
    // This also loads the .env file, initializes the logger, and fails hard
    // when the portal shared secret is missing.
    let settings = RamsgateSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let identity: SharedIdentityProvider = Arc::new(
        RestIdentityProvider::from_settings(&settings)
            .map_err(|e| std::io::Error::other(format!("Failed to build directory client: {e}")))?,
    );

    start_server(settings, identity).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    settings: RamsgateSettings,
    identity: SharedIdentityProvider,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let session_manager = SessionManager::from_settings(&settings);

    // Configure CORS for the wizard's cross-origin API calls
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "HEAD", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(session_manager.clone()))
            .app_data(web::Data::new(identity.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Session exchange; the handler enforces the GET/POST/HEAD constraint
        // itself so other methods get a 405 with an Allow header
        .route("/session", web::route().to(session_exchange))
        .route("/api/session", web::route().to(session_exchange))
        // Portal callback (one-time token exchange)
        .route("/portal-callback", web::get().to(portal_callback))
        .route("/portal/callback", web::get().to(portal_callback))
        // Logout
        .route("/logout", web::get().to(logout))
        .route("/logout", web::post().to(logout))
        .route("/api/logout", web::get().to(logout))
        .route("/api/logout", web::post().to(logout))
        // Health endpoint
        .route("/ping", web::get().to(health));
}

fn print_startup_info(bind_address: &str, settings: &RamsgateSettings) {
    println!("Starting ramsgate portal session bridge on http://{bind_address}");
    println!();
    println!("Session endpoints:");
    println!("  GET|POST|HEAD /session        - Exchange session cookie for identity token");
    println!("  GET  /portal-callback         - One-time portal token exchange");
    println!("  GET|POST /logout              - Clear session, hand off to portal logout");
    println!("  (each is also mounted under /api and /portal aliases)");
    println!();
    println!("Trusted portal: {}", settings.portal.base_url);
    println!("Application id: {}", settings.portal.app_id);
    println!(
        "Identity directory: {}",
        settings.identity.directory_url
    );
    if settings.dev_bypass.enabled {
        println!();
        println!(
            "!! DEV BYPASS ENABLED: requests without a session cookie run as uid {}",
            settings.dev_bypass.uid
        );
    }
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
}
