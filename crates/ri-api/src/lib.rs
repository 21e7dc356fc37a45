//! # ri-api
//!
//! The web routing and orchestration layer for Rusty-Illust.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the illustration service.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // Recent public illustrations
            .route("/illustrations", web::get().to(handlers::list_illustrations))
            // The ingestion endpoint
            .route("/illustrations", web::post().to(handlers::create_illustration))
            // A single record by ID
            .route("/illustrations/{id}", web::get().to(handlers::get_illustration)),
    );
}
