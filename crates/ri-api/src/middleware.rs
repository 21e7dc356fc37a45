//! rusty-illust/crates/ri-api/src/middleware.rs
//!
//! Custom middleware for security, logging, and traffic control.

use actix_web::middleware::Logger;
use actix_cors::Cors;

// Returns the standard access logger for the Rusty-Illust API.
pub fn standard_middleware() -> Logger {
    // The 'default' logger outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing)
// Important if the frontend and API ever live on different subdomains.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}
