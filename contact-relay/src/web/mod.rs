//! Web server module for the contact endpoint.
//!
//! Routes:
//! - `/contact`: contact form relay, every method (CORS preflight included)
//! - `/health`: liveness check

pub mod handlers;

pub use handlers::{
    contact, health, AppState, ContactResponse, HandlerOutcome, HealthResponse, CORS_HEADERS,
    MAX_BODY_BYTES,
};

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/contact", any(contact))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
