use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Rooms
        .route(
            "/rooms",
            get(handlers::list_rooms).post(handlers::create_room),
        )
        .route("/rooms/:room_id", get(handlers::get_room))
        .route("/settings", get(handlers::default_settings))
        // Browser clients call from another origin during development
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
