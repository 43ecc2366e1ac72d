use crate::state::AppState;
use axum::middleware;
use axum::{
    routing::{get, post},
    Router,
};

pub mod messages;
pub mod rooms;
pub mod ws;

pub fn build_router() -> Router<AppState> {
    // Service introspection endpoints (public, no auth)
    let introspection = Router::new().route("/health", get(|| async { "OK" }));

    // API v1 endpoints (all business logic routes with /api/v1 prefix)
    let api_v1 = Router::new()
        .route("/rooms", post(rooms::ensure_room).get(rooms::list_rooms))
        .route(
            "/rooms/:id/messages",
            post(messages::send_message).get(messages::get_messages),
        )
        .route("/rooms/:id/read", post(rooms::mark_as_read))
        .route("/rooms/:id/unread", get(rooms::unread_count))
        .route("/ws", get(ws::ws_handler));

    // Apply auth middleware only to API v1 (introspection stays public for healthchecks)
    let secured_api_v1 = api_v1.layer(middleware::from_fn(
        crate::middleware::auth::auth_middleware,
    ));

    let router = introspection.merge(Router::new().nest("/api/v1", secured_api_v1));

    crate::middleware::with_defaults(router)
}
