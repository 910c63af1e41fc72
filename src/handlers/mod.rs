pub mod chat;
pub mod console;
pub mod contact;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/console/bookings", get(console::list_bookings))
        .route("/api/console/refresh", post(console::refresh))
        .route(
            "/api/console/bookings/:id",
            get(console::get_booking).delete(console::delete_booking),
        )
        .route(
            "/api/console/bookings/:id/status",
            put(console::update_status),
        )
        .route("/api/chat/status", get(chat::chat_status))
        .route("/api/chat/sessions", post(chat::open_session))
        .route("/api/chat/sessions/:id", get(chat::get_session))
        .route("/api/chat/sessions/:id/messages", post(chat::send_message))
        .route("/api/contact", post(contact::submit))
        .with_state(state)
}
