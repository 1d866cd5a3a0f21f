/**
 * Router Configuration
 *
 * Assembles every route and the middleware stack. Layers run outermost
 * first: `identify` attaches the caller, then `domain_gate` applies the
 * email-domain rule, then the route handler runs.
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};
use tower_http::services::ServeDir;

use crate::backend::auth::handlers::get_me;
use crate::backend::messages::handlers::{create_message, delete_message, list_messages, update_message};
use crate::backend::middleware::{domain_gate, identify};
use crate::backend::realtime::subscription::handle_change_subscription;
use crate::backend::routes::pages::unauthorized_page;
use crate::backend::server::state::AppState;

pub fn create_router(app_state: AppState) -> Router<()> {
    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .route("/api/messages", get(list_messages).post(create_message))
        .route("/api/messages/changes", get(handle_change_subscription))
        .route("/api/messages/{id}", patch(update_message).delete(delete_message))
        .route("/api/auth/me", get(get_me))
        .route("/unauthorized", get(unauthorized_page))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(from_fn_with_state(app_state.clone(), domain_gate))
        .layer(from_fn_with_state(app_state.clone(), identify))
        .with_state(app_state)
}
