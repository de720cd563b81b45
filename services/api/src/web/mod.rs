pub mod chat;
pub mod playground;
pub mod protocol;
pub mod rest;
pub mod state;

pub use chat::chat_handler;
pub use rest::{debug_handler, health_handler, playground_handler, root_handler};

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::web::state::AppState;

/// Base64 images make chat bodies large.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// The gateway's routes, before they are mounted.
fn gateway_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/debug", get(debug_handler))
        .route("/chat", get(playground_handler).post(chat_handler))
}

/// Builds the full application router: the gateway routes mounted at the root
/// and again under every configured prefix, behind the shared middleware.
pub fn router(app_state: Arc<AppState>) -> Router {
    let mut app = gateway_routes();
    for prefix in &app_state.config.route_prefixes {
        app = app.nest(prefix, gateway_routes());
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
