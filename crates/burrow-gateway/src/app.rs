use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    delete_url_handler, health_handler, list_urls_handler, redirect_handler, shorten_handler,
    stats_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .nest(
                "/api",
                Router::new()
                    .route("/health", get(health_handler))
                    .route("/shorten", post(shorten_handler))
                    .route("/stats/{code}", get(stats_handler))
                    .route("/urls", get(list_urls_handler))
                    .route("/urls/{code}", delete(delete_url_handler)),
            )
            .route("/{code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}
