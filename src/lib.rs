// Library root - the router is built here so integration tests mount the same app.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use database::DatabasePool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", post(handlers::create_event))
        .route("/events", get(handlers::list_events))
        .route("/events/:id", get(handlers::get_event))
        .route("/events/:id", put(handlers::update_event))
        .route("/events/:id", delete(handlers::delete_event))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
