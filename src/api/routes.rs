use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{edge_handlers, handlers, scene_handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Entities
        .route("/api/entities", get(handlers::list_entities::<S>))
        .route("/api/entities", post(handlers::create_entity::<S>))
        .route(
            "/api/entities/slug-check",
            get(handlers::slug_check::<S>),
        )
        .route("/api/entities/:id", get(handlers::get_entity::<S>))
        // Edges
        .route("/api/edges", get(edge_handlers::list_edges::<S>))
        .route("/api/edges", post(edge_handlers::create_edge::<S>))
        // Scenes
        .route("/api/scenes", get(scene_handlers::list_scenes::<S>))
        .route("/api/scenes", post(scene_handlers::create_scene::<S>))
        // Scores
        .route(
            "/api/scores/recompute",
            post(handlers::recompute_scores::<S>),
        )
        // Debug dump of every table
        .route("/api/debug/snapshot", get(handlers::debug_snapshot::<S>))
        // The browser client runs on another origin in development
        .layer(CorsLayer::permissive())
}
