//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for paycheck planning
//! - Authentication middleware
//! - Error-to-response mapping, including extractor rejections

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use payplan_core::planning::{PlanningRepository, PlanningService};
use payplan_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
pub struct AppState<R: PlanningRepository> {
    /// Planning service.
    pub planning: Arc<PlanningService<R>>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
}

impl<R: PlanningRepository> AppState<R> {
    /// Create application state.
    #[must_use]
    pub fn new(planning: PlanningService<R>, jwt_service: JwtService) -> Self {
        Self {
            planning: Arc::new(planning),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

impl<R: PlanningRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            planning: Arc::clone(&self.planning),
            jwt_service: Arc::clone(&self.jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router<R: PlanningRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
