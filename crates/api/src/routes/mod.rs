//! API route definitions.

use axum::{Router, middleware};
use payplan_core::planning::PlanningRepository;

use crate::{AppState, middleware::auth_middleware};

pub mod health;
pub mod planning;

/// Creates the API router; everything but health requires a bearer token.
pub fn api_routes_with_state<R: PlanningRepository + 'static>(
    state: &AppState<R>,
) -> Router<AppState<R>> {
    let protected_routes = planning::routes::<R>().layer(middleware::from_fn_with_state(
        state.jwt_service.clone(),
        auth_middleware,
    ));

    Router::new()
        .merge(health::routes::<AppState<R>>())
        .merge(protected_routes)
}
