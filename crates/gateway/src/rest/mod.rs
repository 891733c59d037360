//! REST API endpoints for the gateway

pub mod auth;
pub mod health;
pub mod users;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::middleware::auth_middleware;
use crate::state::GatewayState;

/// Routes reachable without a bearer token
pub fn create_public_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/login", post(auth::login))
}

/// Routes behind the bearer-auth middleware
pub fn create_protected_routes(state: Arc<GatewayState>) -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/users", get(users::list_users).post(users::bulk_create))
        .route(
            "/users/:id",
            put(users::update_user).delete(users::soft_delete_user),
        )
        .route("/users/batch-delete", post(users::batch_delete_users))
        .route("/logout", post(auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(state, auth_middleware))
}
