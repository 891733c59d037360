//! # Crewdesk Gateway Crate
//!
//! This crate provides the HTTP layer for Crewdesk: the router, shared
//! application state, the bearer-auth middleware that guards the user
//! management routes, and the error-to-status mapping.
//!
//! ## Architecture
//!
//! - **REST**: HTTP API endpoints with OpenAPI documentation
//! - **State**: Shared services handed to every handler
//! - **Middleware**: Authentication, CORS, and request logging

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export main types for convenience
pub use error::{ApiError, ApiResult};
pub use middleware::{auth_middleware, AuthContext};
pub use state::GatewayState;

use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);

    let mut router = Router::new()
        .merge(rest::create_public_routes().with_state(arc_state.clone()))
        .merge(rest::create_protected_routes(arc_state.clone()).with_state(arc_state))
        .layer(middleware::create_cors_middleware())
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    // Add Swagger UI if in debug mode
    #[cfg(debug_assertions)]
    {
        #[derive(OpenApi)]
        #[openapi(
            paths(
                rest::health::health_check,
                rest::auth::login,
                rest::auth::logout,
                rest::users::list_users,
                rest::users::bulk_create,
                rest::users::update_user,
                rest::users::soft_delete_user,
                rest::users::batch_delete_users,
            ),
            components(
                schemas(
                    rest::health::HealthResponse,
                    rest::auth::LoginRequest,
                    rest::auth::LoginResponse,
                    rest::auth::UserResponse,
                    rest::auth::StatusMessageResponse,
                    rest::auth::ErrorResponse,
                    rest::users::UserPageResponse,
                    rest::users::ListUsersResponse,
                    rest::users::NewUserPayload,
                    rest::users::BulkCreateRequest,
                    rest::users::BulkCreateResponse,
                    rest::users::UpdateUserPayload,
                    rest::users::BatchDeleteRequest,
                    rest::users::MessageResponse,
                )
            ),
            tags(
                (name = "Auth", description = "Login and token revocation"),
                (name = "Users", description = "User record management"),
                (name = "Health", description = "Service health"),
            )
        )]
        struct ApiDoc;

        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
}
