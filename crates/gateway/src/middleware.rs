//! Middleware for authentication and other cross-cutting concerns

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::GatewayState;

/// Identity attached to a request once its bearer token has been validated.
/// The raw token is kept because logout revokes exactly the presented one.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub token: String,
}

/// Authentication middleware that validates bearer tokens before the
/// handler runs. Unauthenticated requests never reach protected handlers.
pub async fn auth_middleware(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(ApiError::unauthenticated)?;

    let (user, session) = state
        .authenticator()
        .authenticate_token(&token)
        .await
        .map_err(ApiError::from)?;

    request.extensions_mut().insert(AuthContext {
        user_id: user.id,
        token: session.token,
    });

    Ok(next.run(request).await)
}

/// Extract the validated identity from request extensions
pub fn extract_auth(request: &Request) -> ApiResult<AuthContext> {
    request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(ApiError::unauthenticated)
}

/// Pull the token out of an `Authorization: Bearer ..` header
fn bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

/// Logging middleware for request/response logging
pub async fn logging_middleware(
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    Ok(response)
}

/// CORS middleware for cross-origin requests
pub fn create_cors_middleware() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            axum::http::header::CONTENT_TYPE,
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn bearer_token_extracts_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("bearer TOKEN123"),
        );

        assert_eq!(bearer_token(&headers).as_deref(), Some("TOKEN123"));
    }

    #[test]
    fn bearer_token_rejects_missing_or_malformed_headers() {
        assert!(bearer_token(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert!(bearer_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert!(bearer_token(&headers).is_none());
    }
}
