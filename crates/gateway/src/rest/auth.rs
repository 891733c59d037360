//! Authentication REST endpoints

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::middleware::extract_auth;
use crate::state::GatewayState;
use crewdesk_users::utils::validation::validate_login;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crewdesk_database::User> for UserResponse {
    fn from(user: crewdesk_database::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessageResponse {
    pub status: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let errors = validate_login(&payload.email, &payload.password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let (user, session) = state
        .authenticator()
        .login_with_password(&payload.email, &payload.password)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(LoginResponse {
        access_token: session.token,
        token_type: "Bearer".to_string(),
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Presented token revoked", body = StatusMessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> ApiResult<Json<StatusMessageResponse>> {
    let auth = extract_auth(&request)?;

    // Only the token presented with this request is invalidated; other
    // sessions of the same user stay live.
    state
        .authenticator()
        .revoke_token(&auth.token)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(StatusMessageResponse {
        status: true,
        message: "Logged out successfully.".to_string(),
    }))
}
