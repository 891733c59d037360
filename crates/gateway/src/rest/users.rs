//! User management REST endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::rest::auth::UserResponse;
use crate::state::GatewayState;
use crewdesk_database::User;
use crewdesk_users::{NewUser, Page, UpdateUser};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPageResponse {
    pub current_page: u32,
    pub data: Vec<UserResponse>,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

impl From<Page<User>> for UserPageResponse {
    fn from(page: Page<User>) -> Self {
        Self {
            current_page: page.current_page,
            data: page.data.into_iter().map(UserResponse::from).collect(),
            per_page: page.per_page,
            total: page.total,
            last_page: page.last_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListUsersResponse {
    pub status: bool,
    pub data: UserPageResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewUserPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

impl From<NewUserPayload> for NewUser {
    fn from(payload: NewUserPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            role: payload.role,
            password: payload.password,
            password_confirmation: payload.password_confirmation,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateRequest {
    #[serde(default)]
    pub users: Vec<NewUserPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreateResponse {
    pub status: bool,
    pub message: String,
    pub inserted_count: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserPayload> for UpdateUser {
    fn from(payload: UpdateUserPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            role: payload.role,
            password: payload.password,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = ListUsersResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_users(
    Query(params): Query<ListUsersQuery>,
    State(state): State<Arc<GatewayState>>,
) -> ApiResult<Json<ListUsersResponse>> {
    let page = state
        .user_service()
        .list_users(params.search.as_deref(), params.page.unwrap_or(1))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ListUsersResponse {
        status: true,
        data: page.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = BulkCreateRequest,
    responses(
        (status = 201, description = "Whole batch inserted", body = BulkCreateResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Validation failed for some records"),
        (status = 500, description = "Insert transaction rolled back")
    )
)]
pub async fn bulk_create(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<BulkCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let records: Vec<NewUser> = payload.users.into_iter().map(NewUser::from).collect();

    let inserted_count = state
        .user_service()
        .bulk_create(&records)
        .await
        .map_err(ApiError::from)?;

    let response = BulkCreateResponse {
        status: true,
        message: "Users added successfully.".to_string(),
        inserted_count,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Fields applied", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown user id")
    )
)]
pub async fn update_user(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<UpdateUserPayload>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .user_service()
        .update_user(id, payload.into())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "User updated".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User soft deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown user id")
    )
)]
pub async fn soft_delete_user(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .user_service()
        .soft_delete_user(id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/users/batch-delete",
    tag = "Users",
    request_body = BatchDeleteRequest,
    responses(
        (status = 200, description = "Matching users soft deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn batch_delete_users(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<BatchDeleteRequest>,
) -> ApiResult<Json<MessageResponse>> {
    // Unknown ids are silently ignored; the response does not distinguish.
    state
        .user_service()
        .batch_delete_users(&payload.ids)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "selected users are deleted".to_string(),
    }))
}
