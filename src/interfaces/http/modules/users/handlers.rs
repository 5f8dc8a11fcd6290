//! User API handlers
//!
//! Thin wrappers over `UserService`: decode the request, delegate, and
//! shape the response. Every domain failure goes through
//! [`domain_error_response`].

use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, Json};

use super::dto::{UserDto, UserRequest};
use crate::application::SharedUserService;
use crate::interfaces::http::common::{domain_error_response, ApiError, ErrorResponse, IdPath, JsonBody};

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: SharedUserService,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users (possibly empty)", body = Vec<UserDto>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let today = state.user_service.today();
    let users = state
        .user_service
        .list_users()
        .await
        .map_err(domain_error_response)?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserDto::project(u, today))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    IdPath(id): IdPath,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .user_service
        .get_user(id)
        .await
        .map_err(domain_error_response)?;

    Ok(Json(UserDto::project(user, state.user_service.today())))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created; `Location` points at it", body = UserDto),
        (status = 400, description = "Validation failure or duplicate email", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    JsonBody(request): JsonBody<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .create_user(request.into())
        .await
        .map_err(domain_error_response)?;

    let location = format!("/api/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserDto::project(user, state.user_service.today())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserRequest,
    responses(
        (status = 204, description = "User replaced"),
        (status = 400, description = "Id mismatch, validation failure or duplicate email", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 500, description = "Concurrent modification", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    IdPath(id): IdPath,
    JsonBody(request): JsonBody<UserRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .update_user(id, request.into())
        .await
        .map_err(domain_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .delete_user(id)
        .await
        .map_err(domain_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

// ── Tests ──────────────────────────────────────────────────────
