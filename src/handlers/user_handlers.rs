//! HTTP handlers for user CRUD. Thin shims over `UsersService`; every
//! response body is a password-free view.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    errors::AppError,
    models::user::{CreateUserDto, UpdateUserDto},
    state::AppState,
};

/// `POST /users` — 201 on success, 409 when email or username is taken.
pub async fn create_user(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create(dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users`
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.users.find_all().await?;
    Ok(Json(users))
}

/// `GET /users/{id}` — 404 when absent.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.find_one(id).await?;
    Ok(Json(user))
}

/// `PATCH /users/{id}` — partial update, nested records upsert independently.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateUserDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.update(id, dto).await?;
    Ok(Json(user))
}

/// `DELETE /users/{id}` — 204 on success, 404 when absent.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.users.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
