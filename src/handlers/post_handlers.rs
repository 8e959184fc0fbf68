//! HTTP handlers for post CRUD. Create/update/delete sit behind the bearer
//! guard; the reads are public.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    errors::AppError,
    middleware::auth::CurrentUser,
    models::post::{CreatePostDto, UpdatePostDto},
    state::AppState,
};

/// `POST /posts` (guarded) — the authenticated user becomes the owner,
/// taking precedence over any `userId` in the body.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(dto): Json<CreatePostDto>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.posts.create(dto, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /posts`
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.find_all().await?;
    Ok(Json(posts))
}

/// `GET /posts/{id}` — 404 when absent.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.posts.find_one(id).await?;
    Ok(Json(post))
}

/// `PATCH /posts/{id}` (guarded)
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.posts.update(id, dto).await?;
    Ok(Json(post))
}

/// `DELETE /posts/{id}` (guarded) — 204 on success.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.posts.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /posts/user/{user_id}` — possibly empty, never 404.
pub async fn posts_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.find_by_user(user_id).await?;
    Ok(Json(posts))
}
