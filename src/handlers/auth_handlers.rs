//! HTTP handler for the login flow.

use axum::{Json, extract::State};

use crate::{
    errors::AppError,
    models::user::{LoginDto, LoginResponse},
    state::AppState,
};

/// `POST /auth/login` — exchange credentials for a bearer token.
///
/// 401 on bad credentials, with no hint whether the email exists.
pub async fn login(
    State(state): State<AppState>,
    Json(dto): Json<LoginDto>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth.login(dto).await?;
    Ok(Json(response))
}
