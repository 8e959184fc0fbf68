//! Bearer-token guard, composed explicitly around protected routes.
//!
//! Extracts `Authorization: Bearer <token>`, verifies signature and expiry,
//! and re-resolves the subject against the store. On success the resolved
//! user rides along as a request extension for handlers to pick up.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{errors::AppError, models::user::JwtUser, state::AppState};

/// The authenticated user attached to guarded requests.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub JwtUser);

/// Reject the request with 401 unless it carries a valid bearer token whose
/// subject still exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or_else(|| {
        warn!("missing or malformed Authorization header");
        AppError::unauthorized("missing bearer token")
    })?;

    let user = state.auth.authenticate(&token).await?;
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("authentication required"))
    }
}
