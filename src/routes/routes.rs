//! Route composition for the whole API surface.
//!
//! ## Structure
//! - **Auth**
//!   - `POST   /auth/login` — exchange credentials for a bearer token
//! - **Users**
//!   - `POST   /users`, `GET /users`
//!   - `GET    /users/{id}`, `PATCH /users/{id}`, `DELETE /users/{id}`
//! - **Posts** (mutations bearer-guarded)
//!   - `POST   /posts` (guarded), `GET /posts`
//!   - `GET    /posts/{id}`, `PATCH /posts/{id}` (guarded),
//!     `DELETE /posts/{id}` (guarded)
//!   - `GET    /posts/user/{user_id}`
//!
//! The guard is plain middleware composed around the protected method
//! routes; nothing is wired up through framework reflection.

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::{
    handlers::{
        auth_handlers::login,
        health_handlers::{healthz, readyz},
        post_handlers::{
            create_post, delete_post, get_post, list_posts, posts_by_user, update_post,
        },
        user_handlers::{create_user, delete_user, get_user, list_users, update_user},
    },
    middleware::auth::require_auth,
    state::AppState,
};

/// Build the router for the full API, with shared state attached.
pub fn routes(state: AppState) -> Router {
    // Post mutations require a valid bearer token; the guard wraps only
    // these method routes, so the reads on the same paths stay public.
    let guarded = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", patch(update_post).delete(delete_post))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/login", post(login))
        // Users
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        // Posts (public reads)
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
        .route("/posts/user/{user_id}", get(posts_by_user))
        .merge(guarded)
        .with_state(state)
}
