//! Shared application state: the service handles every request flows
//! through. Built once in `main` and cloned into the router; nothing here
//! is a process-wide singleton.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::{
    auth_service::AuthService, posts_service::PostsService, users_service::UsersService,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UsersService,
    pub posts: PostsService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, jwt_secret: String) -> Self {
        Self {
            users: UsersService::new(db.clone()),
            posts: PostsService::new(db.clone()),
            auth: AuthService::new(db, jwt_secret),
        }
    }
}
