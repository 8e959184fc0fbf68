//! JSONPlaceholder-style CRUD REST backend: users and posts with nested
//! address/geo/company records, bcrypt-hashed credentials, and a JWT bearer
//! guard over post mutations. SQLite holds the data; axum serves it.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
