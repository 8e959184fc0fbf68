//! Core data models for the JSONPlaceholder-style backend.
//!
//! Row structs map to database tables via `sqlx::FromRow`; the outward-facing
//! view structs serialize as camelCase JSON via `serde` and never carry a
//! password hash.

pub mod post;
pub mod user;
