//! Users service — CRUD over users and their nested address/geo/company
//! records, backed by SQLite. Uniqueness of email and username is enforced
//! by the store and surfaced as a Conflict.

use crate::{
    models::user::{AddressDto, CompanyDto, CreateUserDto, UpdateUserDto, User, UserView},
    services::{ServiceError, ServiceResult, is_unique_violation, password},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

const PASSWORD_MIN_LEN: usize = 6;

const USER_COLUMNS: &str =
    "id, name, username, email, password, phone, website, created_at, updated_at";

#[derive(Clone)]
pub struct UsersService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl UsersService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create a user, hashing the password and creating any nested
    /// address/geo/company records supplied with it.
    ///
    /// Fails with a Conflict before touching the store if the email or
    /// username is already taken. Nested creation is not transactional: a
    /// failure after the user row is inserted leaves the user without its
    /// nested records.
    pub async fn create(&self, dto: CreateUserDto) -> ServiceResult<UserView> {
        ensure_required(&dto.name, "name")?;
        ensure_required(&dto.username, "username")?;
        ensure_email_valid(&dto.email)?;
        ensure_password_valid(&dto.password)?;

        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM users WHERE email = ? OR username = ?",
        )
        .bind(&dto.email)
        .bind(&dto.username)
        .fetch_optional(&*self.db)
        .await?;
        if taken.is_some() {
            return Err(ServiceError::UserAlreadyExists {
                email: dto.email,
                username: dto.username,
            });
        }

        let hashed = password::hash_password(&dto.password)?;
        let now = Utc::now();

        let insert_result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, username, email, password, phone, website, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&hashed)
        .bind(&dto.phone)
        .bind(&dto.website)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await;

        let user = match insert_result {
            Ok(user) => user,
            // The pre-check races with concurrent creates; the store's
            // unique constraints are the source of truth.
            Err(err) if is_unique_violation(&err) => {
                return Err(ServiceError::UserAlreadyExists {
                    email: dto.email,
                    username: dto.username,
                });
            }
            Err(err) => return Err(ServiceError::Sqlx(err)),
        };

        if let Some(address) = dto.address {
            self.upsert_address(user.id, address).await?;
        }
        if let Some(company) = dto.company {
            self.upsert_company(user.id, company).await?;
        }

        debug!("created user {} ({})", user.id, user.email);
        fetch_user_view(&self.db, user.id).await
    }

    /// All users with their nested records, passwords stripped.
    pub async fn find_all(&self) -> ServiceResult<Vec<UserView>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&*self.db)
        .await?;

        let mut views = Vec::with_capacity(users.len());
        for user in users {
            views.push(fetch_user_view(&self.db, user.id).await?);
        }
        Ok(views)
    }

    /// A single user by id, NotFound if absent.
    pub async fn find_one(&self, id: i64) -> ServiceResult<UserView> {
        fetch_user_view(&self.db, id).await
    }

    /// Partial update. Re-hashes the password only when one is supplied;
    /// address/geo/company upsert independently of the flat fields.
    pub async fn update(&self, id: i64, dto: UpdateUserDto) -> ServiceResult<UserView> {
        let current = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::UserNotFound(id))?;

        if let Some(name) = &dto.name {
            ensure_required(name, "name")?;
        }
        if let Some(username) = &dto.username {
            ensure_required(username, "username")?;
        }
        if let Some(email) = &dto.email {
            ensure_email_valid(email)?;
        }
        if let Some(pw) = &dto.password {
            ensure_password_valid(pw)?;
        }

        let hashed = match &dto.password {
            Some(pw) => password::hash_password(pw)?,
            None => current.password.clone(),
        };
        let email = dto.email.clone().unwrap_or(current.email);
        let username = dto.username.clone().unwrap_or(current.username);

        let update_result = sqlx::query(
            "UPDATE users SET name = ?, username = ?, email = ?, password = ?,
                              phone = ?, website = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(dto.name.unwrap_or(current.name))
        .bind(&username)
        .bind(&email)
        .bind(&hashed)
        .bind(dto.phone.or(current.phone))
        .bind(dto.website.or(current.website))
        .bind(Utc::now())
        .bind(id)
        .execute(&*self.db)
        .await;

        match update_result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(ServiceError::UserAlreadyExists { email, username });
            }
            Err(err) => return Err(ServiceError::Sqlx(err)),
        }

        if let Some(address) = dto.address {
            self.upsert_address(id, address).await?;
        }
        if let Some(company) = dto.company {
            self.upsert_company(id, company).await?;
        }

        fetch_user_view(&self.db, id).await
    }

    /// Delete a user; nested records and posts go with it (FK cascade).
    pub async fn remove(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::UserNotFound(id));
        }
        debug!("removed user {}", id);
        Ok(())
    }

    /// Full user row by email, for credential checks only. Absence is not
    /// an error here: the caller decides what a missing user means.
    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    /// Full user row by id, for the bearer guard's subject re-check.
    pub(crate) async fn fetch_by_id(&self, id: i64) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    pub async fn exists(&self, id: i64) -> ServiceResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        Ok(found.is_some())
    }

    /// Update-if-exists-else-create for the address, and for its geo when
    /// one is supplied. A geo on its own never replaces an existing address.
    async fn upsert_address(&self, user_id: i64, dto: AddressDto) -> ServiceResult<()> {
        let address_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO addresses (street, suite, city, zipcode, user_id)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 street = excluded.street,
                 suite = excluded.suite,
                 city = excluded.city,
                 zipcode = excluded.zipcode
             RETURNING id",
        )
        .bind(&dto.street)
        .bind(&dto.suite)
        .bind(&dto.city)
        .bind(&dto.zipcode)
        .bind(user_id)
        .fetch_one(&*self.db)
        .await?;

        if let Some(geo) = dto.geo {
            sqlx::query(
                "INSERT INTO geos (lat, lng, address_id)
                 VALUES (?, ?, ?)
                 ON CONFLICT(address_id) DO UPDATE SET
                     lat = excluded.lat,
                     lng = excluded.lng",
            )
            .bind(&geo.lat)
            .bind(&geo.lng)
            .bind(address_id)
            .execute(&*self.db)
            .await?;
        }
        Ok(())
    }

    async fn upsert_company(&self, user_id: i64, dto: CompanyDto) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO companies (name, catch_phrase, bs, user_id)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 name = excluded.name,
                 catch_phrase = excluded.catch_phrase,
                 bs = excluded.bs",
        )
        .bind(&dto.name)
        .bind(&dto.catch_phrase)
        .bind(&dto.bs)
        .bind(user_id)
        .execute(&*self.db)
        .await?;
        Ok(())
    }
}

/// Assemble the outward view of a user: the row plus its nested records,
/// password stripped. Shared with the posts service for owner embedding.
pub(crate) async fn fetch_user_view(db: &SqlitePool, id: i64) -> ServiceResult<UserView> {
    use crate::models::user::{Address, Company, Geo};

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(ServiceError::UserNotFound(id))?;

    let address = sqlx::query_as::<_, Address>(
        "SELECT id, street, suite, city, zipcode, user_id FROM addresses WHERE user_id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    let geo = match &address {
        Some(address) => {
            sqlx::query_as::<_, Geo>(
                "SELECT id, lat, lng, address_id FROM geos WHERE address_id = ?",
            )
            .bind(address.id)
            .fetch_optional(db)
            .await?
        }
        None => None,
    };

    let company = sqlx::query_as::<_, Company>(
        "SELECT id, name, catch_phrase, bs, user_id FROM companies WHERE user_id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(UserView::from_parts(user, address, geo, company))
}

fn ensure_required(value: &str, field: &'static str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput {
            field,
            reason: "must not be empty",
        });
    }
    Ok(())
}

fn ensure_email_valid(email: &str) -> ServiceResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ServiceError::InvalidInput {
            field: "email",
            reason: "must be a valid email address",
        });
    }
    Ok(())
}

fn ensure_password_valid(password: &str) -> ServiceResult<()> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(ServiceError::InvalidInput {
            field: "password",
            reason: "must be at least 6 characters",
        });
    }
    Ok(())
}
