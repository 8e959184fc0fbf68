//! User entity, its nested address/geo/company records, and the request/response
//! shapes built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row as stored in SQLite.
///
/// This is the only struct that carries the bcrypt password hash. It is
/// deliberately not `Serialize`: anything leaving the service layer goes
/// through [`UserView`] or [`JwtUser`] instead.
#[derive(Clone, FromRow, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,

    /// Globally unique handle.
    pub username: String,

    /// Globally unique email, also the login identifier.
    pub email: String,

    /// bcrypt hash of the password, never the plaintext.
    pub password: String,

    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Postal address owned by exactly one user.
#[derive(Clone, FromRow, Debug)]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub suite: Option<String>,
    pub city: String,
    pub zipcode: String,
    pub user_id: i64,
}

/// Geographic coordinates owned by exactly one address.
///
/// Coordinates are kept as strings to match the upstream API contract
/// (`"lat": "-37.3159"`), not parsed into floats.
#[derive(Clone, FromRow, Debug)]
pub struct Geo {
    pub id: i64,
    pub lat: String,
    pub lng: String,
    pub address_id: i64,
}

/// Company record owned by exactly one user.
#[derive(Clone, FromRow, Debug)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub catch_phrase: Option<String>,
    pub bs: Option<String>,
    pub user_id: i64,
}

/// Outward-facing user representation with nested records attached.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyView>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    pub city: String,
    pub zipcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoView>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GeoView {
    pub lat: String,
    pub lng: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch_phrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

/// The subset of a user embedded in token responses and request extensions.
/// Derived on demand, never persisted.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct JwtUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub name: String,
}

impl From<&User> for JwtUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
        }
    }
}

impl UserView {
    /// Assemble the outward view from its row parts, dropping the password.
    pub fn from_parts(
        user: User,
        address: Option<Address>,
        geo: Option<Geo>,
        company: Option<Company>,
    ) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            phone: user.phone,
            website: user.website,
            created_at: user.created_at,
            updated_at: user.updated_at,
            address: address.map(|a| AddressView {
                street: a.street,
                suite: a.suite,
                city: a.city,
                zipcode: a.zipcode,
                geo: geo.map(|g| GeoView {
                    lat: g.lat,
                    lng: g.lng,
                }),
            }),
            company: company.map(|c| CompanyView {
                name: c.name,
                catch_phrase: c.catch_phrase,
                bs: c.bs,
            }),
        }
    }
}

/// Body of `POST /users`.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<AddressDto>,
    #[serde(default)]
    pub company: Option<CompanyDto>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub street: String,
    #[serde(default)]
    pub suite: Option<String>,
    pub city: String,
    pub zipcode: String,
    #[serde(default)]
    pub geo: Option<GeoDto>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GeoDto {
    pub lat: String,
    pub lng: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub name: String,
    #[serde(default)]
    pub catch_phrase: Option<String>,
    #[serde(default)]
    pub bs: Option<String>,
}

/// Body of `PATCH /users/{id}`. Every field is optional; nested objects
/// upsert independently of the flat fields.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<AddressDto>,
    #[serde(default)]
    pub company: Option<CompanyDto>,
}

/// Body of `POST /auth/login`.
#[derive(Deserialize, Clone, Debug)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: JwtUser,
}
