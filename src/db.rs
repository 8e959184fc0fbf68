//! SQLite pool construction, embedded schema migrations, and demo seed data.

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc};
use tracing::{debug, info};

use crate::{
    models::{
        post::CreatePostDto,
        user::{AddressDto, CompanyDto, CreateUserDto, GeoDto},
    },
    services::{ServiceResult, posts_service::PostsService, users_service::UsersService},
};

/// Schema statements, embedded so tests and the `--migrate` flag apply the
/// exact same DDL.
const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Open a SQLite pool for the given URL.
///
/// Foreign keys are switched on per connection so `ON DELETE CASCADE`
/// actually fires; the database file is created on first use.
pub async fn connect(database_url: &str) -> Result<Arc<SqlitePool>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database exists per connection; a pool of one keeps every
    // caller on the same schema.
    let max_connections = if database_url.contains(":memory:") || database_url.contains("mode=memory")
    {
        1
    } else {
        5
    };

    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(Arc::new(db))
}

/// Apply the embedded schema, statement by statement.
pub async fn apply_migrations(db: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = SCHEMA
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    info!("running {} migration statements", statements.len());
    for stmt in statements {
        debug!("executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// Insert the canonical JSONPlaceholder demo users and a few posts.
///
/// Goes through the services so hashing and nested creation behave exactly
/// like production writes. Users that already exist are skipped, so the
/// `--seed` flag is safe to run repeatedly.
pub async fn seed_demo_data(db: Arc<SqlitePool>) -> ServiceResult<()> {
    let users = UsersService::new(db.clone());
    let posts = PostsService::new(db);

    for dto in demo_users() {
        if users.find_by_email(&dto.email).await?.is_some() {
            debug!("seed user {} already present, skipping", dto.email);
            continue;
        }
        let created = users.create(dto).await?;
        info!("seeded user {} ({})", created.id, created.username);

        posts
            .create(
                CreatePostDto {
                    title: "sunt aut facere repellat provident occaecati".into(),
                    body: "quia et suscipit suscipit recusandae consequuntur expedita".into(),
                    user_id: Some(created.id),
                },
                None,
            )
            .await?;
    }
    Ok(())
}

fn demo_users() -> Vec<CreateUserDto> {
    vec![
        CreateUserDto {
            name: "Leanne Graham".into(),
            username: "Bret".into(),
            email: "Sincere@april.biz".into(),
            password: "password123".into(),
            phone: Some("1-770-736-8031 x56442".into()),
            website: Some("hildegard.org".into()),
            address: Some(AddressDto {
                street: "Kulas Light".into(),
                suite: Some("Apt. 556".into()),
                city: "Gwenborough".into(),
                zipcode: "92998-3874".into(),
                geo: Some(GeoDto {
                    lat: "-37.3159".into(),
                    lng: "81.1496".into(),
                }),
            }),
            company: Some(CompanyDto {
                name: "Romaguera-Crona".into(),
                catch_phrase: Some("Multi-layered client-server neural-net".into()),
                bs: Some("harness real-time e-markets".into()),
            }),
        },
        CreateUserDto {
            name: "Ervin Howell".into(),
            username: "Antonette".into(),
            email: "Shanna@melissa.tv".into(),
            password: "password123".into(),
            phone: Some("010-692-6593 x09125".into()),
            website: Some("anastasia.net".into()),
            address: Some(AddressDto {
                street: "Victor Plains".into(),
                suite: Some("Suite 879".into()),
                city: "Wisokyburgh".into(),
                zipcode: "90566-7771".into(),
                geo: Some(GeoDto {
                    lat: "-43.9509".into(),
                    lng: "-34.4618".into(),
                }),
            }),
            company: Some(CompanyDto {
                name: "Deckow-Crist".into(),
                catch_phrase: Some("Proactive didactic contingency".into()),
                bs: Some("synergize scalable supply-chains".into()),
            }),
        },
        CreateUserDto {
            name: "Clementine Bauch".into(),
            username: "Samantha".into(),
            email: "Nathan@yesenia.net".into(),
            password: "password123".into(),
            phone: Some("1-463-123-4447".into()),
            website: Some("ramiro.info".into()),
            address: Some(AddressDto {
                street: "Douglas Extension".into(),
                suite: Some("Suite 847".into()),
                city: "McKenziehaven".into(),
                zipcode: "59590-4157".into(),
                geo: Some(GeoDto {
                    lat: "-68.6102".into(),
                    lng: "-47.0653".into(),
                }),
            }),
            company: Some(CompanyDto {
                name: "Romaguera-Jacobson".into(),
                catch_phrase: Some("Face to face bifurcated interface".into()),
                bs: Some("e-enable strategic applications".into()),
            }),
        },
    ]
}
