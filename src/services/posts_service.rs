//! Posts service — CRUD over posts, each owned by an existing user.

use crate::{
    models::post::{CreatePostDto, Post, PostView, UpdatePostDto},
    services::{
        ServiceError, ServiceResult,
        users_service::{UsersService, fetch_user_view},
    },
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

const POST_COLUMNS: &str = "id, title, body, user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PostsService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
    users: UsersService,
}

impl PostsService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            users: UsersService::new(db.clone()),
            db,
        }
    }

    /// Create a post. The owner comes from the authenticated token when
    /// present, otherwise from the DTO's `userId`; with neither, the request
    /// is rejected before any store call. The owner must exist.
    pub async fn create(
        &self,
        dto: CreatePostDto,
        token_user_id: Option<i64>,
    ) -> ServiceResult<PostView> {
        ensure_required(&dto.title, "title")?;
        ensure_required(&dto.body, "body")?;

        let owner_id = token_user_id
            .or(dto.user_id)
            .ok_or(ServiceError::MissingOwner)?;

        if !self.users.exists(owner_id).await? {
            return Err(ServiceError::UserNotFound(owner_id));
        }

        let now = Utc::now();
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (title, body, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await?;

        debug!("created post {} for user {}", post.id, owner_id);
        self.with_owner(post).await
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<PostView>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY id"
        ))
        .fetch_all(&*self.db)
        .await?;
        self.with_owners(posts).await
    }

    pub async fn find_one(&self, id: i64) -> ServiceResult<PostView> {
        let post = self.fetch_post(id).await?;
        self.with_owner(post).await
    }

    /// Partial update of title/body; existence is re-verified first, and
    /// supplied fields face the same validation as on create.
    pub async fn update(&self, id: i64, dto: UpdatePostDto) -> ServiceResult<PostView> {
        let current = self.fetch_post(id).await?;

        if let Some(title) = &dto.title {
            ensure_required(title, "title")?;
        }
        if let Some(body) = &dto.body {
            ensure_required(body, "body")?;
        }

        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET title = ?, body = ?, updated_at = ?
             WHERE id = ?
             RETURNING {POST_COLUMNS}"
        ))
        .bind(dto.title.unwrap_or(current.title))
        .bind(dto.body.unwrap_or(current.body))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&*self.db)
        .await?;

        self.with_owner(post).await
    }

    pub async fn remove(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::PostNotFound(id));
        }
        debug!("removed post {}", id);
        Ok(())
    }

    /// All posts owned by `user_id`. An unknown user simply has no posts;
    /// this never fails with NotFound.
    pub async fn find_by_user(&self, user_id: i64) -> ServiceResult<Vec<PostView>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;
        self.with_owners(posts).await
    }

    async fn fetch_post(&self, id: i64) -> ServiceResult<Post> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(ServiceError::PostNotFound(id))
    }

    async fn with_owner(&self, post: Post) -> ServiceResult<PostView> {
        let owner = fetch_user_view(&self.db, post.user_id).await?;
        Ok(PostView::from_post(post, Some(owner)))
    }

    async fn with_owners(&self, posts: Vec<Post>) -> ServiceResult<Vec<PostView>> {
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.with_owner(post).await?);
        }
        Ok(views)
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::CreateUserDto, services::users_service::UsersService};

    async fn services() -> (UsersService, PostsService) {
        let db = db::connect("sqlite::memory:").await.unwrap();
        db::apply_migrations(&db).await.unwrap();
        (UsersService::new(db.clone()), PostsService::new(db))
    }

    async fn seed_user(users: &UsersService) -> i64 {
        users
            .create(CreateUserDto {
                name: "A".into(),
                username: "a".into(),
                email: "a@x.com".into(),
                password: "secret1".into(),
                phone: None,
                website: None,
                address: None,
                company: None,
            })
            .await
            .unwrap()
            .id
    }

    fn post_dto(user_id: Option<i64>) -> CreatePostDto {
        CreatePostDto {
            title: "sunt aut facere".into(),
            body: "quia et suscipit".into(),
            user_id,
        }
    }

    #[tokio::test]
    async fn create_resolves_owner_from_token_over_dto() {
        let (users, posts) = services().await;
        let owner = seed_user(&users).await;

        let view = posts.create(post_dto(Some(9999)), Some(owner)).await.unwrap();
        assert_eq!(view.user_id, owner);
        let embedded = view.user.unwrap();
        assert_eq!(embedded.id, owner);

        // The embedded owner never carries the password hash.
        let json = serde_json::to_value(posts.find_one(view.id).await.unwrap()).unwrap();
        assert!(json["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn create_without_any_owner_is_rejected() {
        let (_users, posts) = services().await;
        assert!(matches!(
            posts.create(post_dto(None), None).await,
            Err(ServiceError::MissingOwner)
        ));
        assert!(posts.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_for_unknown_owner_is_not_found() {
        let (_users, posts) = services().await;
        assert!(matches!(
            posts.create(post_dto(Some(42)), None).await,
            Err(ServiceError::UserNotFound(42))
        ));
        assert!(posts.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_one_missing_is_not_found() {
        let (_users, posts) = services().await;
        assert!(matches!(
            posts.find_one(999).await,
            Err(ServiceError::PostNotFound(999))
        ));
    }

    #[tokio::test]
    async fn update_and_remove_are_existence_checked() {
        let (users, posts) = services().await;
        let owner = seed_user(&users).await;
        let created = posts.create(post_dto(None), Some(owner)).await.unwrap();

        let updated = posts
            .update(
                created.id,
                UpdatePostDto {
                    title: Some("new title".into()),
                    body: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.body, "quia et suscipit");

        posts.remove(created.id).await.unwrap();
        assert!(matches!(
            posts.update(created.id, UpdatePostDto::default()).await,
            Err(ServiceError::PostNotFound(_))
        ));
        assert!(matches!(
            posts.remove(created.id).await,
            Err(ServiceError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_blank_title_or_body() {
        let (users, posts) = services().await;
        let owner = seed_user(&users).await;
        let created = posts.create(post_dto(None), Some(owner)).await.unwrap();

        assert!(matches!(
            posts
                .update(
                    created.id,
                    UpdatePostDto {
                        title: Some("   ".into()),
                        body: None,
                    },
                )
                .await,
            Err(ServiceError::InvalidInput { field: "title", .. })
        ));
        assert!(matches!(
            posts
                .update(
                    created.id,
                    UpdatePostDto {
                        title: None,
                        body: Some(String::new()),
                    },
                )
                .await,
            Err(ServiceError::InvalidInput { field: "body", .. })
        ));

        // The rejected updates changed nothing.
        let unchanged = posts.find_one(created.id).await.unwrap();
        assert_eq!(unchanged.title, "sunt aut facere");
        assert_eq!(unchanged.body, "quia et suscipit");
    }

    #[tokio::test]
    async fn find_by_user_may_be_empty() {
        let (users, posts) = services().await;
        let owner = seed_user(&users).await;
        assert!(posts.find_by_user(owner).await.unwrap().is_empty());
        assert!(posts.find_by_user(12345).await.unwrap().is_empty());

        posts.create(post_dto(None), Some(owner)).await.unwrap();
        assert_eq!(posts.find_by_user(owner).await.unwrap().len(), 1);
    }
}
