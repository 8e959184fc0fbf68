//! Authentication service — credential verification, token issuance, and
//! token-to-user resolution for the bearer guard.

use crate::{
    models::user::{JwtUser, LoginDto, LoginResponse},
    services::{ServiceError, ServiceResult, password, token, users_service::UsersService},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AuthService {
    users: UsersService,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(db: Arc<SqlitePool>, jwt_secret: String) -> Self {
        Self {
            users: UsersService::new(db),
            jwt_secret,
        }
    }

    /// Look up the user by email and verify the password.
    ///
    /// Unknown email and wrong password both come back as `Ok(None)` so the
    /// caller cannot distinguish them (no account enumeration).
    pub async fn validate_credentials(
        &self,
        email: &str,
        plain_password: &str,
    ) -> ServiceResult<Option<JwtUser>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };

        if password::verify_password(plain_password, &user.password)? {
            Ok(Some(JwtUser::from(&user)))
        } else {
            Ok(None)
        }
    }

    /// Exchange credentials for a signed bearer token.
    pub async fn login(&self, dto: LoginDto) -> ServiceResult<LoginResponse> {
        let user = self
            .validate_credentials(&dto.email, &dto.password)
            .await?
            .ok_or_else(|| {
                warn!("failed login attempt");
                ServiceError::InvalidCredentials
            })?;

        let access_token = token::issue(&self.jwt_secret, user.id, &user.email)?;
        debug!("issued token for user {}", user.id);
        Ok(LoginResponse { access_token, user })
    }

    /// Resolve a bearer token to its user.
    ///
    /// The decoded subject must still exist in the store: a token outliving
    /// its user is as invalid as a bad signature.
    pub async fn authenticate(&self, bearer_token: &str) -> ServiceResult<JwtUser> {
        let claims = token::verify(&self.jwt_secret, bearer_token).map_err(|err| {
            warn!("rejected token: {}", err);
            ServiceError::InvalidToken
        })?;

        let user = self
            .users
            .fetch_by_id(claims.sub)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        Ok(JwtUser::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::CreateUserDto, services::users_service::UsersService};

    const SECRET: &str = "test-secret";

    async fn services() -> (UsersService, AuthService) {
        let db = db::connect("sqlite::memory:").await.unwrap();
        db::apply_migrations(&db).await.unwrap();
        (
            UsersService::new(db.clone()),
            AuthService::new(db, SECRET.into()),
        )
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

    #[tokio::test]
    async fn login_with_valid_credentials_issues_token() {
        let (users, auth) = services().await;
        let id = seed_user(&users).await;

        let response = auth
            .login(LoginDto {
                email: "a@x.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        assert!(!response.access_token.is_empty());
        assert_eq!(response.user.id, id);
        assert_eq!(response.user.username, "a");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_identical() {
        let (users, auth) = services().await;
        seed_user(&users).await;

        let wrong_password = auth
            .login(LoginDto {
                email: "a@x.com".into(),
                password: "not-it".into(),
            })
            .await;
        let unknown_email = auth
            .login(LoginDto {
                email: "nobody@x.com".into(),
                password: "secret1".into(),
            })
            .await;

        for result in [wrong_password, unknown_email] {
            match result {
                Err(ServiceError::InvalidCredentials) => {}
                other => panic!("expected InvalidCredentials, got {:?}", other.err()),
            }
        }
    }

    #[tokio::test]
    async fn authenticate_round_trips_a_fresh_token() {
        let (users, auth) = services().await;
        let id = seed_user(&users).await;

        let response = auth
            .login(LoginDto {
                email: "a@x.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        let current = auth.authenticate(&response.access_token).await.unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.email, "a@x.com");
    }

    #[tokio::test]
    async fn authenticate_rejects_garbage_and_stale_subjects() {
        let (users, auth) = services().await;
        let id = seed_user(&users).await;

        assert!(matches!(
            auth.authenticate("not.a.token").await,
            Err(ServiceError::InvalidToken)
        ));

        let response = auth
            .login(LoginDto {
                email: "a@x.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        // A token for a user that has since been deleted is rejected.
        users.remove(id).await.unwrap();
        assert!(matches!(
            auth.authenticate(&response.access_token).await,
            Err(ServiceError::InvalidToken)
        ));
    }
}
