use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{NewUser, User};
use crate::error::AppError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts an active user with the default role. Duplicate username or
    /// email surfaces as [`AppError::Conflict`].
    async fn create(&self, new: NewUser) -> Result<User, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepo {
    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, hashed_password, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, hashed_password, first_name, last_name, is_active, role
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.hashed_password)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Username or email already registered".into()),
            other => other,
        })?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, first_name, last_name, is_active, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
