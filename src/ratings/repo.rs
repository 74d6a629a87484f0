use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub rating: i32,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Inserts the rating for `(recipe_id, user_id)` or, if one exists,
    /// overwrites its value and `updated_at`. Atomic per key.
    async fn upsert(
        &self,
        recipe_id: Uuid,
        user_id: Uuid,
        value: i32,
        now: OffsetDateTime,
    ) -> Result<Rating, AppError>;
}

#[derive(Clone)]
pub struct PgRatingRepo {
    db: PgPool,
}

impl PgRatingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RatingRepository for PgRatingRepo {
    async fn upsert(
        &self,
        recipe_id: Uuid,
        user_id: Uuid,
        value: i32,
        now: OffsetDateTime,
    ) -> Result<Rating, AppError> {
        // Relies on UNIQUE (recipe_id, user_id) so concurrent calls cannot duplicate.
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (rating, recipe_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (recipe_id, user_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = EXCLUDED.updated_at
            RETURNING id, rating, recipe_id, user_id, created_at, updated_at
            "#,
        )
        .bind(value)
        .bind(recipe_id)
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(rating)
    }
}
