use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Recipe, RecipeFields, RecipePatch};
use crate::error::AppError;

/// Recipe storage. Every per-recipe call except [`RecipeRepository::exists`]
/// is scoped by owner: a recipe owned by someone else behaves as absent.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Recipe>, AppError>;

    async fn create(
        &self,
        owner_id: Uuid,
        fields: RecipeFields,
        now: OffsetDateTime,
    ) -> Result<Recipe, AppError>;

    async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Recipe>, AppError>;

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: RecipePatch,
        now: OffsetDateTime,
    ) -> Result<Option<Recipe>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError>;

    /// Existence by id alone, regardless of owner.
    async fn exists(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgRecipeRepo {
    db: PgPool,
}

impl PgRecipeRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepo {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Recipe>, AppError> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, image, description, ingredients, instructions,
                   owner_id, created_at, updated_at
            FROM recipes
            WHERE owner_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(
        &self,
        owner_id: Uuid,
        fields: RecipeFields,
        now: OffsetDateTime,
    ) -> Result<Recipe, AppError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (name, image, description, ingredients, instructions,
                                 owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, name, image, description, ingredients, instructions,
                      owner_id, created_at, updated_at
            "#,
        )
        .bind(fields.name)
        .bind(fields.image)
        .bind(fields.description)
        .bind(fields.ingredients)
        .bind(fields.instructions)
        .bind(owner_id)
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(recipe)
    }

    async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Recipe>, AppError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, image, description, ingredients, instructions,
                   owner_id, created_at, updated_at
            FROM recipes
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(recipe)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: RecipePatch,
        now: OffsetDateTime,
    ) -> Result<Option<Recipe>, AppError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
               SET name         = COALESCE($3, name),
                   image        = COALESCE($4, image),
                   description  = COALESCE($5, description),
                   ingredients  = COALESCE($6, ingredients),
                   instructions = COALESCE($7, instructions),
                   updated_at   = $8
             WHERE id = $1 AND owner_id = $2
            RETURNING id, name, image, description, ingredients, instructions,
                      owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(patch.name)
        .bind(patch.image)
        .bind(patch.description)
        .bind(patch.ingredients)
        .bind(patch.instructions)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        Ok(recipe)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM recipes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::{PgUserRepo, UserRepository};
    use crate::auth::repo_types::NewUser;
    use time::macros::datetime;

    async fn seed_user(pool: &PgPool, username: &str) -> Uuid {
        PgUserRepo::new(pool.clone())
            .create(NewUser {
                username: username.into(),
                email: format!("{username}@x.com"),
                hashed_password: "$argon2id$v=19$stub".into(),
                first_name: "First".into(),
                last_name: "Last".into(),
            })
            .await
            .unwrap()
            .id
    }

    fn fields(name: &str) -> RecipeFields {
        RecipeFields {
            name: name.into(),
            image: "https://img.example/soup.png".into(),
            description: "A warm soup".into(),
            ingredients: "water, salt, leeks".into(),
            instructions: "Boil everything".into(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn other_owner_sees_nothing(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let repo = PgRecipeRepo::new(pool);
        let created_at = datetime!(2024-01-01 12:00 UTC);

        let recipe = repo.create(alice, fields("Leek soup"), created_at).await.unwrap();
        assert_eq!(recipe.created_at, created_at);
        assert_eq!(recipe.updated_at, created_at);

        assert!(repo.get(recipe.id, bob).await.unwrap().is_none());
        let patch = RecipePatch {
            name: Some("Stolen".into()),
            ..Default::default()
        };
        assert!(repo
            .update(recipe.id, bob, patch, datetime!(2024-01-02 12:00 UTC))
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete(recipe.id, bob).await.unwrap());
        assert!(repo.list(bob).await.unwrap().is_empty());

        // Existence ignores ownership.
        assert!(repo.exists(recipe.id).await.unwrap());

        let mine = repo.get(recipe.id, alice).await.unwrap().unwrap();
        assert_eq!(mine.name, "Leek soup");
        assert_eq!(mine.updated_at, created_at);

        assert!(repo.delete(recipe.id, alice).await.unwrap());
        assert!(!repo.exists(recipe.id).await.unwrap());
        assert!(repo.get(recipe.id, alice).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn partial_update_keeps_unset_columns(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let repo = PgRecipeRepo::new(pool);
        let created_at = datetime!(2024-01-01 12:00 UTC);
        let updated_at = datetime!(2024-01-02 08:30 UTC);
        let original = repo.create(alice, fields("Leek soup"), created_at).await.unwrap();

        let patch = RecipePatch {
            name: Some("Potato soup".into()),
            instructions: Some("Simmer gently".into()),
            ..Default::default()
        };
        let updated = repo
            .update(original.id, alice, patch, updated_at)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Potato soup");
        assert_eq!(updated.instructions, "Simmer gently");
        assert_eq!(updated.image, original.image);
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.ingredients, original.ingredients);
        assert_eq!(updated.owner_id, alice);
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, updated_at);

        let stored = repo.get(original.id, alice).await.unwrap().unwrap();
        assert_eq!(stored.name, "Potato soup");
        assert_eq!(stored.description, original.description);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_is_owner_only_in_creation_order(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let repo = PgRecipeRepo::new(pool);

        repo.create(alice, fields("Second"), datetime!(2024-01-02 00:00 UTC))
            .await
            .unwrap();
        repo.create(alice, fields("First"), datetime!(2024-01-01 00:00 UTC))
            .await
            .unwrap();
        repo.create(bob, fields("Bob's"), datetime!(2024-01-01 06:00 UTC))
            .await
            .unwrap();

        let names: Vec<_> = repo
            .list(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_owner_is_not_found(pool: PgPool) {
        let repo = PgRecipeRepo::new(pool);
        let err = repo
            .create(Uuid::new_v4(), fields("Orphan"), datetime!(2024-01-01 12:00 UTC))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
