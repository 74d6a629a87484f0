//! In-memory repositories backing `AppState::fake()` and the test-suite.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepository,
        repo_types::{NewUser, User},
    },
    error::AppError,
    ratings::repo::{Rating, RatingRepository},
    recipes::{
        repo::RecipeRepository,
        repo_types::{Recipe, RecipeFields, RecipePatch},
    },
};

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().await;
        if users
            .iter()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(AppError::Conflict(
                "Username or email already registered".into(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            hashed_password: new.hashed_password,
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: true,
            role: "user".into(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}

#[derive(Default)]
pub struct MemoryRecipeRepo {
    recipes: Mutex<Vec<Recipe>>,
}

#[async_trait]
impl RecipeRepository for MemoryRecipeRepo {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Recipe>, AppError> {
        let recipes = self.recipes.lock().await;
        Ok(recipes
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        owner_id: Uuid,
        fields: RecipeFields,
        now: OffsetDateTime,
    ) -> Result<Recipe, AppError> {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: fields.name,
            image: fields.image,
            description: fields.description,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        self.recipes.lock().await.push(recipe.clone());
        Ok(recipe)
    }

    async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Recipe>, AppError> {
        let recipes = self.recipes.lock().await;
        Ok(recipes
            .iter()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: RecipePatch,
        now: OffsetDateTime,
    ) -> Result<Option<Recipe>, AppError> {
        let mut recipes = self.recipes.lock().await;
        let Some(recipe) = recipes
            .iter_mut()
            .find(|r| r.id == id && r.owner_id == owner_id)
        else {
            return Ok(None);
        };
        patch.apply_to(recipe);
        recipe.updated_at = now;
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let mut recipes = self.recipes.lock().await;
        let before = recipes.len();
        recipes.retain(|r| !(r.id == id && r.owner_id == owner_id));
        Ok(recipes.len() < before)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.recipes.lock().await.iter().any(|r| r.id == id))
    }
}

#[derive(Default)]
pub struct MemoryRatingRepo {
    ratings: Mutex<Vec<Rating>>,
}

#[async_trait]
impl RatingRepository for MemoryRatingRepo {
    async fn upsert(
        &self,
        recipe_id: Uuid,
        user_id: Uuid,
        value: i32,
        now: OffsetDateTime,
    ) -> Result<Rating, AppError> {
        // Lookup and write happen under one lock, so the key stays unique.
        let mut ratings = self.ratings.lock().await;
        if let Some(existing) = ratings
            .iter_mut()
            .find(|r| r.recipe_id == recipe_id && r.user_id == user_id)
        {
            existing.rating = value;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let rating = Rating {
            id: Uuid::new_v4(),
            rating: value,
            recipe_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        ratings.push(rating.clone());
        Ok(rating)
    }
}

impl MemoryRatingRepo {
    /// Every stored row for the pair; more than one would mean a broken upsert.
    pub async fn rows_for(&self, recipe_id: Uuid, user_id: Uuid) -> Vec<Rating> {
        let ratings = self.ratings.lock().await;
        ratings
            .iter()
            .filter(|r| r.recipe_id == recipe_id && r.user_id == user_id)
            .cloned()
            .collect()
    }
}
