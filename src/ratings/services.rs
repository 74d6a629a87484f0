use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::repo::{Rating, RatingRepository};
use crate::{auth::jwt::Identity, error::AppError, recipes::repo::RecipeRepository};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Stores the caller's rating for a recipe, replacing any earlier one.
/// Any authenticated user may rate any existing recipe.
pub async fn rate(
    recipes: &dyn RecipeRepository,
    ratings: &dyn RatingRepository,
    who: &Identity,
    recipe_id: Uuid,
    value: i32,
) -> Result<Rating, AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(AppError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    if !recipes.exists(recipe_id).await? {
        return Err(AppError::NotFound("Recipe"));
    }

    // A recipe deleted between the check and the write fails the foreign key,
    // which also maps to NotFound.
    let rating = ratings
        .upsert(recipe_id, who.user_id, value, OffsetDateTime::now_utc())
        .await?;
    info!(%recipe_id, user_id = %who.user_id, rating = value, "rating stored");
    Ok(rating)
}
