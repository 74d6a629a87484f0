use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{
    repo::RecipeRepository,
    repo_types::{Recipe, RecipeFields, RecipePatch},
};
use crate::{auth::jwt::Identity, error::AppError};

const NAME_LEN: (usize, usize) = (3, 128);
const TEXT_LEN: (usize, usize) = (3, 256);

fn check_len(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn validate_fields(f: &RecipeFields) -> Result<(), AppError> {
    check_len("name", &f.name, NAME_LEN)?;
    check_len("description", &f.description, TEXT_LEN)?;
    check_len("ingredients", &f.ingredients, TEXT_LEN)?;
    check_len("instructions", &f.instructions, TEXT_LEN)
}

fn validate_patch(p: &RecipePatch) -> Result<(), AppError> {
    if let Some(v) = &p.name {
        check_len("name", v, NAME_LEN)?;
    }
    if let Some(v) = &p.description {
        check_len("description", v, TEXT_LEN)?;
    }
    if let Some(v) = &p.ingredients {
        check_len("ingredients", v, TEXT_LEN)?;
    }
    if let Some(v) = &p.instructions {
        check_len("instructions", v, TEXT_LEN)?;
    }
    Ok(())
}

pub async fn list(recipes: &dyn RecipeRepository, who: &Identity) -> Result<Vec<Recipe>, AppError> {
    recipes.list(who.user_id).await
}

pub async fn create(
    recipes: &dyn RecipeRepository,
    who: &Identity,
    fields: RecipeFields,
) -> Result<Recipe, AppError> {
    validate_fields(&fields)?;
    let recipe = recipes
        .create(who.user_id, fields, OffsetDateTime::now_utc())
        .await?;
    info!(recipe_id = %recipe.id, owner_id = %who.user_id, "recipe created");
    Ok(recipe)
}

pub async fn get(
    recipes: &dyn RecipeRepository,
    who: &Identity,
    id: Uuid,
) -> Result<Recipe, AppError> {
    recipes
        .get(id, who.user_id)
        .await?
        .ok_or(AppError::NotFound("Recipe"))
}

pub async fn update(
    recipes: &dyn RecipeRepository,
    who: &Identity,
    id: Uuid,
    patch: RecipePatch,
) -> Result<Recipe, AppError> {
    validate_patch(&patch)?;
    let recipe = recipes
        .update(id, who.user_id, patch, OffsetDateTime::now_utc())
        .await?
        .ok_or(AppError::NotFound("Recipe"))?;
    info!(recipe_id = %recipe.id, owner_id = %who.user_id, "recipe updated");
    Ok(recipe)
}

pub async fn delete(recipes: &dyn RecipeRepository, who: &Identity, id: Uuid) -> Result<(), AppError> {
    if !recipes.delete(id, who.user_id).await? {
        return Err(AppError::NotFound("Recipe"));
    }
    info!(recipe_id = %id, owner_id = %who.user_id, "recipe deleted");
    Ok(())
}
