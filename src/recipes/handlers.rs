use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::{
    repo_types::{Recipe, RecipeFields, RecipePatch},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes = services::list(state.recipes.as_ref(), &who).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state, who, body), fields(user_id = %who.user_id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    AppJson(body): AppJson<RecipeFields>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = services::create(state.recipes.as_ref(), &who, body).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = services::get(state.recipes.as_ref(), &who, id).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state, who, body), fields(user_id = %who.user_id))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<RecipePatch>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = services::update(state.recipes.as_ref(), &who, id, body).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(state.recipes.as_ref(), &who, id).await?;
    Ok(Json(MessageResponse {
        message: "Recipe deleted successfully",
    }))
}
