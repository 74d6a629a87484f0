use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::services;
use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath},
    recipes::handlers::MessageResponse,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: i32,
}

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/recipes/:id/rate", post(rate_recipe))
}

#[instrument(skip(state, who), fields(user_id = %who.user_id))]
pub async fn rate_recipe(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<RatingRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::rate(
        state.recipes.as_ref(),
        state.ratings.as_ref(),
        &who,
        id,
        body.rating,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: "Rating added successfully",
    }))
}
