use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// All user-supplied fields of a recipe, as accepted on create.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeFields {
    pub name: String,
    pub image: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
}

impl RecipePatch {
    pub fn apply_to(self, recipe: &mut Recipe) {
        if let Some(v) = self.name {
            recipe.name = v;
        }
        if let Some(v) = self.image {
            recipe.image = v;
        }
        if let Some(v) = self.description {
            recipe.description = v;
        }
        if let Some(v) = self.ingredients {
            recipe.ingredients = v;
        }
        if let Some(v) = self.instructions {
            recipe.instructions = v;
        }
    }
}
