use crate::tag_repo::Tag;
use crate::user_repo::UserId;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct RecipeIngredient {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub time_minutes: i32,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub image: Option<String>,
}

/// A recipe to be created. `tags` and `ingredients` hold names which are resolved with
/// get-or-create against the owner's existing rows.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

impl NewRecipe {
    pub fn new(title: String, time_minutes: i32, price: Decimal) -> NewRecipe {
        NewRecipe {
            title,
            time_minutes,
            price,
            description: String::new(),
            link: String::new(),
            tags: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> NewRecipe {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_ingredients(mut self, ingredients: &[&str]) -> NewRecipe {
        self.ingredients = ingredients.iter().map(|i| i.to_string()).collect();
        self
    }
}

/// Partial update of a recipe. Scalar fields are replaced when present. A present `tags` or
/// `ingredients` list clears that relation before resolving the new names.
#[derive(Clone, Debug, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct RecipeFilter {
    /// Recipes with at least one of these tags.
    pub tags: Option<Vec<i32>>,
    /// Recipes with at least one of these ingredients.
    pub ingredients: Option<Vec<i32>>,
}

impl RecipeFilter {
    pub const NONE: RecipeFilter = RecipeFilter {
        tags: None,
        ingredients: None,
    };
}

#[derive(Error, Debug)]
pub enum RecipeRepoError {
    #[error("Recipe with id {0} not found")]
    RecipeNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait RecipeRepo: Sync + Send {
    /// Recipes owned by `user`, newest first.
    async fn get_recipes(
        &self,
        user: UserId,
        filter: RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepoError>;

    async fn get_recipe(&self, user: UserId, recipe_id: i32) -> Result<Recipe, RecipeRepoError>;

    async fn create_recipe(
        &self,
        user: UserId,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, RecipeRepoError>;

    async fn update_recipe(
        &self,
        user: UserId,
        recipe_id: i32,
        patch: RecipePatch,
    ) -> Result<Recipe, RecipeRepoError>;

    async fn set_recipe_image(
        &self,
        user: UserId,
        recipe_id: i32,
        image: String,
    ) -> Result<Recipe, RecipeRepoError>;

    /// Deletes the recipe and its associations. Tags and ingredients are kept.
    async fn delete_recipe(&self, user: UserId, recipe_id: i32) -> Result<Recipe, RecipeRepoError>;
}
