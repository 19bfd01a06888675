use crate::nutrient_repo::{NewNutrient, Nutrient};
use crate::user_repo::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub nutrients: Vec<Nutrient>,
}

impl Ingredient {
    pub fn new(
        id: i32,
        name: String,
        image: Option<String>,
        nutrients: Vec<Nutrient>,
    ) -> Ingredient {
        Ingredient {
            id,
            name,
            image,
            nutrients,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewIngredient {
    pub name: String,
    pub nutrients: Vec<NewNutrient>,
}

impl NewIngredient {
    pub fn new(name: String, nutrients: Vec<NewNutrient>) -> NewIngredient {
        NewIngredient { name, nutrients }
    }
}

/// Partial update of an ingredient. A present `nutrients` list replaces every existing nutrient
/// association, an absent one leaves them untouched.
#[derive(Clone, Debug, Default)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub nutrients: Option<Vec<NewNutrient>>,
}

#[derive(Error, Debug)]
pub enum IngredientRepoError {
    #[error("Ingredient with id {0} not found")]
    IngredientNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait IngredientRepo: Sync + Send {
    /// Ingredients owned by `user`, ordered by name descending. With `assigned_only` only
    /// ingredients used by at least one recipe are returned.
    async fn get_ingredients(
        &self,
        user: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, IngredientRepoError>;

    async fn get_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
    ) -> Result<Ingredient, IngredientRepoError>;

    /// Creates the ingredient and resolves its nutrients with get-or-create.
    async fn create_ingredient(
        &self,
        user: UserId,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, IngredientRepoError>;

    async fn update_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
        patch: IngredientPatch,
    ) -> Result<Ingredient, IngredientRepoError>;

    async fn set_ingredient_image(
        &self,
        user: UserId,
        ingredient_id: i32,
        image: String,
    ) -> Result<Ingredient, IngredientRepoError>;

    /// Deletes the ingredient and its associations. Its nutrients are kept.
    async fn delete_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
    ) -> Result<Ingredient, IngredientRepoError>;
}
