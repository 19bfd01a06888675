use std::sync::Arc;

pub mod ingredient_repo;
pub mod nutrient_repo;
pub mod recipe_repo;
pub mod reconcile;
pub mod tag_repo;
pub mod user_repo;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;

use ingredient_repo::IngredientRepo;
use nutrient_repo::NutrientRepo;
use recipe_repo::RecipeRepo;
use tag_repo::TagRepo;
use user_repo::UserRepo;

/// Handles to every repository, all backed by the same store.
#[derive(Clone)]
pub struct Repos {
    pub user_repo: Arc<dyn UserRepo>,
    pub recipe_repo: Arc<dyn RecipeRepo>,
    pub tag_repo: Arc<dyn TagRepo>,
    pub ingredient_repo: Arc<dyn IngredientRepo>,
    pub nutrient_repo: Arc<dyn NutrientRepo>,
}
