use crate::ingredient_repo::IngredientRepoError::IngredientNotFound;
use crate::ingredient_repo::{
    Ingredient, IngredientPatch, IngredientRepo, IngredientRepoError, NewIngredient,
};
use crate::mem_repo::{
    owned_row, owned_row_mut, owned_rows, sort_by_name_desc, IngredientRow, MemRepo,
};
use crate::user_repo::UserId;
use async_trait::async_trait;

#[async_trait]
impl IngredientRepo for MemRepo {
    async fn get_ingredients(
        &self,
        user: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, IngredientRepoError> {
        let read_guard = self.read_lock()?;

        let mut ingredients: Vec<Ingredient> = owned_rows(&read_guard.ingredients, user)
            .filter(|(id, _)| !assigned_only || read_guard.is_ingredient_assigned(*id))
            .map(|(id, _)| read_guard.ingredient(id))
            .collect();
        sort_by_name_desc(&mut ingredients, |i| (i.name.as_str(), i.id));

        Ok(ingredients)
    }

    async fn get_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
    ) -> Result<Ingredient, IngredientRepoError> {
        let read_guard = self.read_lock()?;

        if owned_row(&read_guard.ingredients, user, ingredient_id).is_none() {
            return Err(IngredientNotFound(ingredient_id));
        }

        Ok(read_guard.ingredient(ingredient_id))
    }

    async fn create_ingredient(
        &self,
        user: UserId,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, IngredientRepoError> {
        let mut write_guard = self.write_lock()?;

        let nutrients = write_guard.resolve_nutrients(user, new_ingredient.nutrients);
        let id = write_guard.next_id();
        write_guard.ingredients.insert(
            id,
            IngredientRow {
                user_id: user,
                name: new_ingredient.name,
                image: None,
                nutrients,
            },
        );

        Ok(write_guard.ingredient(id))
    }

    async fn update_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
        patch: IngredientPatch,
    ) -> Result<Ingredient, IngredientRepoError> {
        let mut write_guard = self.write_lock()?;

        if owned_row(&write_guard.ingredients, user, ingredient_id).is_none() {
            return Err(IngredientNotFound(ingredient_id));
        }

        let nutrients = patch
            .nutrients
            .map(|nutrients| write_guard.resolve_nutrients(user, nutrients));
        let row = owned_row_mut(&mut write_guard.ingredients, user, ingredient_id)
            .ok_or(IngredientNotFound(ingredient_id))?;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(nutrients) = nutrients {
            row.nutrients = nutrients;
        }

        Ok(write_guard.ingredient(ingredient_id))
    }

    async fn set_ingredient_image(
        &self,
        user: UserId,
        ingredient_id: i32,
        image: String,
    ) -> Result<Ingredient, IngredientRepoError> {
        let mut write_guard = self.write_lock()?;

        let row = owned_row_mut(&mut write_guard.ingredients, user, ingredient_id)
            .ok_or(IngredientNotFound(ingredient_id))?;
        row.image = Some(image);

        Ok(write_guard.ingredient(ingredient_id))
    }

    async fn delete_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
    ) -> Result<Ingredient, IngredientRepoError> {
        let mut write_guard = self.write_lock()?;

        if owned_row(&write_guard.ingredients, user, ingredient_id).is_none() {
            return Err(IngredientNotFound(ingredient_id));
        }
        let ingredient = write_guard.ingredient(ingredient_id);
        write_guard.ingredients.remove(&ingredient_id);
        for recipe in write_guard.recipes.values_mut() {
            recipe.ingredients.retain(|i| *i != ingredient_id);
        }

        Ok(ingredient)
    }
}
