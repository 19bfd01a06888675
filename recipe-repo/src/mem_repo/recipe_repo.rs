use crate::mem_repo::{owned_row, owned_row_mut, owned_rows, MemRepo, RecipeRow};
use crate::recipe_repo::RecipeRepoError::RecipeNotFound;
use crate::recipe_repo::{
    NewRecipe, Recipe, RecipeFilter, RecipePatch, RecipeRepo, RecipeRepoError,
};
use crate::user_repo::UserId;
use async_trait::async_trait;

fn matches_any(associated: &[i32], wanted: &Option<Vec<i32>>) -> bool {
    match wanted {
        Some(wanted) => associated.iter().any(|id| wanted.contains(id)),
        None => true,
    }
}

#[async_trait]
impl RecipeRepo for MemRepo {
    async fn get_recipes(
        &self,
        user: UserId,
        filter: RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepoError> {
        let read_guard = self.read_lock()?;

        let recipes = owned_rows(&read_guard.recipes, user)
            .rev()
            .filter(|(_, row)| {
                matches_any(&row.tags, &filter.tags)
                    && matches_any(&row.ingredients, &filter.ingredients)
            })
            .map(|(id, _)| read_guard.recipe(id))
            .collect();

        Ok(recipes)
    }

    async fn get_recipe(&self, user: UserId, recipe_id: i32) -> Result<Recipe, RecipeRepoError> {
        let read_guard = self.read_lock()?;

        if owned_row(&read_guard.recipes, user, recipe_id).is_none() {
            return Err(RecipeNotFound(recipe_id));
        }

        Ok(read_guard.recipe(recipe_id))
    }

    async fn create_recipe(
        &self,
        user: UserId,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, RecipeRepoError> {
        let mut write_guard = self.write_lock()?;

        let tags = write_guard.resolve_tags(user, new_recipe.tags);
        let ingredients = write_guard.resolve_ingredients(user, new_recipe.ingredients);
        let id = write_guard.next_id();
        write_guard.recipes.insert(
            id,
            RecipeRow {
                user_id: user,
                title: new_recipe.title,
                time_minutes: new_recipe.time_minutes,
                price: new_recipe.price,
                description: new_recipe.description,
                link: new_recipe.link,
                image: None,
                tags,
                ingredients,
            },
        );

        Ok(write_guard.recipe(id))
    }

    async fn update_recipe(
        &self,
        user: UserId,
        recipe_id: i32,
        patch: RecipePatch,
    ) -> Result<Recipe, RecipeRepoError> {
        let mut write_guard = self.write_lock()?;

        if owned_row(&write_guard.recipes, user, recipe_id).is_none() {
            return Err(RecipeNotFound(recipe_id));
        }

        let tags = patch
            .tags
            .map(|names| write_guard.resolve_tags(user, names));
        let ingredients = patch
            .ingredients
            .map(|names| write_guard.resolve_ingredients(user, names));

        let row = owned_row_mut(&mut write_guard.recipes, user, recipe_id)
            .ok_or(RecipeNotFound(recipe_id))?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(time_minutes) = patch.time_minutes {
            row.time_minutes = time_minutes;
        }
        if let Some(price) = patch.price {
            row.price = price;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        if let Some(link) = patch.link {
            row.link = link;
        }
        if let Some(tags) = tags {
            row.tags = tags;
        }
        if let Some(ingredients) = ingredients {
            row.ingredients = ingredients;
        }

        Ok(write_guard.recipe(recipe_id))
    }

    async fn set_recipe_image(
        &self,
        user: UserId,
        recipe_id: i32,
        image: String,
    ) -> Result<Recipe, RecipeRepoError> {
        let mut write_guard = self.write_lock()?;

        let row = owned_row_mut(&mut write_guard.recipes, user, recipe_id)
            .ok_or(RecipeNotFound(recipe_id))?;
        row.image = Some(image);

        Ok(write_guard.recipe(recipe_id))
    }

    async fn delete_recipe(&self, user: UserId, recipe_id: i32) -> Result<Recipe, RecipeRepoError> {
        let mut write_guard = self.write_lock()?;

        if owned_row(&write_guard.recipes, user, recipe_id).is_none() {
            return Err(RecipeNotFound(recipe_id));
        }
        let recipe = write_guard.recipe(recipe_id);
        write_guard.recipes.remove(&recipe_id);

        Ok(recipe)
    }
}
