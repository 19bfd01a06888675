use crate::recipe_repo::RecipeRepoError::RecipeNotFound;
use crate::recipe_repo::{
    NewRecipe, Recipe, RecipeFilter, RecipeIngredient, RecipePatch, RecipeRepo, RecipeRepoError,
};
use crate::sqlx_repo::{
    lock_reconcile, replace_associations, resolve_ingredients, resolve_tags, select_owned,
    SQLxRepo,
};
use crate::tag_repo::Tag;
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{query, query_as, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

const RECIPE_COLUMNS: &str = "id, title, time_minutes, price, description, link, image";

#[derive(sqlx::FromRow)]
struct RecipeEntry {
    id: i32,
    title: String,
    time_minutes: i32,
    price: Decimal,
    description: String,
    link: String,
    image: Option<String>,
}

/// A tag or ingredient attached to a recipe.
#[derive(sqlx::FromRow)]
struct RecipeChildEntry {
    recipe_id: i32,
    id: i32,
    name: String,
}

fn group_by_recipe(entries: Vec<RecipeChildEntry>) -> HashMap<i32, Vec<(i32, String)>> {
    let mut grouped: HashMap<i32, Vec<(i32, String)>> = HashMap::new();
    for entry in entries {
        grouped
            .entry(entry.recipe_id)
            .or_default()
            .push((entry.id, entry.name));
    }
    grouped
}

async fn replace_recipe_children(
    conn: &mut PgConnection,
    user: UserId,
    recipe_id: i32,
    tags: Option<Vec<String>>,
    ingredients: Option<Vec<String>>,
) -> Result<(), anyhow::Error> {
    if tags.is_none() && ingredients.is_none() {
        return Ok(());
    }
    lock_reconcile(conn, user).await?;

    if let Some(tags) = tags {
        let tag_ids = resolve_tags(conn, user, tags).await?;
        replace_associations(conn, "recipe_tags", "recipe_id", "tag_id", recipe_id, &tag_ids)
            .await?;
    }
    if let Some(ingredients) = ingredients {
        let ingredient_ids = resolve_ingredients(conn, user, ingredients).await?;
        replace_associations(
            conn,
            "recipe_ingredients",
            "recipe_id",
            "ingredient_id",
            recipe_id,
            &ingredient_ids,
        )
        .await?;
    }
    Ok(())
}

impl SQLxRepo {
    async fn load_recipes(&self, entries: Vec<RecipeEntry>) -> Result<Vec<Recipe>, anyhow::Error> {
        let ids: Vec<i32> = entries.iter().map(|e| e.id).collect();

        let tag_entries: Vec<RecipeChildEntry> = query_as(
            "SELECT rt.recipe_id, t.id, t.name FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = ANY($1) ORDER BY rt.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .context("Unable to get recipe tags")?;
        let ingredient_entries: Vec<RecipeChildEntry> = query_as(
            "SELECT ri.recipe_id, i.id, i.name FROM recipe_ingredients ri \
             JOIN ingredients i ON i.id = ri.ingredient_id WHERE ri.recipe_id = ANY($1) \
             ORDER BY ri.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .context("Unable to get recipe ingredients")?;

        let mut tags = group_by_recipe(tag_entries);
        let mut ingredients = group_by_recipe(ingredient_entries);

        Ok(entries
            .into_iter()
            .map(|e| Recipe {
                id: e.id,
                title: e.title,
                description: e.description,
                price: e.price,
                time_minutes: e.time_minutes,
                link: e.link,
                tags: tags
                    .remove(&e.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(id, name)| Tag::new(id, name))
                    .collect(),
                ingredients: ingredients
                    .remove(&e.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(id, name)| RecipeIngredient { id, name })
                    .collect(),
                image: e.image,
            })
            .collect())
    }

    async fn load_recipe(&self, entry: RecipeEntry) -> Result<Recipe, anyhow::Error> {
        let mut recipes = self.load_recipes(vec![entry]).await?;
        recipes.pop().context("Loaded recipe should not be missing")
    }
}

#[async_trait]
impl RecipeRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_recipes(
        &self,
        user: UserId,
        filter: RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepoError> {
        let mut query_builder =
            select_owned(&format!("SELECT {} FROM recipes", RECIPE_COLUMNS), user);
        if let Some(tags) = filter.tags {
            query_builder
                .push(" AND EXISTS (SELECT 1 FROM recipe_tags WHERE recipe_id = recipes.id AND tag_id = ANY(")
                .push_bind(tags)
                .push("))");
        }
        if let Some(ingredients) = filter.ingredients {
            query_builder
                .push(" AND EXISTS (SELECT 1 FROM recipe_ingredients WHERE recipe_id = recipes.id AND ingredient_id = ANY(")
                .push_bind(ingredients)
                .push("))");
        }
        query_builder.push(" ORDER BY id DESC");

        let entries: Vec<RecipeEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get recipes for user {}", user))?;
        Ok(self.load_recipes(entries).await?)
    }

    #[instrument(skip(self))]
    async fn get_recipe(&self, user: UserId, recipe_id: i32) -> Result<Recipe, RecipeRepoError> {
        let entry: Option<RecipeEntry> = query_as(&format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get recipe {}", recipe_id))?;
        let entry = entry.ok_or(RecipeNotFound(recipe_id))?;
        Ok(self.load_recipe(entry).await?)
    }

    #[instrument(skip(self))]
    async fn create_recipe(
        &self,
        user: UserId,
        new_recipe: NewRecipe,
    ) -> Result<Recipe, RecipeRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let entry: RecipeEntry = query_as(&format!(
            "INSERT INTO recipes(user_id, title, time_minutes, price, description, link) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            RECIPE_COLUMNS
        ))
        .bind(user)
        .bind(&new_recipe.title)
        .bind(new_recipe.time_minutes)
        .bind(new_recipe.price)
        .bind(&new_recipe.description)
        .bind(&new_recipe.link)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Unable to create recipe {}", new_recipe.title))?;

        replace_recipe_children(
            &mut tx,
            user,
            entry.id,
            Some(new_recipe.tags),
            Some(new_recipe.ingredients),
        )
        .await?;

        tx.commit().await.context("Unable to commit transaction")?;
        Ok(self.load_recipe(entry).await?)
    }

    #[instrument(skip(self))]
    async fn update_recipe(
        &self,
        user: UserId,
        recipe_id: i32,
        patch: RecipePatch,
    ) -> Result<Recipe, RecipeRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let entry: Option<RecipeEntry> = query_as(&format!(
            "UPDATE recipes SET title = COALESCE($1, title), \
             time_minutes = COALESCE($2, time_minutes), price = COALESCE($3, price), \
             description = COALESCE($4, description), link = COALESCE($5, link) \
             WHERE id = $6 AND user_id = $7 RETURNING {}",
            RECIPE_COLUMNS
        ))
        .bind(&patch.title)
        .bind(patch.time_minutes)
        .bind(patch.price)
        .bind(&patch.description)
        .bind(&patch.link)
        .bind(recipe_id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("Unable to update recipe {}", recipe_id))?;
        let entry = entry.ok_or(RecipeNotFound(recipe_id))?;

        replace_recipe_children(&mut tx, user, recipe_id, patch.tags, patch.ingredients).await?;

        tx.commit().await.context("Unable to commit transaction")?;
        Ok(self.load_recipe(entry).await?)
    }

    #[instrument(skip(self))]
    async fn set_recipe_image(
        &self,
        user: UserId,
        recipe_id: i32,
        image: String,
    ) -> Result<Recipe, RecipeRepoError> {
        let entry: Option<RecipeEntry> = query_as(&format!(
            "UPDATE recipes SET image = $1 WHERE id = $2 AND user_id = $3 RETURNING {}",
            RECIPE_COLUMNS
        ))
        .bind(&image)
        .bind(recipe_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to set image of recipe {}", recipe_id))?;
        let entry = entry.ok_or(RecipeNotFound(recipe_id))?;
        Ok(self.load_recipe(entry).await?)
    }

    #[instrument(skip(self))]
    async fn delete_recipe(&self, user: UserId, recipe_id: i32) -> Result<Recipe, RecipeRepoError> {
        let recipe = self.get_recipe(user, recipe_id).await?;
        let result = query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete recipe {}", recipe_id))?;
        if result.rows_affected() == 1 {
            Ok(recipe)
        } else {
            Err(RecipeNotFound(recipe_id))
        }
    }
}
