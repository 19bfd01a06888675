use crate::ingredient_repo::IngredientRepoError::IngredientNotFound;
use crate::ingredient_repo::{
    Ingredient, IngredientPatch, IngredientRepo, IngredientRepoError, NewIngredient,
};
use crate::nutrient_repo::Nutrient;
use crate::sqlx_repo::{
    lock_reconcile, replace_associations, resolve_nutrients, select_owned, SQLxRepo,
};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::query_as;
use std::collections::HashMap;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct IngredientEntry {
    id: i32,
    name: String,
    image: Option<String>,
}

#[derive(sqlx::FromRow)]
struct IngredientNutrientEntry {
    ingredient_id: i32,
    id: i32,
    name: String,
    grams: Decimal,
}

impl SQLxRepo {
    /// Attaches nutrients to the entries, keeping association order.
    async fn load_ingredients(
        &self,
        entries: Vec<IngredientEntry>,
    ) -> Result<Vec<Ingredient>, anyhow::Error> {
        let ids: Vec<i32> = entries.iter().map(|e| e.id).collect();
        let nutrient_entries: Vec<IngredientNutrientEntry> = query_as(
            "SELECT inn.ingredient_id, n.id, n.name, n.grams FROM ingredient_nutrients inn \
             JOIN nutrients n ON n.id = inn.nutrient_id \
             WHERE inn.ingredient_id = ANY($1) ORDER BY inn.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .context("Unable to get ingredient nutrients")?;

        let mut nutrients: HashMap<i32, Vec<Nutrient>> = HashMap::new();
        for entry in nutrient_entries {
            nutrients
                .entry(entry.ingredient_id)
                .or_default()
                .push(Nutrient::new(entry.id, entry.name, entry.grams));
        }

        Ok(entries
            .into_iter()
            .map(|e| {
                let n = nutrients.remove(&e.id).unwrap_or_default();
                Ingredient::new(e.id, e.name, e.image, n)
            })
            .collect())
    }

    async fn load_ingredient(&self, entry: IngredientEntry) -> Result<Ingredient, anyhow::Error> {
        let mut ingredients = self.load_ingredients(vec![entry]).await?;
        ingredients
            .pop()
            .context("Loaded ingredient should not be missing")
    }
}

#[async_trait]
impl IngredientRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_ingredients(
        &self,
        user: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, IngredientRepoError> {
        let mut query_builder = select_owned("SELECT id, name, image FROM ingredients", user);
        if assigned_only {
            query_builder.push(
                " AND EXISTS (SELECT 1 FROM recipe_ingredients WHERE ingredient_id = ingredients.id)",
            );
        }
        query_builder.push(r#" ORDER BY name COLLATE "C" DESC, id DESC"#);

        let entries: Vec<IngredientEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get ingredients for user {}", user))?;
        Ok(self.load_ingredients(entries).await?)
    }

    #[instrument(skip(self))]
    async fn get_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
    ) -> Result<Ingredient, IngredientRepoError> {
        let entry: Option<IngredientEntry> =
            query_as("SELECT id, name, image FROM ingredients WHERE id = $1 AND user_id = $2")
                .bind(ingredient_id)
                .bind(user)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get ingredient {}", ingredient_id))?;
        let entry = entry.ok_or(IngredientNotFound(ingredient_id))?;
        Ok(self.load_ingredient(entry).await?)
    }

    #[instrument(skip(self))]
    async fn create_ingredient(
        &self,
        user: UserId,
        new_ingredient: NewIngredient,
    ) -> Result<Ingredient, IngredientRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;
        lock_reconcile(&mut tx, user).await?;

        let nutrient_ids = resolve_nutrients(&mut tx, user, new_ingredient.nutrients).await?;
        let entry: IngredientEntry = query_as(
            "INSERT INTO ingredients(user_id, name) VALUES ($1, $2) RETURNING id, name, image",
        )
        .bind(user)
        .bind(&new_ingredient.name)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Unable to create ingredient {}", new_ingredient.name))?;
        replace_associations(
            &mut tx,
            "ingredient_nutrients",
            "ingredient_id",
            "nutrient_id",
            entry.id,
            &nutrient_ids,
        )
        .await?;

        tx.commit().await.context("Unable to commit transaction")?;
        Ok(self.load_ingredient(entry).await?)
    }

    #[instrument(skip(self))]
    async fn update_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
        patch: IngredientPatch,
    ) -> Result<Ingredient, IngredientRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let entry: Option<IngredientEntry> = query_as(
            "UPDATE ingredients SET name = COALESCE($1, name) WHERE id = $2 AND user_id = $3 \
             RETURNING id, name, image",
        )
        .bind(&patch.name)
        .bind(ingredient_id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("Unable to update ingredient {}", ingredient_id))?;
        let entry = entry.ok_or(IngredientNotFound(ingredient_id))?;

        if let Some(nutrients) = patch.nutrients {
            lock_reconcile(&mut tx, user).await?;
            let nutrient_ids = resolve_nutrients(&mut tx, user, nutrients).await?;
            replace_associations(
                &mut tx,
                "ingredient_nutrients",
                "ingredient_id",
                "nutrient_id",
                ingredient_id,
                &nutrient_ids,
            )
            .await?;
        }

        tx.commit().await.context("Unable to commit transaction")?;
        Ok(self.load_ingredient(entry).await?)
    }

    #[instrument(skip(self))]
    async fn set_ingredient_image(
        &self,
        user: UserId,
        ingredient_id: i32,
        image: String,
    ) -> Result<Ingredient, IngredientRepoError> {
        let entry: Option<IngredientEntry> = query_as(
            "UPDATE ingredients SET image = $1 WHERE id = $2 AND user_id = $3 \
             RETURNING id, name, image",
        )
        .bind(&image)
        .bind(ingredient_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to set image of ingredient {}", ingredient_id))?;
        let entry = entry.ok_or(IngredientNotFound(ingredient_id))?;
        Ok(self.load_ingredient(entry).await?)
    }

    #[instrument(skip(self))]
    async fn delete_ingredient(
        &self,
        user: UserId,
        ingredient_id: i32,
    ) -> Result<Ingredient, IngredientRepoError> {
        let ingredient = self.get_ingredient(user, ingredient_id).await?;
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND user_id = $2")
            .bind(ingredient_id)
            .bind(user)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete ingredient {}", ingredient_id))?;
        if result.rows_affected() == 1 {
            Ok(ingredient)
        } else {
            Err(IngredientNotFound(ingredient_id))
        }
    }
}
