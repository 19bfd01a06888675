use crate::nutrient_repo::NutrientRepoError::NutrientNotFound;
use crate::nutrient_repo::{NewNutrient, Nutrient, NutrientPatch, NutrientRepo, NutrientRepoError};
use crate::sqlx_repo::{select_owned, SQLxRepo};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct NutrientEntry {
    id: i32,
    name: String,
    grams: Decimal,
}

impl From<NutrientEntry> for Nutrient {
    fn from(value: NutrientEntry) -> Self {
        Nutrient::new(value.id, value.name, value.grams)
    }
}

#[async_trait]
impl NutrientRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_nutrients(&self, user: UserId) -> Result<Vec<Nutrient>, NutrientRepoError> {
        let mut query_builder = select_owned("SELECT id, name, grams FROM nutrients", user);
        query_builder.push(r#" ORDER BY name COLLATE "C" DESC, id DESC"#);

        let nutrient_entries: Vec<NutrientEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get nutrients for user {}", user))?;
        Ok(nutrient_entries.into_iter().map(Nutrient::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
    ) -> Result<Nutrient, NutrientRepoError> {
        let nutrient_entry: Option<NutrientEntry> =
            query_as("SELECT id, name, grams FROM nutrients WHERE id = $1 AND user_id = $2")
                .bind(nutrient_id)
                .bind(user)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get nutrient {}", nutrient_id))?;
        nutrient_entry
            .map(Nutrient::from)
            .ok_or(NutrientNotFound(nutrient_id))
    }

    #[instrument(skip(self))]
    async fn create_nutrient(
        &self,
        user: UserId,
        new_nutrient: NewNutrient,
    ) -> Result<Nutrient, NutrientRepoError> {
        let nutrient_entry: NutrientEntry = query_as(
            "INSERT INTO nutrients(user_id, name, grams) VALUES ($1, $2, $3) \
             RETURNING id, name, grams",
        )
        .bind(user)
        .bind(&new_nutrient.name)
        .bind(new_nutrient.grams)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Unable to create nutrient {}", new_nutrient.name))?;
        Ok(nutrient_entry.into())
    }

    #[instrument(skip(self))]
    async fn update_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
        patch: NutrientPatch,
    ) -> Result<Nutrient, NutrientRepoError> {
        let nutrient_entry: Option<NutrientEntry> = query_as(
            "UPDATE nutrients SET name = COALESCE($1, name), grams = COALESCE($2, grams) \
             WHERE id = $3 AND user_id = $4 RETURNING id, name, grams",
        )
        .bind(&patch.name)
        .bind(patch.grams)
        .bind(nutrient_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to update nutrient {}", nutrient_id))?;
        nutrient_entry
            .map(Nutrient::from)
            .ok_or(NutrientNotFound(nutrient_id))
    }

    #[instrument(skip(self))]
    async fn delete_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
    ) -> Result<Nutrient, NutrientRepoError> {
        let nutrient_entry: Option<NutrientEntry> = query_as(
            "DELETE FROM nutrients WHERE id = $1 AND user_id = $2 RETURNING id, name, grams",
        )
        .bind(nutrient_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete nutrient {}", nutrient_id))?;
        nutrient_entry
            .map(Nutrient::from)
            .ok_or(NutrientNotFound(nutrient_id))
    }
}
