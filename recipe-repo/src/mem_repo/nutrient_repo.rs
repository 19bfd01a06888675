use crate::mem_repo::{
    owned_row, owned_row_mut, owned_rows, sort_by_name_desc, MemRepo, NutrientRow,
};
use crate::nutrient_repo::NutrientRepoError::NutrientNotFound;
use crate::nutrient_repo::{NewNutrient, Nutrient, NutrientPatch, NutrientRepo, NutrientRepoError};
use crate::user_repo::UserId;
use async_trait::async_trait;

#[async_trait]
impl NutrientRepo for MemRepo {
    async fn get_nutrients(&self, user: UserId) -> Result<Vec<Nutrient>, NutrientRepoError> {
        let read_guard = self.read_lock()?;

        let mut nutrients: Vec<Nutrient> = owned_rows(&read_guard.nutrients, user)
            .map(|(id, row)| Nutrient::new(id, row.name.clone(), row.grams))
            .collect();
        sort_by_name_desc(&mut nutrients, |n| (n.name.as_str(), n.id));

        Ok(nutrients)
    }

    async fn get_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
    ) -> Result<Nutrient, NutrientRepoError> {
        let read_guard = self.read_lock()?;

        owned_row(&read_guard.nutrients, user, nutrient_id)
            .map(|row| Nutrient::new(nutrient_id, row.name.clone(), row.grams))
            .ok_or(NutrientNotFound(nutrient_id))
    }

    async fn create_nutrient(
        &self,
        user: UserId,
        new_nutrient: NewNutrient,
    ) -> Result<Nutrient, NutrientRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_id();
        write_guard.nutrients.insert(
            id,
            NutrientRow {
                user_id: user,
                name: new_nutrient.name.clone(),
                grams: new_nutrient.grams,
            },
        );

        Ok(new_nutrient.to_nutrient(id))
    }

    async fn update_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
        patch: NutrientPatch,
    ) -> Result<Nutrient, NutrientRepoError> {
        let mut write_guard = self.write_lock()?;

        let row = owned_row_mut(&mut write_guard.nutrients, user, nutrient_id)
            .ok_or(NutrientNotFound(nutrient_id))?;
        let mut nutrient = Nutrient::new(nutrient_id, row.name.clone(), row.grams);
        patch.apply(&mut nutrient);
        row.name = nutrient.name.clone();
        row.grams = nutrient.grams;

        Ok(nutrient)
    }

    async fn delete_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
    ) -> Result<Nutrient, NutrientRepoError> {
        let mut write_guard = self.write_lock()?;

        if owned_row(&write_guard.nutrients, user, nutrient_id).is_none() {
            return Err(NutrientNotFound(nutrient_id));
        }
        let row = write_guard
            .nutrients
            .remove(&nutrient_id)
            .expect("owned nutrient should exist");
        for ingredient in write_guard.ingredients.values_mut() {
            ingredient.nutrients.retain(|n| *n != nutrient_id);
        }

        Ok(Nutrient::new(nutrient_id, row.name, row.grams))
    }
}
