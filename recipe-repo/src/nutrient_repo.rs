use crate::user_repo::UserId;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Nutrient {
    pub id: i32,
    pub name: String,
    pub grams: Decimal,
}

impl Nutrient {
    pub fn new(id: i32, name: String, grams: Decimal) -> Nutrient {
        Nutrient { id, name, grams }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewNutrient {
    pub name: String,
    pub grams: Decimal,
}

impl NewNutrient {
    pub fn new(name: String, grams: Decimal) -> NewNutrient {
        NewNutrient { name, grams }
    }

    /// Nutrients are reused only when both name and amount match.
    pub fn natural_key(&self) -> (String, Decimal) {
        (self.name.clone(), self.grams.normalize())
    }

    pub fn to_nutrient(self, id: i32) -> Nutrient {
        Nutrient::new(id, self.name, self.grams)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NutrientPatch {
    pub name: Option<String>,
    pub grams: Option<Decimal>,
}

impl NutrientPatch {
    pub fn apply(self, nutrient: &mut Nutrient) {
        if let Some(name) = self.name {
            nutrient.name = name;
        }
        if let Some(grams) = self.grams {
            nutrient.grams = grams;
        }
    }
}

#[derive(Error, Debug)]
pub enum NutrientRepoError {
    #[error("Nutrient with id {0} not found")]
    NutrientNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait NutrientRepo: Sync + Send {
    async fn get_nutrients(&self, user: UserId) -> Result<Vec<Nutrient>, NutrientRepoError>;

    async fn get_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
    ) -> Result<Nutrient, NutrientRepoError>;

    async fn create_nutrient(
        &self,
        user: UserId,
        new_nutrient: NewNutrient,
    ) -> Result<Nutrient, NutrientRepoError>;

    async fn update_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
        patch: NutrientPatch,
    ) -> Result<Nutrient, NutrientRepoError>;

    async fn delete_nutrient(
        &self,
        user: UserId,
        nutrient_id: i32,
    ) -> Result<Nutrient, NutrientRepoError>;
}
