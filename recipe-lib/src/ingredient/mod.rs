use crate::nutrient::NutrientPayload;
use crate::validation::{char_field, nested_list, Field, ValidationErrors};
use actix_web::{web, Scope};
use recipe_repo::ingredient_repo::{IngredientPatch, NewIngredient};
use serde::{Deserialize, Serialize};

mod handlers;

pub fn ingredient_service() -> Scope {
    web::scope("/ingredients")
        .service(
            web::resource("/")
                .route(web::get().to(handlers::get_all_ingredients))
                .route(web::post().to(handlers::create_ingredient)),
        )
        .service(
            web::resource("/{ingredient_id}/")
                .route(web::get().to(handlers::get_ingredient))
                .route(web::put().to(handlers::update_ingredient))
                .route(web::patch().to(handlers::partial_update_ingredient))
                .route(web::delete().to(handlers::delete_ingredient)),
        )
        .service(
            web::resource("/{ingredient_id}/upload-image/")
                .route(web::post().to(handlers::upload_ingredient_image)),
        )
}

/// Nutrients are given by value and resolved with get-or-create on `(name, grams)`.
#[derive(Deserialize, Serialize, Default, Debug)]
pub struct IngredientPayload {
    pub name: Option<Field<String>>,
    pub nutrients: Option<Field<Vec<Field<NutrientPayload>>>>,
}

impl IngredientPayload {
    pub fn new(name: &str, nutrients: Vec<NutrientPayload>) -> IngredientPayload {
        IngredientPayload {
            name: Some(name.to_owned().into()),
            nutrients: Some(Field::Valid(
                nutrients.into_iter().map(Field::Valid).collect(),
            )),
        }
    }

    fn into_new_ingredient(self) -> Result<NewIngredient, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = char_field(&mut errors, "name", self.name, true);
        let nutrients = nested_list(
            &mut errors,
            "nutrients",
            self.nutrients,
            NutrientPayload::into_new_nutrient,
        );
        match name {
            Some(name) if errors.is_empty() => {
                Ok(NewIngredient::new(name, nutrients.unwrap_or_default()))
            }
            _ => Err(errors),
        }
    }

    fn into_patch(self, partial: bool) -> Result<IngredientPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = char_field(&mut errors, "name", self.name, !partial);
        let nutrients = nested_list(
            &mut errors,
            "nutrients",
            self.nutrients,
            NutrientPayload::into_new_nutrient,
        );
        errors.into_result(IngredientPatch { name, nutrients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::REQUIRED;
    use rust_decimal::Decimal;

    #[test]
    fn nutrient_errors_name_their_index() {
        let payload = IngredientPayload::new(
            "Salt",
            vec![
                NutrientPayload::new("Sodium", Decimal::new(39, 0)),
                NutrientPayload {
                    name: Some("Chloride".to_owned().into()),
                    grams: None,
                },
            ],
        );
        let errors = payload.into_new_ingredient().err().unwrap();
        assert_eq!(
            errors.get("nutrients.1.grams"),
            Some(&vec![REQUIRED.to_owned()])
        );
    }

    #[test]
    fn absent_nutrients_are_left_alone() {
        let payload = IngredientPayload {
            name: Some("Salt".to_owned().into()),
            nutrients: None,
        };
        let patch = payload.into_patch(true).unwrap();
        assert!(patch.nutrients.is_none());

        let payload = IngredientPayload::new("Salt", vec![]);
        let patch = payload.into_patch(true).unwrap();
        assert_eq!(patch.nutrients.map(|n| n.len()), Some(0));
    }
}
