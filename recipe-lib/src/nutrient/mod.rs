use crate::validation::{char_field, decimal_field, Field, ValidationErrors};
use actix_web::{web, Scope};
use recipe_repo::nutrient_repo::{NewNutrient, NutrientPatch};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

mod handlers;

/// Nutrients are listed and edited here. There is no detail view.
pub fn nutrient_service() -> Scope {
    web::scope("/nutrients")
        .service(
            web::resource("/")
                .route(web::get().to(handlers::get_all_nutrients))
                .route(web::post().to(handlers::create_nutrient)),
        )
        .service(
            web::resource("/{nutrient_id}/")
                .route(web::put().to(handlers::update_nutrient))
                .route(web::patch().to(handlers::partial_update_nutrient))
                .route(web::delete().to(handlers::delete_nutrient)),
        )
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub struct NutrientPayload {
    pub name: Option<Field<String>>,
    pub grams: Option<Field<Decimal>>,
}

impl NutrientPayload {
    pub fn new(name: &str, grams: Decimal) -> NutrientPayload {
        NutrientPayload {
            name: Some(name.to_owned().into()),
            grams: Some(grams.into()),
        }
    }

    pub(crate) fn into_new_nutrient(self) -> Result<NewNutrient, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = char_field(&mut errors, "name", self.name, true);
        let grams = decimal_field(&mut errors, "grams", self.grams, true);
        match (name, grams) {
            (Some(name), Some(grams)) if errors.is_empty() => Ok(NewNutrient::new(name, grams)),
            _ => Err(errors),
        }
    }

    fn into_patch(self, partial: bool) -> Result<NutrientPatch, ValidationErrors> {
        let required = !partial;
        let mut errors = ValidationErrors::new();
        let name = char_field(&mut errors, "name", self.name, required);
        let grams = decimal_field(&mut errors, "grams", self.grams, required);
        errors.into_result(NutrientPatch { name, grams })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{INVALID_NUMBER, REQUIRED};
    use std::str::FromStr;

    #[test]
    fn grams_are_required() {
        let payload = NutrientPayload {
            name: Some("Protein".to_owned().into()),
            grams: None,
        };
        let errors = payload.into_new_nutrient().err().unwrap();
        assert_eq!(errors.get("grams"), Some(&vec![REQUIRED.to_owned()]));
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn grams_must_be_a_number() {
        let payload: NutrientPayload =
            serde_json::from_value(serde_json::json!({ "name": "Fat", "grams": "lots" })).unwrap();
        let errors = payload.into_new_nutrient().err().unwrap();
        assert_eq!(errors.get("grams"), Some(&vec![INVALID_NUMBER.to_owned()]));
    }

    #[test]
    fn grams_are_rescaled() {
        let nutrient = NutrientPayload::new("Protein", Decimal::from_str("2.5").unwrap())
            .into_new_nutrient()
            .unwrap();
        assert_eq!(nutrient.grams.to_string(), "2.50");
    }
}
