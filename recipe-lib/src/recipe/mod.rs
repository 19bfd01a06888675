use crate::query::parse_id_list;
use crate::validation::{
    char_field, decimal_field, integer_field, nested_list, optional_char_field, text_field, Field,
    ValidationErrors,
};
use actix_web::{web, Scope};
use recipe_repo::recipe_repo::{NewRecipe, RecipeFilter, RecipePatch};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

mod handlers;

pub fn recipe_service() -> Scope {
    web::scope("/recipes")
        .service(
            web::resource("/")
                .route(web::get().to(handlers::get_all_recipes))
                .route(web::post().to(handlers::create_recipe)),
        )
        .service(
            web::resource("/{recipe_id}/")
                .route(web::get().to(handlers::get_recipe))
                .route(web::put().to(handlers::update_recipe))
                .route(web::patch().to(handlers::partial_update_recipe))
                .route(web::delete().to(handlers::delete_recipe)),
        )
        .service(
            web::resource("/{recipe_id}/upload-image/")
                .route(web::post().to(handlers::upload_recipe_image)),
        )
}

/// A tag or ingredient nested in a recipe, identified by name.
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct NamedPayload {
    pub name: Option<Field<String>>,
}

impl NamedPayload {
    pub fn new(name: &str) -> NamedPayload {
        NamedPayload {
            name: Some(name.to_owned().into()),
        }
    }

    fn into_name(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match char_field(&mut errors, "name", self.name, true) {
            Some(name) if errors.is_empty() => Ok(name),
            _ => Err(errors),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct RecipePayload {
    pub title: Option<Field<String>>,
    pub time_minutes: Option<Field<i32>>,
    pub price: Option<Field<Decimal>>,
    pub description: Option<Field<String>>,
    pub link: Option<Field<String>>,
    pub tags: Option<Field<Vec<Field<NamedPayload>>>>,
    pub ingredients: Option<Field<Vec<Field<NamedPayload>>>>,
}

impl RecipePayload {
    pub fn new(title: &str, time_minutes: i32, price: Decimal) -> RecipePayload {
        RecipePayload {
            title: Some(title.to_owned().into()),
            time_minutes: Some(time_minutes.into()),
            price: Some(price.into()),
            ..RecipePayload::default()
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> RecipePayload {
        self.tags = Some(named_list(tags));
        self
    }

    pub fn with_ingredients(mut self, ingredients: &[&str]) -> RecipePayload {
        self.ingredients = Some(named_list(ingredients));
        self
    }

    fn into_new_recipe(self) -> Result<NewRecipe, ValidationErrors> {
        let patch = self.into_patch(false)?;
        match (patch.title, patch.time_minutes, patch.price) {
            (Some(title), Some(time_minutes), Some(price)) => Ok(NewRecipe {
                title,
                time_minutes,
                price,
                description: patch.description.unwrap_or_default(),
                link: patch.link.unwrap_or_default(),
                tags: patch.tags.unwrap_or_default(),
                ingredients: patch.ingredients.unwrap_or_default(),
            }),
            _ => Err(ValidationErrors::new()),
        }
    }

    /// With `partial` unset `title`, `time_minutes` and `price` must be present.
    fn into_patch(self, partial: bool) -> Result<RecipePatch, ValidationErrors> {
        let required = !partial;
        let mut errors = ValidationErrors::new();
        let title = char_field(&mut errors, "title", self.title, required);
        let time_minutes = integer_field(&mut errors, "time_minutes", self.time_minutes, required);
        let price = decimal_field(&mut errors, "price", self.price, required);
        let description = text_field(&mut errors, "description", self.description);
        let link = optional_char_field(&mut errors, "link", self.link);
        let tags = nested_list(&mut errors, "tags", self.tags, NamedPayload::into_name);
        let ingredients = nested_list(
            &mut errors,
            "ingredients",
            self.ingredients,
            NamedPayload::into_name,
        );

        errors.into_result(RecipePatch {
            title,
            time_minutes,
            price,
            description,
            link,
            tags,
            ingredients,
        })
    }
}

fn named_list(names: &[&str]) -> Field<Vec<Field<NamedPayload>>> {
    Field::Valid(
        names
            .iter()
            .map(|name| Field::Valid(NamedPayload::new(name)))
            .collect(),
    )
}

/// `?tags=1,2&ingredients=3` on the recipe list.
#[derive(Deserialize, Debug)]
pub struct RecipeQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeQuery {
    fn into_filter(self) -> Result<RecipeFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let tags = parse_id_list("tags", self.tags.as_deref()).unwrap_or_else(|e| {
            errors.extend(e);
            None
        });
        let ingredients = parse_id_list("ingredients", self.ingredients.as_deref())
            .unwrap_or_else(|e| {
                errors.extend(e);
                None
            });
        errors.into_result(RecipeFilter { tags, ingredients })
    }
}
