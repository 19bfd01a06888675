use crate::query::parse_flag;
use crate::validation::{char_field, Field, ValidationErrors};
use actix_web::{web, Scope};
use recipe_repo::tag_repo::{NewTag, TagPatch};
use serde::{Deserialize, Serialize};

mod handlers;

pub fn tag_service() -> Scope {
    web::scope("/tags")
        .service(
            web::resource("/")
                .route(web::get().to(handlers::get_all_tags))
                .route(web::post().to(handlers::create_tag)),
        )
        .service(
            web::resource("/{tag_id}/")
                .route(web::get().to(handlers::get_tag))
                .route(web::put().to(handlers::update_tag))
                .route(web::patch().to(handlers::partial_update_tag))
                .route(web::delete().to(handlers::delete_tag)),
        )
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub struct TagPayload {
    pub name: Option<Field<String>>,
}

impl TagPayload {
    pub fn new(name: &str) -> TagPayload {
        TagPayload {
            name: Some(name.to_owned().into()),
        }
    }

    fn into_new_tag(self) -> Result<NewTag, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match char_field(&mut errors, "name", self.name, true) {
            Some(name) if errors.is_empty() => Ok(NewTag::new(name)),
            _ => Err(errors),
        }
    }

    fn into_patch(self, partial: bool) -> Result<TagPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = char_field(&mut errors, "name", self.name, !partial);
        errors.into_result(TagPatch { name })
    }
}

/// `?assigned_only=1` restricts the list to tags used by at least one recipe.
#[derive(Deserialize, Debug)]
pub struct AssignedQuery {
    pub assigned_only: Option<String>,
}

impl AssignedQuery {
    pub(crate) fn assigned_only(&self) -> Result<bool, ValidationErrors> {
        parse_flag("assigned_only", self.assigned_only.as_deref())
    }
}
