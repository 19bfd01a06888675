use crate::auth::jwt::JWTAuth;
use crate::media::MediaStore;
use actix_web::error::JsonPayloadError;
use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use actix_web_httpauth::middleware::HttpAuthentication;
use recipe_repo::Repos;
use ::tracing::error;

pub mod auth;
pub mod config;
mod error;
pub mod ingredient;
pub mod media;
pub mod nutrient;
mod query;
pub mod recipe;
pub mod tag;
pub mod tracing;
pub mod user;
pub mod validation;

/// Everything the handlers need, built once at startup and cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub jwt_auth: JWTAuth,
    pub repos: Repos,
    pub media_store: MediaStore,
    pub signups_enabled: bool,
}

/// Registers shared data and every service on an app.
pub fn app_config_func(cfg: &mut web::ServiceConfig, state: &AppState) {
    let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);

    cfg.app_data(state.jwt_auth.clone())
        .app_data(Data::new(state.repos.user_repo.clone()))
        .app_data(Data::new(state.repos.recipe_repo.clone()))
        .app_data(Data::new(state.repos.tag_repo.clone()))
        .app_data(Data::new(state.repos.ingredient_repo.clone()))
        .app_data(Data::new(state.repos.nutrient_repo.clone()))
        .app_data(Data::new(state.media_store.clone()))
        .app_data(json_config())
        .service(user::user_service(state.signups_enabled))
        .service(recipe::recipe_service().wrap(bearer_auth_middleware.clone()))
        .service(tag::tag_service().wrap(bearer_auth_middleware.clone()))
        .service(ingredient::ingredient_service().wrap(bearer_auth_middleware.clone()))
        .service(nutrient::nutrient_service().wrap(bearer_auth_middleware));
}

/// Malformed JSON bodies are answered with a 400 describing the parse error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        error!(req_path = req.path(), %err);
        match err {
            JsonPayloadError::Deserialize(deserialize_err) => {
                let error_body = serde_json::json!({
                    "error": "Unable to parse JSON payload",
                    "detail": format!("{}", deserialize_err),
                });
                actix_web::error::InternalError::from_response(
                    deserialize_err,
                    HttpResponse::BadRequest()
                        .content_type("application/json")
                        .body(error_body.to_string()),
                )
                .into()
            }
            _ => err.into(),
        }
    })
}
