use crate::validation::ValidationErrors;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use recipe_repo::ingredient_repo::IngredientRepoError;
use recipe_repo::nutrient_repo::NutrientRepoError;
use recipe_repo::recipe_repo::RecipeRepoError;
use recipe_repo::tag_repo::TagRepoError;
use recipe_repo::user_repo::UserRepoError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials";

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid input: {0:?}")]
    Validation(ValidationErrors),
    #[error("Not found")]
    NotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid upload: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationErrors> for HandlerError {
    fn from(e: ValidationErrors) -> Self {
        HandlerError::Validation(e)
    }
}

impl From<UserRepoError> for HandlerError {
    fn from(e: UserRepoError) -> Self {
        match e {
            UserRepoError::UserNotFound(_) => HandlerError::NotFound,
            UserRepoError::UserAlreadyExists(_) => HandlerError::Validation(
                ValidationErrors::single("email", "user with this email already exists."),
            ),
            UserRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<RecipeRepoError> for HandlerError {
    fn from(e: RecipeRepoError) -> Self {
        match e {
            RecipeRepoError::RecipeNotFound(_) => HandlerError::NotFound,
            RecipeRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<TagRepoError> for HandlerError {
    fn from(e: TagRepoError) -> Self {
        match e {
            TagRepoError::TagNotFound(_) => HandlerError::NotFound,
            TagRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<IngredientRepoError> for HandlerError {
    fn from(e: IngredientRepoError) -> Self {
        match e {
            IngredientRepoError::IngredientNotFound(_) => HandlerError::NotFound,
            IngredientRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<NutrientRepoError> for HandlerError {
    fn from(e: NutrientRepoError) -> Self {
        match e {
            NutrientRepoError::NutrientNotFound(_) => HandlerError::NotFound,
            NutrientRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<argon2::Error> for HandlerError {
    fn from(e: argon2::Error) -> Self {
        HandlerError::Internal(anyhow::Error::new(e).context("Unable to hash password"))
    }
}

impl From<jsonwebtoken::errors::Error> for HandlerError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        HandlerError::Internal(anyhow::Error::new(e).context("Unable to create token"))
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_)
            | HandlerError::InvalidCredentials
            | HandlerError::Multipart(_) => StatusCode::BAD_REQUEST,
            HandlerError::NotFound => StatusCode::NOT_FOUND,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            HandlerError::Validation(errors) => response.json(errors),
            HandlerError::NotFound => response.json(json!({ "detail": "Not found." })),
            HandlerError::InvalidCredentials => {
                response.json(json!({ "non_field_errors": [INVALID_CREDENTIALS] }))
            }
            HandlerError::Multipart(e) => response.json(json!({ "detail": e.to_string() })),
            HandlerError::Internal(e) => {
                error!(error = ?e, "Request failed");
                response.finish()
            }
        }
    }
}
