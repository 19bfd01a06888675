mod handlers;

use crate::auth;
use crate::auth::password::encode_password;
use crate::config::SuperuserConfig;
use crate::validation::{
    char_field, email_field, normalize_email, password_field, Field, ValidationErrors,
};
use actix_web::{web, Scope};
use actix_web_httpauth::middleware::HttpAuthentication;
use anyhow::Context;
use recipe_repo::user_repo::{NewUser, User, UserRepo, UserRepoError, UserUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub use recipe_repo::user_repo::UserId;

pub const MIN_PASSWORD_LENGTH: usize = 5;

/// `/user/create/` is only routed when signups are enabled.
pub fn user_service(signups_enabled: bool) -> Scope {
    let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);

    let mut scope = web::scope("/user")
        .service(web::resource("/token/").route(web::post().to(handlers::create_token)))
        .service(
            web::resource("/me/")
                .route(web::get().to(handlers::get_me))
                .route(web::put().to(handlers::update_me))
                .route(web::patch().to(handlers::partial_update_me))
                .route(web::delete().to(handlers::delete_me))
                .wrap(bearer_auth_middleware),
        );
    if signups_enabled {
        scope = scope.service(web::resource("/create/").route(web::post().to(handlers::create_user)));
    }
    scope
}

/// What the API shows of a user. The password hash never leaves the server.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub struct UserPayload {
    pub email: Option<Field<String>>,
    pub password: Option<Field<String>>,
    pub name: Option<Field<String>>,
}

pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl UserPayload {
    pub fn new(email: &str, password: &str, name: &str) -> UserPayload {
        UserPayload {
            email: Some(email.to_owned().into()),
            password: Some(password.to_owned().into()),
            name: Some(name.to_owned().into()),
        }
    }

    fn into_signup(self) -> Result<Signup, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = email_field(&mut errors, "email", self.email, true);
        let password =
            password_field(&mut errors, "password", self.password, true, MIN_PASSWORD_LENGTH);
        let name = char_field(&mut errors, "name", self.name, true);
        match (email, password, name) {
            (Some(email), Some(password), Some(name)) if errors.is_empty() => Ok(Signup {
                email,
                password,
                name,
            }),
            _ => Err(errors),
        }
    }

    /// With `partial` unset every field must be present, as for a PUT.
    fn into_update(self, partial: bool) -> Result<ProfileUpdate, ValidationErrors> {
        let required = !partial;
        let mut errors = ValidationErrors::new();
        let email = email_field(&mut errors, "email", self.email, required);
        let password = password_field(
            &mut errors,
            "password",
            self.password,
            required,
            MIN_PASSWORD_LENGTH,
        );
        let name = char_field(&mut errors, "name", self.name, required);
        errors.into_result(ProfileUpdate {
            email,
            password,
            name,
        })
    }
}

pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl ProfileUpdate {
    /// Hashes the new password, if there is one.
    fn into_user_update(self) -> Result<UserUpdate, argon2::Error> {
        let password_hash = self
            .password
            .map(|password| encode_password(&password))
            .transpose()?;
        Ok(UserUpdate {
            email: self.email,
            name: self.name,
            password_hash,
        })
    }
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub struct TokenPayload {
    pub email: Option<Field<String>>,
    pub password: Option<Field<String>>,
}

pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TokenPayload {
    pub fn new(email: &str, password: &str) -> TokenPayload {
        TokenPayload {
            email: Some(email.to_owned().into()),
            password: Some(password.to_owned().into()),
        }
    }

    fn into_credentials(self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = char_field(&mut errors, "email", self.email, true);
        let password = password_field(&mut errors, "password", self.password, true, 1);
        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Credentials {
                email: normalize_email(&email),
                password,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// Creates the configured superuser unless an account with that email already exists.
pub async fn bootstrap_superuser(
    user_repo: &Arc<dyn UserRepo>,
    config: &SuperuserConfig,
) -> Result<(), anyhow::Error> {
    let email = normalize_email(&config.email);
    match user_repo.get_user_by_email(&email).await {
        Ok(_) => {
            info!(%email, "Superuser already exists");
            return Ok(());
        }
        Err(UserRepoError::UserNotFound(_)) => {}
        Err(e) => return Err(e).context("Unable to look up superuser"),
    }

    let password_hash = encode_password(&config.password).context("Unable to hash password")?;
    let new_user = NewUser::superuser(email, config.name.clone(), password_hash);
    match user_repo.create_user(new_user).await {
        Ok(user) => {
            info!(user_id = user.id, "Created superuser");
            Ok(())
        }
        Err(UserRepoError::UserAlreadyExists(_)) => Ok(()),
        Err(e) => Err(e).context("Unable to create superuser"),
    }
}
