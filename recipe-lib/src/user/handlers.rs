use super::{TokenPayload, TokenResponse, UserPayload, UserProfile};
use crate::auth::jwt::JWTAuth;
use crate::auth::password::{encode_password, verify_password};
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use anyhow::Context;
use recipe_repo::user_repo::{NewUser, UserRepo, UserRepoError};
use std::sync::Arc;
use tracing::info;

pub async fn create_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    new_user: web::Json<UserPayload>,
) -> Result<impl Responder, HandlerError> {
    let signup = new_user.into_inner().into_signup()?;
    let password_hash = encode_password(&signup.password)?;

    let user = user_repo
        .create_user(NewUser::new(signup.email, signup.name, password_hash))
        .await?;
    info!(user_id = user.id, "Created user");

    Ok(HttpResponse::Created().json(UserProfile::from(user)))
}

pub async fn create_token(
    req: HttpRequest,
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<TokenPayload>,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner().into_credentials()?;

    let user = match user_repo.get_user_by_email(&credentials.email).await {
        Ok(user) => user,
        Err(UserRepoError::UserNotFound(_)) => return Err(HandlerError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };
    if !user.is_active || !verify_password(&credentials.password, &user.password_hash)? {
        return Err(HandlerError::InvalidCredentials);
    }

    let jwt_auth = req
        .app_data::<JWTAuth>()
        .context("JWTAuth is not configured")?;
    let token = jwt_auth.create_token(user.id)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

pub async fn get_me(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user = user_repo.get_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

pub async fn update_me(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
    update: web::Json<UserPayload>,
) -> Result<impl Responder, HandlerError> {
    save_me(user_repo, user_id.into_inner(), update.into_inner(), false).await
}

pub async fn partial_update_me(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
    update: web::Json<UserPayload>,
) -> Result<impl Responder, HandlerError> {
    save_me(user_repo, user_id.into_inner(), update.into_inner(), true).await
}

async fn save_me(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: UserId,
    update: UserPayload,
    partial: bool,
) -> Result<HttpResponse, HandlerError> {
    let update = update.into_update(partial)?.into_user_update()?;
    let user = user_repo.update_user(user_id, update).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

pub async fn delete_me(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    user_repo.delete_user(user_id).await?;
    info!(user_id, "Deleted user");
    Ok(HttpResponse::NoContent().finish())
}
