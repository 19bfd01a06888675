use super::{RecipePayload, RecipeQuery};
use crate::error::HandlerError;
use crate::media::{self, image_file_path, ImageCategory, ImageResponse, MediaStore};
use crate::user::UserId;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use recipe_repo::recipe_repo::RecipeRepo;
use std::sync::Arc;
use tracing::info;

pub async fn get_all_recipes(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<RecipeQuery>,
) -> Result<impl Responder, HandlerError> {
    let filter = query.into_inner().into_filter()?;
    let recipes = recipe_repo
        .get_recipes(user_id.into_inner(), filter)
        .await?;
    Ok(HttpResponse::Ok().json(recipes))
}

pub async fn get_recipe(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    user_id: web::ReqData<UserId>,
    recipe_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let recipe = recipe_repo
        .get_recipe(user_id.into_inner(), recipe_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

pub async fn create_recipe(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    user_id: web::ReqData<UserId>,
    new_recipe: web::Json<RecipePayload>,
) -> Result<impl Responder, HandlerError> {
    let new_recipe = new_recipe.into_inner().into_new_recipe()?;
    let recipe = recipe_repo
        .create_recipe(user_id.into_inner(), new_recipe)
        .await?;
    Ok(HttpResponse::Created().json(recipe))
}

pub async fn update_recipe(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    user_id: web::ReqData<UserId>,
    recipe_id: web::Path<i32>,
    updated_recipe: web::Json<RecipePayload>,
) -> Result<impl Responder, HandlerError> {
    save_recipe(recipe_repo, user_id, recipe_id, updated_recipe, false).await
}

pub async fn partial_update_recipe(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    user_id: web::ReqData<UserId>,
    recipe_id: web::Path<i32>,
    updated_recipe: web::Json<RecipePayload>,
) -> Result<impl Responder, HandlerError> {
    save_recipe(recipe_repo, user_id, recipe_id, updated_recipe, true).await
}

async fn save_recipe(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    user_id: web::ReqData<UserId>,
    recipe_id: web::Path<i32>,
    updated_recipe: web::Json<RecipePayload>,
    partial: bool,
) -> Result<HttpResponse, HandlerError> {
    let patch = updated_recipe.into_inner().into_patch(partial)?;
    let recipe = recipe_repo
        .update_recipe(user_id.into_inner(), recipe_id.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

pub async fn delete_recipe(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    media_store: web::Data<MediaStore>,
    user_id: web::ReqData<UserId>,
    recipe_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let recipe = recipe_repo
        .delete_recipe(user_id.into_inner(), recipe_id.into_inner())
        .await?;
    media_store.discard(recipe.image).await;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn upload_recipe_image(
    recipe_repo: web::Data<Arc<dyn RecipeRepo>>,
    media_store: web::Data<MediaStore>,
    user_id: web::ReqData<UserId>,
    recipe_id: web::Path<i32>,
    payload: Multipart,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let recipe_id = recipe_id.into_inner();
    let previous = recipe_repo.get_recipe(user_id, recipe_id).await?.image;

    let upload = media::read_image(payload).await?;
    let path = image_file_path(ImageCategory::Recipe, &upload.filename);
    media_store.save(&path, upload.contents).await?;
    info!(recipe_id, %path, "Uploaded recipe image");

    let recipe = recipe_repo
        .set_recipe_image(user_id, recipe_id, path)
        .await?;
    media_store.discard(previous).await;
    Ok(HttpResponse::Ok().json(ImageResponse {
        id: recipe.id,
        image: recipe.image,
    }))
}
