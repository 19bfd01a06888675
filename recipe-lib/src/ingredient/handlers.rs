use super::IngredientPayload;
use crate::error::HandlerError;
use crate::media::{self, image_file_path, ImageCategory, ImageResponse, MediaStore};
use crate::tag::AssignedQuery;
use crate::user::UserId;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use recipe_repo::ingredient_repo::IngredientRepo;
use std::sync::Arc;
use tracing::info;

pub async fn get_all_ingredients(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<AssignedQuery>,
) -> Result<impl Responder, HandlerError> {
    let assigned_only = query.assigned_only()?;
    let ingredients = ingredient_repo
        .get_ingredients(user_id.into_inner(), assigned_only)
        .await?;
    Ok(HttpResponse::Ok().json(ingredients))
}

pub async fn get_ingredient(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    user_id: web::ReqData<UserId>,
    ingredient_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let ingredient = ingredient_repo
        .get_ingredient(user_id.into_inner(), ingredient_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

pub async fn create_ingredient(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    user_id: web::ReqData<UserId>,
    new_ingredient: web::Json<IngredientPayload>,
) -> Result<impl Responder, HandlerError> {
    let new_ingredient = new_ingredient.into_inner().into_new_ingredient()?;
    let ingredient = ingredient_repo
        .create_ingredient(user_id.into_inner(), new_ingredient)
        .await?;
    Ok(HttpResponse::Created().json(ingredient))
}

pub async fn update_ingredient(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    user_id: web::ReqData<UserId>,
    ingredient_id: web::Path<i32>,
    updated_ingredient: web::Json<IngredientPayload>,
) -> Result<impl Responder, HandlerError> {
    save_ingredient(
        ingredient_repo,
        user_id,
        ingredient_id,
        updated_ingredient,
        false,
    )
    .await
}

pub async fn partial_update_ingredient(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    user_id: web::ReqData<UserId>,
    ingredient_id: web::Path<i32>,
    updated_ingredient: web::Json<IngredientPayload>,
) -> Result<impl Responder, HandlerError> {
    save_ingredient(
        ingredient_repo,
        user_id,
        ingredient_id,
        updated_ingredient,
        true,
    )
    .await
}

async fn save_ingredient(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    user_id: web::ReqData<UserId>,
    ingredient_id: web::Path<i32>,
    updated_ingredient: web::Json<IngredientPayload>,
    partial: bool,
) -> Result<HttpResponse, HandlerError> {
    let patch = updated_ingredient.into_inner().into_patch(partial)?;
    let ingredient = ingredient_repo
        .update_ingredient(user_id.into_inner(), ingredient_id.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

pub async fn delete_ingredient(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    media_store: web::Data<MediaStore>,
    user_id: web::ReqData<UserId>,
    ingredient_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let ingredient = ingredient_repo
        .delete_ingredient(user_id.into_inner(), ingredient_id.into_inner())
        .await?;
    media_store.discard(ingredient.image).await;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn upload_ingredient_image(
    ingredient_repo: web::Data<Arc<dyn IngredientRepo>>,
    media_store: web::Data<MediaStore>,
    user_id: web::ReqData<UserId>,
    ingredient_id: web::Path<i32>,
    payload: Multipart,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let ingredient_id = ingredient_id.into_inner();
    let previous = ingredient_repo
        .get_ingredient(user_id, ingredient_id)
        .await?
        .image;

    let upload = media::read_image(payload).await?;
    let path = image_file_path(ImageCategory::Ingredient, &upload.filename);
    media_store.save(&path, upload.contents).await?;
    info!(ingredient_id, %path, "Uploaded ingredient image");

    let ingredient = ingredient_repo
        .set_ingredient_image(user_id, ingredient_id, path)
        .await?;
    media_store.discard(previous).await;
    Ok(HttpResponse::Ok().json(ImageResponse {
        id: ingredient.id,
        image: ingredient.image,
    }))
}
