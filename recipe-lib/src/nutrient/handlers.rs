use super::NutrientPayload;
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpResponse, Responder};
use recipe_repo::nutrient_repo::NutrientRepo;
use std::sync::Arc;

pub async fn get_all_nutrients(
    nutrient_repo: web::Data<Arc<dyn NutrientRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let nutrients = nutrient_repo.get_nutrients(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(nutrients))
}

pub async fn create_nutrient(
    nutrient_repo: web::Data<Arc<dyn NutrientRepo>>,
    user_id: web::ReqData<UserId>,
    new_nutrient: web::Json<NutrientPayload>,
) -> Result<impl Responder, HandlerError> {
    let new_nutrient = new_nutrient.into_inner().into_new_nutrient()?;
    let nutrient = nutrient_repo
        .create_nutrient(user_id.into_inner(), new_nutrient)
        .await?;
    Ok(HttpResponse::Created().json(nutrient))
}

pub async fn update_nutrient(
    nutrient_repo: web::Data<Arc<dyn NutrientRepo>>,
    user_id: web::ReqData<UserId>,
    nutrient_id: web::Path<i32>,
    updated_nutrient: web::Json<NutrientPayload>,
) -> Result<impl Responder, HandlerError> {
    save_nutrient(nutrient_repo, user_id, nutrient_id, updated_nutrient, false).await
}

pub async fn partial_update_nutrient(
    nutrient_repo: web::Data<Arc<dyn NutrientRepo>>,
    user_id: web::ReqData<UserId>,
    nutrient_id: web::Path<i32>,
    updated_nutrient: web::Json<NutrientPayload>,
) -> Result<impl Responder, HandlerError> {
    save_nutrient(nutrient_repo, user_id, nutrient_id, updated_nutrient, true).await
}

async fn save_nutrient(
    nutrient_repo: web::Data<Arc<dyn NutrientRepo>>,
    user_id: web::ReqData<UserId>,
    nutrient_id: web::Path<i32>,
    updated_nutrient: web::Json<NutrientPayload>,
    partial: bool,
) -> Result<HttpResponse, HandlerError> {
    let patch = updated_nutrient.into_inner().into_patch(partial)?;
    let nutrient = nutrient_repo
        .update_nutrient(user_id.into_inner(), nutrient_id.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(nutrient))
}

pub async fn delete_nutrient(
    nutrient_repo: web::Data<Arc<dyn NutrientRepo>>,
    user_id: web::ReqData<UserId>,
    nutrient_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    nutrient_repo
        .delete_nutrient(user_id.into_inner(), nutrient_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
