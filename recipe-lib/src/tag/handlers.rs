use super::{AssignedQuery, TagPayload};
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpResponse, Responder};
use recipe_repo::tag_repo::TagRepo;
use std::sync::Arc;

pub async fn get_all_tags(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<AssignedQuery>,
) -> Result<impl Responder, HandlerError> {
    let assigned_only = query.assigned_only()?;
    let tags = tag_repo
        .get_tags(user_id.into_inner(), assigned_only)
        .await?;
    Ok(HttpResponse::Ok().json(tags))
}

pub async fn get_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let tag = tag_repo
        .get_tag(user_id.into_inner(), tag_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}

pub async fn create_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    new_tag: web::Json<TagPayload>,
) -> Result<impl Responder, HandlerError> {
    let new_tag = new_tag.into_inner().into_new_tag()?;
    let tag = tag_repo.create_tag(user_id.into_inner(), new_tag).await?;
    Ok(HttpResponse::Created().json(tag))
}

pub async fn update_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
    updated_tag: web::Json<TagPayload>,
) -> Result<impl Responder, HandlerError> {
    save_tag(tag_repo, user_id, tag_id, updated_tag, false).await
}

pub async fn partial_update_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
    updated_tag: web::Json<TagPayload>,
) -> Result<impl Responder, HandlerError> {
    save_tag(tag_repo, user_id, tag_id, updated_tag, true).await
}

async fn save_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
    updated_tag: web::Json<TagPayload>,
    partial: bool,
) -> Result<HttpResponse, HandlerError> {
    let patch = updated_tag.into_inner().into_patch(partial)?;
    let tag = tag_repo
        .update_tag(user_id.into_inner(), tag_id.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}

pub async fn delete_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    tag_repo
        .delete_tag(user_id.into_inner(), tag_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
