use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::TestRequest;
use actix_web::web::Data;
use actix_web::App;
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::instrument;

use crate::utils::mock::MockAuthentication;
use recipe_lib::media::MediaStore;
use recipe_lib::nutrient::NutrientPayload;
use recipe_repo::nutrient_repo::{NewNutrient, Nutrient};
use recipe_repo::Repos;
use utils::{media_store, repos, tracing_setup, TestUser};

#[macro_use]
mod utils;

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn create_and_list(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let other_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    repos
        .nutrient_repo
        .create_nutrient(
            other_user.user_id,
            NewNutrient::new("Sugar".to_owned(), Decimal::new(10, 0)),
        )
        .await
        .unwrap();
    let fat: Nutrient = create!(
        &service,
        "/nutrients/",
        NutrientPayload::new("Fat", Decimal::new(35, 1))
    );
    assert_eq!(fat.grams.to_string(), "3.50");
    let _: Nutrient = create!(
        &service,
        "/nutrients/",
        NutrientPayload::new("Protein", Decimal::new(12, 0))
    );

    let request = TestRequest::get().uri("/nutrients/").to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!([
            { "id": fat.id + 1, "name": "Protein", "grams": "12.00" },
            { "id": fat.id, "name": "Fat", "grams": "3.50" },
        ])
    );
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn update_and_delete(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let nutrient: Nutrient = create!(
        &service,
        "/nutrients/",
        NutrientPayload::new("Carbs", Decimal::new(20, 0))
    );
    let uri = format!("/nutrients/{}/", nutrient.id);

    let request = TestRequest::patch()
        .uri(&uri)
        .set_json(json!({ "grams": "22.5" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Nutrient = test::read_body_json(response).await;
    assert_eq!(updated.name, "Carbs");
    assert_eq!(updated.grams.to_string(), "22.50");

    let request = TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "name": "Carbohydrates", "grams": "1000" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = TestRequest::delete().uri(&uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = TestRequest::delete().uri(&uri).to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn no_detail_view(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let nutrient: Nutrient = create!(
        &service,
        "/nutrients/",
        NutrientPayload::new("Iron", Decimal::new(2, 0))
    );

    let request = TestRequest::get()
        .uri(&format!("/nutrients/{}/", nutrient.id))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
