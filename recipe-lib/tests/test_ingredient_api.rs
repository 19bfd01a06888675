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
use recipe_lib::ingredient::IngredientPayload;
use recipe_lib::media::MediaStore;
use recipe_lib::nutrient::NutrientPayload;
use recipe_lib::recipe::RecipePayload;
use recipe_repo::ingredient_repo::{Ingredient, NewIngredient};
use recipe_repo::recipe_repo::Recipe;
use recipe_repo::Repos;
use utils::{media_store, repos, tracing_setup, TestUser};

#[macro_use]
mod utils;

fn names(ingredients: &[Ingredient]) -> Vec<&str> {
    ingredients.iter().map(|i| i.name.as_str()).collect()
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn create_with_nutrients(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let payload = IngredientPayload::new(
        "Peanut butter",
        vec![
            NutrientPayload::new("Protein", Decimal::new(25, 0)),
            NutrientPayload::new("Fat", Decimal::new(50, 0)),
            NutrientPayload::new("Protein", Decimal::new(25, 0)),
        ],
    );
    let ingredient: Ingredient = create!(&service, "/ingredients/", payload);
    let nutrient_names: Vec<&str> = ingredient
        .nutrients
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(nutrient_names, vec!["Protein", "Fat"]);

    // same name with another amount is a different nutrient
    let payload = IngredientPayload::new(
        "Almond butter",
        vec![
            NutrientPayload::new("Protein", Decimal::new(25, 0)),
            NutrientPayload::new("Protein", Decimal::new(21, 0)),
        ],
    );
    let other: Ingredient = create!(&service, "/ingredients/", payload);
    assert_eq!(other.nutrients[0].id, ingredient.nutrients[0].id);
    assert_ne!(other.nutrients[1].id, ingredient.nutrients[0].id);

    let request = TestRequest::get()
        .uri(&format!("/ingredients/{}/", ingredient.id))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["image"], json!(null));
    assert_eq!(body["nutrients"][0]["grams"], json!("25.00"));

    let nutrients = repos
        .nutrient_repo
        .get_nutrients(test_user.user_id)
        .await
        .unwrap();
    assert_eq!(nutrients.len(), 3);
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn invalid_nutrient(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let request = TestRequest::post()
        .uri("/ingredients/")
        .set_json(json!({
            "name": "Salt",
            "nutrients": [{ "name": "Sodium", "grams": "39" }, { "name": "Chloride" }],
        }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({ "nutrients.1.grams": ["This field is required."] })
    );

    let ingredients = repos
        .ingredient_repo
        .get_ingredients(test_user.user_id, false)
        .await
        .unwrap();
    assert!(ingredients.is_empty());
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn wrongly_typed_nutrients(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let request = TestRequest::post()
        .uri("/ingredients/")
        .set_json(json!({
            "name": "Butter",
            "nutrients": [{ "name": "Fat", "grams": "lots" }, "Protein"],
        }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({
            "nutrients.0.grams": ["A valid number is required."],
            "nutrients.1": ["Invalid data. Expected a dictionary."],
        })
    );

    let nutrients = repos
        .nutrient_repo
        .get_nutrients(test_user.user_id)
        .await
        .unwrap();
    assert!(nutrients.is_empty());
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn list_is_limited_to_user(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let other_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let other = repos
        .ingredient_repo
        .create_ingredient(
            other_user.user_id,
            NewIngredient::new("Salt".to_owned(), vec![]),
        )
        .await
        .unwrap();
    let _: Ingredient = create!(
        &service,
        "/ingredients/",
        IngredientPayload::new("Kale", vec![])
    );
    let _: Ingredient = create!(
        &service,
        "/ingredients/",
        IngredientPayload::new("Vanilla", vec![])
    );

    let request = TestRequest::get().uri("/ingredients/").to_request();
    let response = test::call_service(&service, request).await;
    let ingredients: Vec<Ingredient> = test::read_body_json(response).await;
    assert_eq!(names(&ingredients), vec!["Vanilla", "Kale"]);

    let request = TestRequest::get()
        .uri(&format!("/ingredients/{}/", other.id))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn update_nutrients(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let payload = IngredientPayload::new(
        "Cereal",
        vec![NutrientPayload::new("Fibre", Decimal::new(8, 0))],
    );
    let ingredient: Ingredient = create!(&service, "/ingredients/", payload);
    let uri = format!("/ingredients/{}/", ingredient.id);

    let request = TestRequest::patch()
        .uri(&uri)
        .set_json(json!({ "name": "Granola" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Ingredient = test::read_body_json(response).await;
    assert_eq!(updated.name, "Granola");
    assert_eq!(updated.nutrients, ingredient.nutrients);

    let request = TestRequest::patch()
        .uri(&uri)
        .set_json(json!({ "nutrients": [] }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Ingredient = test::read_body_json(response).await;
    assert!(updated.nutrients.is_empty());

    // the nutrient row outlives the association
    let nutrients = repos
        .nutrient_repo
        .get_nutrients(test_user.user_id)
        .await
        .unwrap();
    assert_eq!(nutrients.len(), 1);
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn assigned_only(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let _: Ingredient = create!(
        &service,
        "/ingredients/",
        IngredientPayload::new("Turkey", vec![])
    );
    for title in ["Eggs benedict", "Herb eggs"] {
        let _: Recipe = create!(
            &service,
            "/recipes/",
            RecipePayload::new(title, 5, Decimal::new(400, 2)).with_ingredients(&["Eggs"])
        );
    }

    let request = TestRequest::get()
        .uri("/ingredients/?assigned_only=1")
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ingredients: Vec<Ingredient> = test::read_body_json(response).await;
    assert_eq!(names(&ingredients), vec!["Eggs"]);
}

#[instrument(skip(repos, media_store))]
#[rstest]
#[actix_rt::test]
async fn delete_ingredient(_tracing_setup: &(), repos: Repos, media_store: MediaStore) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let app = build_app!(repos, media_store, test_user.user_id);
    let service = test::init_service(app).await;

    let recipe: Recipe = create!(
        &service,
        "/recipes/",
        RecipePayload::new("Salad", 5, Decimal::new(400, 2)).with_ingredients(&["Lettuce"])
    );

    let request = TestRequest::delete()
        .uri(&format!("/ingredients/{}/", recipe.ingredients[0].id))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let recipe = repos
        .recipe_repo
        .get_recipe(test_user.user_id, recipe.id)
        .await
        .unwrap();
    assert!(recipe.ingredients.is_empty());
}
