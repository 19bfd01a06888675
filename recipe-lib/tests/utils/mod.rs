#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use fake::faker::name::en::Name;
use fake::Fake;
use recipe_lib::auth::jwt::JWTAuth;
use recipe_lib::auth::password::encode_password;
use recipe_lib::media::MediaStore;
use recipe_lib::user::UserId;
use recipe_lib::AppState;
use recipe_repo::user_repo::{NewUser, UserRepo};
use recipe_repo::Repos;
use rstest::*;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

pub mod mock;

pub const TEST_PASSWORD: &str = "testpass123";

/// App with every resource service behind [mock::MockAuthentication] for `$user_id`.
macro_rules! build_app {
    ($repos:expr, $media_store:expr, $user_id:expr) => {{
        let repos = $repos.clone();
        let app = App::new()
            .app_data(Data::new(repos.user_repo))
            .app_data(Data::new(repos.recipe_repo))
            .app_data(Data::new(repos.tag_repo))
            .app_data(Data::new(repos.ingredient_repo))
            .app_data(Data::new(repos.nutrient_repo))
            .app_data(Data::new($media_store.clone()))
            .app_data(recipe_lib::json_config())
            .wrap(recipe_lib::tracing::create_middleware())
            .service(
                recipe_lib::recipe::recipe_service()
                    .wrap(MockAuthentication::as_user($user_id)),
            )
            .service(
                recipe_lib::tag::tag_service().wrap(MockAuthentication::as_user($user_id)),
            )
            .service(
                recipe_lib::ingredient::ingredient_service()
                    .wrap(MockAuthentication::as_user($user_id)),
            )
            .service(
                recipe_lib::nutrient::nutrient_service()
                    .wrap(MockAuthentication::as_user($user_id)),
            );
        tracing::info!("Built app");
        app
    }};
}

/// Posts `$payload` to `$uri` and returns the created object.
macro_rules! create {
    (&$service:ident, $uri:expr, $payload:expr) => {{
        let request = TestRequest::post()
            .uri($uri)
            .set_json(&$payload)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert_eq!(
            response.status(),
            StatusCode::CREATED,
            "Got {} response when creating {}",
            response.status(),
            $uri
        );
        test::read_body_json(response).await
    }};
}

pub struct TestUser {
    pub user_id: UserId,
    pub email: String,
    repo: Arc<dyn UserRepo>,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let email = format!("test-user-{}@example.com", Uuid::new_v4());
        let new_user = NewUser::new(
            email.clone(),
            Name().fake(),
            encode_password(TEST_PASSWORD).unwrap(),
        );
        let user = user_repo.create_user(new_user).await.unwrap();
        info!(user_id = user.id, %email, "Created user");
        TestUser {
            user_id: user.id,
            email,
            repo: user_repo.clone(),
        }
    }

    pub async fn delete(&self) {
        self.repo.delete_user(self.user_id).await.unwrap()
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    recipe_repo::mem_repo::create_repos()
}

/// A media store in a fresh temporary directory.
#[fixture]
pub fn media_store() -> MediaStore {
    let root: PathBuf = std::env::temp_dir().join(format!("recipe-media-{}", Uuid::new_v4()));
    MediaStore::new(root)
}

/// State for the full app, with real token authentication.
pub fn app_state(repos: Repos, media_store: MediaStore, signups_enabled: bool) -> AppState {
    let secret: [u8; 32] = rand::random();
    AppState {
        jwt_auth: JWTAuth::from_secret(secret.to_vec()),
        repos,
        media_store,
        signups_enabled,
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}

const BOUNDARY: &str = "recipe-test-boundary";

/// A `multipart/form-data` body with a single file field. Returns the content type and the body.
pub fn multipart_file(field: &str, filename: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// A `multipart/form-data` body with a single text field.
pub fn multipart_text(field: &str, value: &str) -> (String, Vec<u8>) {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"\r\n\r\n\
         {value}\r\n\
         --{BOUNDARY}--\r\n"
    )
    .into_bytes();
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
