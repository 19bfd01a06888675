use recipe_repo::Repos;
use serde::Deserialize;
use std::{env, fs};

pub mod generator;
pub mod test_user;

#[derive(Deserialize)]
struct TestConfig {
    database_url: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

fn database_url() -> Option<String> {
    if let Ok(config) = fs::read_to_string("config_test.toml") {
        let config: TestConfig = toml::from_str(config.as_str()).unwrap();
        return Some(config.database_url);
    }
    env::var("TEST_DATABASE_URL").ok()
}

/// Builds the repos under test. Returns `None` for the database backed repos when no database is
/// configured.
pub async fn build_repos(repo_type: RepoType) -> Option<Repos> {
    match repo_type {
        RepoType::SQLx => {
            let database_url = database_url()?;
            Some(
                recipe_repo::sqlx_repo::create_repos(&database_url, 1)
                    .await
                    .unwrap(),
            )
        }
        RepoType::Mem => Some(recipe_repo::mem_repo::create_repos()),
    }
}
