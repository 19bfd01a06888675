mod ingredient_repo;
mod nutrient_repo;
mod recipe_repo;
mod tag_repo;
mod user_repo;

use crate::nutrient_repo::NewNutrient;
use crate::reconcile;
use crate::user_repo::UserId;
use crate::Repos;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{query, query_as, query_scalar, PgConnection, Pool, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::instrument;

/// Advisory lock class taken, per user, while nested children are resolved.
const RECONCILE_LOCK_CLASS: i32 = 0x7265_6369;

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

pub async fn create_repos(database_url: &str, max_pool_size: u32) -> Result<Repos, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(database_url)
        .await
        .context("Unable to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Unable to run database migrations")?;

    let repo = Arc::new(SQLxRepo::new(pool));
    Ok(Repos {
        user_repo: repo.clone(),
        recipe_repo: repo.clone(),
        tag_repo: repo.clone(),
        ingredient_repo: repo.clone(),
        nutrient_repo: repo,
    })
}

/// Starts `select_sql` restricted to rows owned by `user`. Further conditions are appended with
/// ` AND ...`.
fn select_owned<'a>(select_sql: &str, user: UserId) -> QueryBuilder<'a, Postgres> {
    let mut query_builder = QueryBuilder::new(select_sql);
    query_builder.push(" WHERE user_id = ").push_bind(user);
    query_builder
}

/// Serialises get-or-create for one user until the surrounding transaction ends.
#[instrument(skip(conn))]
async fn lock_reconcile(conn: &mut PgConnection, user: UserId) -> Result<(), anyhow::Error> {
    query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(RECONCILE_LOCK_CLASS)
        .bind(user)
        .execute(conn)
        .await
        .with_context(|| format!("Unable to lock reconciliation for user {}", user))?;
    Ok(())
}

#[instrument(skip(conn))]
async fn resolve_tags(
    conn: &mut PgConnection,
    user: UserId,
    names: Vec<String>,
) -> Result<Vec<i32>, anyhow::Error> {
    let existing: Vec<(String, i32)> =
        query_as("SELECT name, id FROM tags WHERE user_id = $1 AND name = ANY($2)")
            .bind(user)
            .bind(&names)
            .fetch_all(&mut *conn)
            .await
            .with_context(|| format!("Unable to look up tags for user {}", user))?;

    let resolution = reconcile::resolve(existing, names, |n| n.clone());
    let mut created = Vec::with_capacity(resolution.new_rows().len());
    for name in resolution.new_rows() {
        let id: i32 = query_scalar("INSERT INTO tags(user_id, name) VALUES ($1, $2) RETURNING id")
            .bind(user)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .with_context(|| format!("Unable to create tag {}", name))?;
        created.push(id);
    }
    Ok(resolution.into_ids(&created))
}

#[instrument(skip(conn))]
async fn resolve_ingredients(
    conn: &mut PgConnection,
    user: UserId,
    names: Vec<String>,
) -> Result<Vec<i32>, anyhow::Error> {
    let existing: Vec<(String, i32)> =
        query_as("SELECT name, id FROM ingredients WHERE user_id = $1 AND name = ANY($2)")
            .bind(user)
            .bind(&names)
            .fetch_all(&mut *conn)
            .await
            .with_context(|| format!("Unable to look up ingredients for user {}", user))?;

    let resolution = reconcile::resolve(existing, names, |n| n.clone());
    let mut created = Vec::with_capacity(resolution.new_rows().len());
    for name in resolution.new_rows() {
        let id: i32 =
            query_scalar("INSERT INTO ingredients(user_id, name) VALUES ($1, $2) RETURNING id")
                .bind(user)
                .bind(name)
                .fetch_one(&mut *conn)
                .await
                .with_context(|| format!("Unable to create ingredient {}", name))?;
        created.push(id);
    }
    Ok(resolution.into_ids(&created))
}

#[instrument(skip(conn))]
async fn resolve_nutrients(
    conn: &mut PgConnection,
    user: UserId,
    nutrients: Vec<NewNutrient>,
) -> Result<Vec<i32>, anyhow::Error> {
    let names: Vec<String> = nutrients.iter().map(|n| n.name.clone()).collect();
    let existing: Vec<(String, rust_decimal::Decimal, i32)> =
        query_as("SELECT name, grams, id FROM nutrients WHERE user_id = $1 AND name = ANY($2)")
            .bind(user)
            .bind(&names)
            .fetch_all(&mut *conn)
            .await
            .with_context(|| format!("Unable to look up nutrients for user {}", user))?;
    let existing = existing
        .into_iter()
        .map(|(name, grams, id)| ((name, grams.normalize()), id))
        .collect();

    let resolution = reconcile::resolve(existing, nutrients, |n| n.natural_key());
    let mut created = Vec::with_capacity(resolution.new_rows().len());
    for nutrient in resolution.new_rows() {
        let id: i32 = query_scalar(
            "INSERT INTO nutrients(user_id, name, grams) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user)
        .bind(&nutrient.name)
        .bind(nutrient.grams)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("Unable to create nutrient {}", nutrient.name))?;
        created.push(id);
    }
    Ok(resolution.into_ids(&created))
}

/// Replaces the children of `parent_id` in an association table, keeping `child_ids` order.
#[instrument(skip(conn))]
async fn replace_associations(
    conn: &mut PgConnection,
    table: &str,
    parent_column: &str,
    child_column: &str,
    parent_id: i32,
    child_ids: &[i32],
) -> Result<(), anyhow::Error> {
    query(&format!("DELETE FROM {} WHERE {} = $1", table, parent_column))
        .bind(parent_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Unable to clear {} of {}", table, parent_id))?;

    let insert = format!(
        "INSERT INTO {}({}, {}) VALUES ($1, $2)",
        table, parent_column, child_column
    );
    for child_id in child_ids {
        query(&insert)
            .bind(parent_id)
            .bind(child_id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Unable to add {} to {}", child_id, table))?;
    }
    Ok(())
}
