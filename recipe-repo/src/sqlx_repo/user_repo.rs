use crate::sqlx_repo::SQLxRepo;
use crate::user_repo::UserRepoError::{UserAlreadyExists, UserNotFound};
use crate::user_repo::{NewUser, User, UserId, UserRepo, UserRepoError, UserUpdate};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as};
use tracing::instrument;

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, is_staff, is_superuser";

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i32,
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User {
            id: value.id,
            email: value.email,
            name: value.name,
            password_hash: value.password_hash,
            is_active: value.is_active,
            is_staff: value.is_staff,
            is_superuser: value.is_superuser,
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> =
            query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get user {}", user_id))?;
        user.map(User::from)
            .ok_or_else(|| UserNotFound(user_id.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> =
            query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get user {}", email))?;
        user.map(User::from)
            .ok_or_else(|| UserNotFound(email.to_owned()))
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as(&format!(
            "INSERT INTO users(email, name, password_hash, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT DO NOTHING RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.is_staff)
        .bind(new_user.is_superuser)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create user {}", new_user.email))?;
        user.map(User::from)
            .ok_or(UserAlreadyExists(new_user.email))
    }

    #[instrument(skip(self, update))]
    async fn update_user(
        &self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<User, UserRepoError> {
        let result: Result<Option<UserEntry>, sqlx::Error> = query_as(&format!(
            "UPDATE users SET email = COALESCE($1, email), name = COALESCE($2, name), \
             password_hash = COALESCE($3, password_hash) WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&update.email)
        .bind(&update.name)
        .bind(&update.password_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;

        let user = match result {
            Err(e) if is_unique_violation(&e) => {
                return Err(UserAlreadyExists(update.email.unwrap_or_default()))
            }
            r => r.with_context(|| format!("Unable to update user {}", user_id))?,
        };
        user.map(User::from)
            .ok_or_else(|| UserNotFound(user_id.to_string()))
    }

    /// Owned rows and their associations are removed by the cascading foreign keys.
    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete user {}", user_id))?;
        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(UserNotFound(user_id.to_string()))
        }
    }
}
