use crate::sqlx_repo::{select_owned, SQLxRepo};
use crate::tag_repo::TagRepoError::TagNotFound;
use crate::tag_repo::{NewTag, Tag, TagPatch, TagRepo, TagRepoError};
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TagEntry {
    id: i32,
    name: String,
}

impl From<TagEntry> for Tag {
    fn from(value: TagEntry) -> Self {
        Tag::new(value.id, value.name)
    }
}

#[async_trait]
impl TagRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_tags(&self, user: UserId, assigned_only: bool) -> Result<Vec<Tag>, TagRepoError> {
        let mut query_builder = select_owned("SELECT id, name FROM tags", user);
        if assigned_only {
            query_builder
                .push(" AND EXISTS (SELECT 1 FROM recipe_tags WHERE tag_id = tags.id)");
        }
        query_builder.push(r#" ORDER BY name COLLATE "C" DESC, id DESC"#);

        let tag_entries: Vec<TagEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get tags for user {}", user))?;
        Ok(tag_entries.into_iter().map(Tag::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_tag(&self, user: UserId, tag_id: i32) -> Result<Tag, TagRepoError> {
        let tag_entry: Option<TagEntry> =
            query_as("SELECT id, name FROM tags WHERE id = $1 AND user_id = $2")
                .bind(tag_id)
                .bind(user)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get tag {}", tag_id))?;
        tag_entry.map(Tag::from).ok_or(TagNotFound(tag_id))
    }

    #[instrument(skip(self))]
    async fn create_tag(&self, user: UserId, new_tag: NewTag) -> Result<Tag, TagRepoError> {
        let tag_entry: TagEntry =
            query_as("INSERT INTO tags(user_id, name) VALUES ($1, $2) RETURNING id, name")
                .bind(user)
                .bind(&new_tag.name)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Unable to create tag {}", new_tag.name))?;
        Ok(tag_entry.into())
    }

    #[instrument(skip(self))]
    async fn update_tag(
        &self,
        user: UserId,
        tag_id: i32,
        patch: TagPatch,
    ) -> Result<Tag, TagRepoError> {
        let tag_entry: Option<TagEntry> = query_as(
            "UPDATE tags SET name = COALESCE($1, name) WHERE id = $2 AND user_id = $3 \
             RETURNING id, name",
        )
        .bind(&patch.name)
        .bind(tag_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to update tag {}", tag_id))?;
        tag_entry.map(Tag::from).ok_or(TagNotFound(tag_id))
    }

    #[instrument(skip(self))]
    async fn delete_tag(&self, user: UserId, tag_id: i32) -> Result<Tag, TagRepoError> {
        let tag_entry: Option<TagEntry> =
            query_as("DELETE FROM tags WHERE id = $1 AND user_id = $2 RETURNING id, name")
                .bind(tag_id)
                .bind(user)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to delete tag {}", tag_id))?;
        tag_entry.map(Tag::from).ok_or(TagNotFound(tag_id))
    }
}
