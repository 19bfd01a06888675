use crate::user_repo::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

impl Tag {
    pub fn new(id: i32, name: String) -> Tag {
        Tag { id, name }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTag {
    pub name: String,
}

impl NewTag {
    pub fn new(name: String) -> NewTag {
        NewTag { name }
    }

    pub fn to_tag(self, id: i32) -> Tag {
        Tag::new(id, self.name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TagPatch {
    pub name: Option<String>,
}

impl TagPatch {
    pub fn apply(self, tag: &mut Tag) {
        if let Some(name) = self.name {
            tag.name = name;
        }
    }
}

#[derive(Error, Debug)]
pub enum TagRepoError {
    #[error("Tag with id {0} not found")]
    TagNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait TagRepo: Sync + Send {
    /// Tags owned by `user`, ordered by name descending. With `assigned_only` only tags attached
    /// to at least one recipe are returned.
    async fn get_tags(&self, user: UserId, assigned_only: bool) -> Result<Vec<Tag>, TagRepoError>;

    async fn get_tag(&self, user: UserId, tag_id: i32) -> Result<Tag, TagRepoError>;

    async fn create_tag(&self, user: UserId, new_tag: NewTag) -> Result<Tag, TagRepoError>;

    async fn update_tag(
        &self,
        user: UserId,
        tag_id: i32,
        patch: TagPatch,
    ) -> Result<Tag, TagRepoError>;

    async fn delete_tag(&self, user: UserId, tag_id: i32) -> Result<Tag, TagRepoError>;
}
