use crate::mem_repo::{owned_row, owned_row_mut, owned_rows, sort_by_name_desc, MemRepo, TagRow};
use crate::tag_repo::TagRepoError::TagNotFound;
use crate::tag_repo::{NewTag, Tag, TagPatch, TagRepo, TagRepoError};
use crate::user_repo::UserId;
use async_trait::async_trait;

#[async_trait]
impl TagRepo for MemRepo {
    async fn get_tags(&self, user: UserId, assigned_only: bool) -> Result<Vec<Tag>, TagRepoError> {
        let read_guard = self.read_lock()?;

        let mut tags: Vec<Tag> = owned_rows(&read_guard.tags, user)
            .filter(|(id, _)| !assigned_only || read_guard.is_tag_assigned(*id))
            .map(|(id, row)| Tag::new(id, row.name.clone()))
            .collect();
        sort_by_name_desc(&mut tags, |t| (t.name.as_str(), t.id));

        Ok(tags)
    }

    async fn get_tag(&self, user: UserId, tag_id: i32) -> Result<Tag, TagRepoError> {
        let read_guard = self.read_lock()?;

        owned_row(&read_guard.tags, user, tag_id)
            .map(|row| Tag::new(tag_id, row.name.clone()))
            .ok_or(TagNotFound(tag_id))
    }

    async fn create_tag(&self, user: UserId, new_tag: NewTag) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_id();
        write_guard.tags.insert(
            id,
            TagRow {
                user_id: user,
                name: new_tag.name.clone(),
            },
        );

        Ok(new_tag.to_tag(id))
    }

    async fn update_tag(
        &self,
        user: UserId,
        tag_id: i32,
        patch: TagPatch,
    ) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let row = owned_row_mut(&mut write_guard.tags, user, tag_id).ok_or(TagNotFound(tag_id))?;
        let mut tag = Tag::new(tag_id, row.name.clone());
        patch.apply(&mut tag);
        row.name = tag.name.clone();

        Ok(tag)
    }

    async fn delete_tag(&self, user: UserId, tag_id: i32) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        if owned_row(&write_guard.tags, user, tag_id).is_none() {
            return Err(TagNotFound(tag_id));
        }
        let row = write_guard
            .tags
            .remove(&tag_id)
            .expect("owned tag should exist");
        for recipe in write_guard.recipes.values_mut() {
            recipe.tags.retain(|t| *t != tag_id);
        }

        Ok(Tag::new(tag_id, row.name))
    }
}
