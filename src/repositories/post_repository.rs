// src/repositories/post_repository.rs - post collection contract
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::post::{Post, PostView};
use crate::repositories::StoreError;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn count(&self) -> Result<u64, StoreError>;

    /// Newest first, creator populated.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<PostView>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Same as `find_by_id` with the creator resolved.
    async fn find_populated(&self, id: Uuid) -> Result<Option<PostView>, StoreError>;

    /// Insert or replace by id.
    async fn save(&self, post: &Post) -> Result<(), StoreError>;

    /// Returns whether a post was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
