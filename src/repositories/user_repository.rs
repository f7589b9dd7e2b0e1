use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::User;
use crate::repositories::StoreError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert or replace the whole document, post references included.
    async fn save(&self, user: &User) -> Result<(), StoreError>;
}
