// src/services/user_services.rs - the acting user's free-text status
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{FeedError, FeedResult, FieldError};
use crate::models::user::User;
use crate::repositories::UserRepository;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn require_user(&self, user_id: Uuid) -> FeedResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| FeedError::NotFound("User does not exist".to_string()))
    }

    /// Returns the user document for a verified caller, creating it on first sight.
    pub async fn ensure_user(&self, user_id: Uuid, display_name: Option<&str>) -> FeedResult<User> {
        if let Some(user) = self.users.find_by_id(user_id).await? {
            return Ok(user);
        }

        let user = User::new(user_id, display_name.unwrap_or_default());
        self.users.save(&user).await?;
        log::info!("provisioned user {} on first request", user_id);
        Ok(user)
    }

    pub async fn get_status(&self, actor_id: Uuid) -> FeedResult<String> {
        let user = self.require_user(actor_id).await?;
        if user.status.trim().is_empty() {
            return Err(FeedError::UnprocessableInput("Status cannot be found".to_string()));
        }
        Ok(user.status)
    }

    pub async fn update_status(&self, actor_id: Uuid, status: &str) -> FeedResult<()> {
        let status = status.trim();
        if status.is_empty() {
            return Err(FeedError::ValidationFailed(vec![FieldError {
                field: "status",
                message: "Status must not be empty".to_string(),
            }]));
        }

        let mut user = self.require_user(actor_id).await?;
        user.status = status.to_string();
        self.users.save(&user).await?;
        log::info!("status updated for user {}", actor_id);
        Ok(())
    }
}
