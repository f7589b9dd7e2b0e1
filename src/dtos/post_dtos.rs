use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FeedError, FieldError};
use crate::models::post::{Post, PostView};
use crate::models::user::UserSummary;

pub const MIN_TEXT_LEN: usize = 5;

/// Text part of a create/update submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl PostInput {
    /// Trims both fields and checks their minimum length.
    pub fn validate(self) -> Result<Self, FeedError> {
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();

        let mut errors = Vec::new();
        if title.chars().count() < MIN_TEXT_LEN {
            errors.push(FieldError {
                field: "title",
                message: format!("Title must be at least {} characters", MIN_TEXT_LEN),
            });
        }
        if content.chars().count() < MIN_TEXT_LEN {
            errors.push(FieldError {
                field: "content",
                message: format!("Content must be at least {} characters", MIN_TEXT_LEN),
            });
        }

        if errors.is_empty() {
            Ok(Self { title, content })
        } else {
            Err(FeedError::ValidationFailed(errors))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// 1-based; anything absent, unparsable or zero means the first page.
    pub fn page_number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPageOut {
    pub message: String,
    pub posts: Vec<PostView>,
    pub total_items: u64,
}

#[derive(Debug, Serialize)]
pub struct PostOut {
    pub message: String,
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct CreatedPostOut {
    pub message: String,
    pub post: Post,
    pub creator: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct MessageOut {
    pub message: String,
}

/// Payload of the `posts` socket event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PostEvent {
    Create { post: PostView },
    Update { post: PostView },
    Delete { id: Uuid },
}

impl PostEvent {
    pub const CHANNEL: &'static str = "posts";
}
