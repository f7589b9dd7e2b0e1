use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserSummary;

/// Stored post document. `creator` is a reference to the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(creator: Uuid, title: String, content: String, image_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            image_url,
            creator,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, actor_id: Uuid) -> bool {
        self.creator == actor_id
    }

    /// Resolve the creator reference into the read model.
    pub fn populate(self, creator: UserSummary) -> PostView {
        PostView {
            id: self.id,
            title: self.title,
            content: self.content,
            image_url: self.image_url,
            creator,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Post as returned to clients and broadcast to sockets, creator resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_has_matching_timestamps_and_owner() {
        let owner = Uuid::new_v4();
        let post = Post::new(owner, "Title".into(), "Content".into(), "images/a.png".into());

        assert_eq!(post.created_at, post.updated_at);
        assert!(post.is_owned_by(owner));
        assert!(!post.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn view_serializes_camel_case_with_embedded_creator() {
        let owner = Uuid::new_v4();
        let view = Post::new(owner, "Title".into(), "Content".into(), "images/a.png".into())
            .populate(UserSummary { id: owner, name: "Ana".into() });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["imageUrl"], "images/a.png");
        assert_eq!(json["creator"]["name"], "Ana");
        assert!(json.get("createdAt").is_some());
    }
}
