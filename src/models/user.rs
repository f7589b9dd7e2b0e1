use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User document as the feed sees it.
/// Credentials live with the auth service that issues tokens, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    /// Post references in creation order.
    pub posts: Vec<Uuid>,
}

impl User {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: String::new(),
            posts: Vec::new(),
        }
    }

    pub fn push_post(&mut self, post_id: Uuid) {
        if !self.posts.contains(&post_id) {
            self.posts.push(post_id);
        }
    }

    /// Returns whether the reference was present.
    pub fn pull_post(&mut self, post_id: Uuid) -> bool {
        let before = self.posts.len();
        self.posts.retain(|id| *id != post_id);
        before != self.posts.len()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Creator as embedded in posts and socket events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

/// JWT claims issued by the auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub exp: usize,
    pub iat: Option<usize>,
    pub email: Option<String>,
    /// display name, used when the feed first sees this user
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_insertion_order_and_pull_removes_once() {
        let mut user = User::new(Uuid::new_v4(), "Ana");
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        user.push_post(a);
        user.push_post(b);
        user.push_post(c);
        user.push_post(a);
        assert_eq!(user.posts, vec![a, b, c]);

        assert!(user.pull_post(b));
        assert!(!user.pull_post(b));
        assert_eq!(user.posts, vec![a, c]);
    }
}
