// src/repositories/memory_store.rs - process-local document store
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::post::{Post, PostView};
use crate::models::user::{User, UserSummary};
use crate::repositories::{PostRepository, StoreError, UserRepository};

#[derive(Default)]
struct Collections {
    /// insertion sequence breaks ties between equal timestamps
    posts: HashMap<Uuid, (u64, Post)>,
    users: HashMap<Uuid, User>,
    next_seq: u64,
}

impl Collections {
    fn creator_of(&self, post: &Post) -> UserSummary {
        match self.users.get(&post.creator) {
            Some(user) => user.summary(),
            None => {
                log::warn!("post {} references missing user {}", post.id, post.creator);
                UserSummary {
                    id: post.creator,
                    name: String::new(),
                }
            }
        }
    }
}

/// Both collections behind one lock, cheap to clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().await.posts.len() as u64)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<PostView>, StoreError> {
        let guard = self.inner.read().await;
        let mut entries: Vec<&(u64, Post)> = guard.posts.values().collect();
        entries.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        Ok(entries
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|(_, post)| post.clone().populate(guard.creator_of(post)))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.inner.read().await.posts.get(&id).map(|(_, p)| p.clone()))
    }

    async fn find_populated(&self, id: Uuid) -> Result<Option<PostView>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .posts
            .get(&id)
            .map(|(_, post)| post.clone().populate(guard.creator_of(post))))
    }

    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let seq = match guard.posts.get(&post.id) {
            Some((seq, _)) => *seq,
            None => {
                guard.next_seq += 1;
                guard.next_seq
            }
        };
        guard.posts.insert(post.id, (seq, post.clone()));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.posts.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        self.inner.write().await.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post_at(creator: Uuid, minutes_ago: i64) -> Post {
        let mut post = Post::new(creator, format!("post {minutes_ago}"), "body".into(), "images/x.png".into());
        post.created_at = Utc::now() - Duration::minutes(minutes_ago);
        post
    }

    #[tokio::test]
    async fn page_is_newest_first_and_populated() {
        let store = MemoryStore::new();
        let user = User::new(Uuid::new_v4(), "Ana");
        UserRepository::save(&store, &user).await.unwrap();

        for minutes in [30, 10, 20] {
            PostRepository::save(&store, &post_at(user.id, minutes)).await.unwrap();
        }

        let page = store.find_page(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "post 10");
        assert_eq!(page[1].title, "post 20");
        assert_eq!(page[0].creator.name, "Ana");

        let rest = store.find_page(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].title, "post 30");
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn save_replaces_and_delete_reports_presence() {
        let store = MemoryStore::new();
        let mut post = post_at(Uuid::new_v4(), 0);
        PostRepository::save(&store, &post).await.unwrap();

        post.title = "renamed".into();
        PostRepository::save(&store, &post).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        let found = PostRepository::find_by_id(&store, post.id).await.unwrap().unwrap();
        assert_eq!(found.title, "renamed");

        assert!(store.delete(post.id).await.unwrap());
        assert!(!store.delete(post.id).await.unwrap());
    }
}
