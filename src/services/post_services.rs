// src/services/post_services.rs - post lifecycle, ownership checks and change events
use std::sync::Arc;

use uuid::Uuid;

use crate::dtos::post_dtos::{PostEvent, PostInput};
use crate::error::{FeedError, FeedResult};
use crate::models::post::{Post, PostView};
use crate::models::user::UserSummary;
use crate::repositories::{PostRepository, UserRepository};
use crate::services::image_storage::{ImageStorage, clear_image};
use crate::services::notifier::Notifier;

pub const DEFAULT_PER_PAGE: u64 = 2;

/// Image sources for an update: a fresh upload wins over the existing reference.
#[derive(Debug, Clone, Default)]
pub struct ImageChoice {
    pub uploaded: Option<String>,
    pub existing: Option<String>,
}

impl ImageChoice {
    pub fn effective(&self) -> Option<String> {
        self.uploaded
            .clone()
            .or_else(|| self.existing.clone())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug)]
pub struct PostPage {
    pub total_items: u64,
    pub posts: Vec<PostView>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStorage>,
    notifier: Arc<Notifier>,
    per_page: u64,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStorage>,
        notifier: Arc<Notifier>,
        per_page: u64,
    ) -> Self {
        Self {
            posts,
            users,
            images,
            notifier,
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub async fn list(&self, page: u64) -> FeedResult<PostPage> {
        let page = page.max(1);
        let total_items = self.posts.count().await?;
        let skip = (page - 1).saturating_mul(self.per_page);
        let posts = self.posts.find_page(skip, self.per_page).await?;
        Ok(PostPage { total_items, posts })
    }

    pub async fn get(&self, post_id: Uuid) -> FeedResult<PostView> {
        self.posts
            .find_populated(post_id)
            .await?
            .ok_or_else(post_not_found)
    }

    /// `image` is the stored path of an accepted upload; `None` when no file
    /// passed the upload filter.
    pub async fn create(
        &self,
        creator_id: Uuid,
        input: PostInput,
        image: Option<String>,
    ) -> FeedResult<(Post, UserSummary)> {
        let input = match input.validate() {
            Ok(valid) => valid,
            Err(e) => return Err(self.reject(image.as_deref(), e).await),
        };
        let Some(image_url) = image else {
            return Err(FeedError::UnprocessableInput("No image provided".to_string()));
        };
        let mut user = match self.users.find_by_id(creator_id).await? {
            Some(user) => user,
            None => {
                let err = FeedError::NotFound("User does not exist".to_string());
                return Err(self.reject(Some(&image_url), err).await);
            }
        };

        let post = Post::new(creator_id, input.title, input.content, image_url);
        self.posts.save(&post).await?;

        // not atomic with the post write above
        user.push_post(post.id);
        self.users.save(&user).await?;

        let creator = user.summary();
        log::info!("post {} created by {}", post.id, creator_id);
        self.notifier.emit(
            PostEvent::CHANNEL,
            &PostEvent::Create {
                post: post.clone().populate(creator.clone()),
            },
        )?;

        Ok((post, creator))
    }

    pub async fn update(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        input: PostInput,
        image: ImageChoice,
    ) -> FeedResult<PostView> {
        let upload = image.uploaded.as_deref();
        let input = match input.validate() {
            Ok(valid) => valid,
            Err(e) => return Err(self.reject(upload, e).await),
        };
        let Some(image_url) = image.effective() else {
            return Err(FeedError::UnprocessableInput("No file picked".to_string()));
        };

        let mut post = match self.posts.find_by_id(post_id).await? {
            Some(post) => post,
            None => return Err(self.reject(upload, post_not_found()).await),
        };
        if !post.is_owned_by(actor_id) {
            log::warn!("user {} tried to update post {} owned by {}", actor_id, post_id, post.creator);
            return Err(self.reject(upload, FeedError::Forbidden).await);
        }

        // a kept image must be the post's own file
        if upload.is_none() && image_url != post.image_url {
            log::warn!("user {} referenced foreign image {} for post {}", actor_id, image_url, post_id);
            return Err(FeedError::UnprocessableInput(
                "Image does not belong to this post".to_string(),
            ));
        }

        let previous_image = std::mem::replace(&mut post.image_url, image_url);
        post.title = input.title;
        post.content = input.content;
        post.updated_at = chrono::Utc::now();
        if let Err(e) = self.posts.save(&post).await {
            return Err(self.reject(upload, e.into()).await);
        }
        if previous_image != post.image_url {
            clear_image(self.images.as_ref(), &previous_image).await;
        }

        let updated = self.get(post_id).await?;
        log::info!("post {} updated by {}", post_id, actor_id);
        self.notifier.emit(
            PostEvent::CHANNEL,
            &PostEvent::Update {
                post: updated.clone(),
            },
        )?;

        Ok(updated)
    }

    pub async fn delete(&self, post_id: Uuid, actor_id: Uuid) -> FeedResult<()> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(post_not_found)?;
        if !post.is_owned_by(actor_id) {
            log::warn!("user {} tried to delete post {} owned by {}", actor_id, post_id, post.creator);
            return Err(FeedError::Forbidden);
        }

        clear_image(self.images.as_ref(), &post.image_url).await;
        self.posts.delete(post_id).await?;

        // second write, see create
        match self.users.find_by_id(post.creator).await? {
            Some(mut user) => {
                if !user.pull_post(post_id) {
                    log::warn!("post {} was not linked to user {}", post_id, user.id);
                }
                self.users.save(&user).await?;
            }
            None => log::warn!("creator {} of deleted post {} no longer exists", post.creator, post_id),
        }

        log::info!("post {} deleted by {}", post_id, actor_id);
        self.notifier
            .emit(PostEvent::CHANNEL, &PostEvent::Delete { id: post_id })?;
        Ok(())
    }

    /// Drops the upload that came with a rejected request, then hands the error back.
    async fn reject(&self, upload: Option<&str>, err: FeedError) -> FeedError {
        if let Some(path) = upload {
            clear_image(self.images.as_ref(), path).await;
        }
        err
    }
}

fn post_not_found() -> FeedError {
    FeedError::NotFound("Could not find post".to_string())
}
