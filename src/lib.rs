pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use crate::middleware::TokenVerifier;
use crate::repositories::{PostRepository, UserRepository};
use crate::services::{ImageStorage, Notifier, PostService, UserService};

/// Shared by every worker through `web::Data`.
pub struct AppState {
    pub posts: PostService,
    pub users: UserService,
    pub notifier: Arc<Notifier>,
    pub images: Arc<dyn ImageStorage>,
    pub tokens: TokenVerifier,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new<S>(
        store: Arc<S>,
        images: Arc<dyn ImageStorage>,
        notifier: Arc<Notifier>,
        tokens: TokenVerifier,
        posts_per_page: u64,
        max_image_bytes: usize,
    ) -> Self
    where
        S: PostRepository + UserRepository + 'static,
    {
        let post_repo: Arc<dyn PostRepository> = store.clone();
        let user_repo: Arc<dyn UserRepository> = store;

        Self {
            posts: PostService::new(
                post_repo,
                user_repo.clone(),
                images.clone(),
                notifier.clone(),
                posts_per_page,
            ),
            users: UserService::new(user_repo),
            notifier,
            images,
            tokens,
            max_image_bytes,
        }
    }
}
