// src/handlers/post_handlers.rs - /feed post routes
use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::AppState;
use crate::dtos::post_dtos::{
    CreatedPostOut, MessageOut, PageQuery, PostInput, PostOut, PostsPageOut,
};
use crate::error::FeedError;
use crate::handlers::upload::{UploadedForm, read_post_form};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::post_services::ImageChoice;

fn post_input(form: &UploadedForm) -> PostInput {
    PostInput {
        title: form.text("title"),
        content: form.text("content"),
    }
}

/// GET /feed/posts?page=N
#[get("/posts")]
pub async fn list_posts(
    app_state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, FeedError> {
    let page = app_state.posts.list(query.page_number()).await?;

    Ok(HttpResponse::Ok().json(PostsPageOut {
        message: "Fetched posts successfully".to_string(),
        posts: page.posts,
        total_items: page.total_items,
    }))
}

/// POST /feed/post (multipart: title, content, image)
#[post("/post")]
pub async fn create_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse, FeedError> {
    app_state
        .users
        .ensure_user(user.user_id, user.display_name.as_deref())
        .await?;
    let form = read_post_form(payload, app_state.images.as_ref(), app_state.max_image_bytes).await?;
    let input = post_input(&form);

    let (post, creator) = app_state
        .posts
        .create(user.user_id, input, form.image)
        .await?;

    Ok(HttpResponse::Created().json(CreatedPostOut {
        message: "Post created successfully!".to_string(),
        post,
        creator,
    }))
}

/// GET /feed/post/{post_id}
#[get("/post/{post_id}")]
pub async fn get_post(
    app_state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, FeedError> {
    let post = app_state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostOut {
        message: "Post fetched".to_string(),
        post,
    }))
}

/// PUT /feed/post/{post_id} (multipart: title, content, image file or image text)
#[put("/post/{post_id}")]
pub async fn update_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, FeedError> {
    let form = read_post_form(payload, app_state.images.as_ref(), app_state.max_image_bytes).await?;
    let input = post_input(&form);
    let image = ImageChoice {
        existing: form.image_reference(),
        uploaded: form.image,
    };

    let post = app_state
        .posts
        .update(path.into_inner(), user.user_id, input, image)
        .await?;

    Ok(HttpResponse::Ok().json(PostOut {
        message: "Post updated".to_string(),
        post,
    }))
}

/// DELETE /feed/post/{post_id}
#[delete("/post/{post_id}")]
pub async fn delete_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, FeedError> {
    app_state
        .posts
        .delete(path.into_inner(), user.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(MessageOut {
        message: "Deleted post".to_string(),
    }))
}
