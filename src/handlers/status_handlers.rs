use actix_web::{HttpResponse, get, patch, web};

use crate::AppState;
use crate::dtos::post_dtos::MessageOut;
use crate::dtos::status_dtos::{StatusOut, UpdateStatusIn};
use crate::error::FeedError;
use crate::middleware::auth_extractor::AuthenticatedUser;

/// GET /feed/status
#[get("/status")]
pub async fn get_status(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, FeedError> {
    let status = app_state.users.get_status(user.user_id).await?;
    Ok(HttpResponse::Ok().json(StatusOut { status }))
}

/// PATCH /feed/status
#[patch("/status")]
pub async fn update_status(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<UpdateStatusIn>,
) -> Result<HttpResponse, FeedError> {
    app_state
        .users
        .ensure_user(user.user_id, user.display_name.as_deref())
        .await?;
    app_state
        .users
        .update_status(user.user_id, &body.status)
        .await?;

    Ok(HttpResponse::Ok().json(MessageOut {
        message: "Status updated successfully".to_string(),
    }))
}
