pub mod post_handlers;
pub mod socket_handlers;
pub mod status_handlers;
pub mod upload;

use actix_web::web;

use crate::error::FeedError;

/// Registers every route; shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|_, _| {
        FeedError::NotFound("Could not find post".to_string()).into()
    }))
    .service(
        web::scope("/feed")
            .service(post_handlers::list_posts)   // GET /feed/posts
            .service(post_handlers::create_post)  // POST /feed/post
            .service(post_handlers::get_post)     // GET /feed/post/{post_id}
            .service(post_handlers::update_post)  // PUT /feed/post/{post_id}
            .service(post_handlers::delete_post)  // DELETE /feed/post/{post_id}
            .service(status_handlers::get_status) // GET /feed/status
            .service(status_handlers::update_status), // PATCH /feed/status
    )
    .service(socket_handlers::socket); // GET /socket
}
