pub mod image_storage;
pub mod notifier;
pub mod post_services;
pub mod user_services;

pub use image_storage::{DiskImageStorage, ImageStorage};
pub use notifier::Notifier;
pub use post_services::{ImageChoice, PostService};
pub use user_services::UserService;
