pub mod post_dtos;
pub mod status_dtos;
