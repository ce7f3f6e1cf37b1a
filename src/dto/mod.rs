pub mod content_dto;
pub mod cv_dto;
pub mod user_dto;
