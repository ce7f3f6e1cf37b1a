pub mod content_router;
pub mod cv_router;
pub mod search_router;
pub mod upload_router;
pub mod user_router;
