pub mod content_repo;
pub mod cv_profile_repo;
pub mod mongo;
pub mod repository_error;
pub mod text_query;
pub mod user_repo;
