use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::config::{AppConfig, ConfigError, JwtConfig, MongoConfig, UploadConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::content_repo::{ContentRepository, MongoContentRepository};
use crate::repository::cv_profile_repo::{CvProfileRepository, MongoCvProfileRepository};
use crate::repository::mongo::{connect_database, ensure_indexes};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::{
    content_router::content_router, cv_router::cv_router, search_router::search_router,
    upload_router::upload_router, user_router::user_router,
};
use crate::service::content_service::ContentServiceImpl;
use crate::service::cv_service::CvServiceImpl;
use crate::service::interaction_service::InteractionServiceImpl;
use crate::service::search_service::SearchServiceImpl;
use crate::service::upload_service::UploadServiceImpl;
use crate::service::user_service::UserServiceImpl;
use crate::util::error::HandlerError;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::storage::{FileStorage, LocalFileStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid listen address: {0}")]
    Address(String),
}

/// Every service the routers hand out as state.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserServiceImpl>,
    pub contents: Arc<ContentServiceImpl>,
    pub interactions: Arc<InteractionServiceImpl>,
    pub search: Arc<SearchServiceImpl>,
    pub uploads: Arc<UploadServiceImpl>,
    pub cvs: Arc<CvServiceImpl>,
}

impl Services {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        content_repo: Arc<dyn ContentRepository>,
        cv_repo: Arc<dyn CvProfileRepository>,
        storage: Arc<dyn FileStorage>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
    ) -> Self {
        Services {
            users: Arc::new(UserServiceImpl::new(user_repo.clone(), jwt_utils, storage.clone())),
            contents: Arc::new(ContentServiceImpl::new(content_repo.clone(), user_repo.clone(), storage.clone())),
            interactions: Arc::new(InteractionServiceImpl::new(content_repo.clone(), user_repo.clone())),
            search: Arc::new(SearchServiceImpl::new(user_repo.clone(), content_repo)),
            uploads: Arc::new(UploadServiceImpl::new(storage)),
            cvs: Arc::new(CvServiceImpl::new(cv_repo, user_repo)),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(cors::Any).allow_headers(cors::Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();
    if parsed.is_empty() {
        layer.allow_origin(cors::Any)
    } else {
        layer.allow_origin(parsed)
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal", "message": "Internal server error", "details": null })),
    )
        .into_response()
}

async fn not_found_fallback() -> HandlerError {
    HandlerError::not_found("Route not found")
}

/// Builds the full HTTP surface. Tests call this with in-memory repositories.
pub fn create_router(
    services: &Services,
    auth_state: Arc<AuthState>,
    app_config: &AppConfig,
    upload_config: &UploadConfig,
) -> Router {
    let upload_limit = upload_config.body_limit();
    Router::new()
        .nest("/api/user", user_router(services.users.clone(), auth_state.clone(), upload_limit))
        .nest(
            "/api/contents",
            content_router(services.contents.clone(), services.interactions.clone(), auth_state.clone(), upload_limit),
        )
        .nest("/api/search", search_router(services.search.clone()))
        .nest("/api/uploads", upload_router(services.uploads.clone(), auth_state.clone(), upload_limit))
        .nest("/api/cv-profile", cv_router(services.cvs.clone(), auth_state))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest_service(&upload_config.public_prefix, ServeDir::new(&upload_config.upload_dir))
        .fallback(not_found_fallback)
        .layer(DefaultBodyLimit::max(app_config.json_body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app_config.cors_origins))
        .layer(CatchPanicLayer::custom(panic_response))
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, StartupError> {
        let config = AppConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let upload_config = UploadConfig::from_env()?;

        let db = connect_database(&mongo_config).await?;
        ensure_indexes(&db, &mongo_config).await?;

        let user_repo: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db, &mongo_config));
        let content_repo: Arc<dyn ContentRepository> = Arc::new(MongoContentRepository::new(&db, &mongo_config));
        let cv_repo: Arc<dyn CvProfileRepository> = Arc::new(MongoCvProfileRepository::new(&db, &mongo_config));
        let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(&upload_config)?);
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));

        let services = Services::new(user_repo, content_repo, cv_repo, storage, jwt_utils.clone());
        let auth_state = Arc::new(AuthState::new(jwt_utils));
        let router = create_router(&services, auth_state, &config, &upload_config);
        info!("Application initialised");
        Ok(App { config, router })
    }

    pub async fn start(self) -> Result<(), StartupError> {
        let host = self
            .config
            .host
            .parse()
            .map_err(|_| StartupError::Address(self.config.host.clone()))?;
        let addr = SocketAddr::new(host, self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
