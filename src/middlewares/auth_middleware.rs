use std::str::FromStr;
use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use bson::oid::ObjectId;
use tracing::{debug, warn};

use crate::util::error::HandlerError;
use crate::util::jwt::{JwtError, JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl AuthState {
    pub fn new(jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self { jwt_utils }
    }
}

/// Caller identity placed in the request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub email: String,
    pub role: String,
}

pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| HandlerError::unauthorized("Access denied. No token provided."))?;

    let token = state
        .jwt_utils
        .extract_token_from_header(header)
        .map_err(|e| HandlerError::unauthorized(e.to_string()))?;

    let claims = state.jwt_utils.validate_access_token(token).map_err(|e| {
        debug!("Rejected access token: {e}");
        match e {
            JwtError::TokenExpired => HandlerError::unauthorized(e.to_string()),
            _ => HandlerError::unauthorized("Invalid token."),
        }
    })?;

    let id = ObjectId::from_str(&claims.sub).map_err(|_| {
        warn!(sub = %claims.sub, "Token subject is not an ObjectId");
        HandlerError::unauthorized("Invalid token.")
    })?;

    req.extensions_mut().insert(AuthUser { id, email: claims.email, role: claims.role });
    Ok(next.run(req).await)
}
