use actix_web::HttpRequest;
use uuid::Uuid;

use crate::services::tokens::{self, TokenType};

/// Extract the raw Bearer token from the Authorization header.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, AuthMiddlewareError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or(AuthMiddlewareError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthMiddlewareError::InvalidToken)?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthMiddlewareError::InvalidToken)
}

/// Extract and verify the Bearer token from the Authorization header,
/// returning the user ID it was issued for.
pub fn extract_user_id(
    req: &HttpRequest,
    jwt_secret: &str,
    expected_type: TokenType,
) -> Result<Uuid, AuthMiddlewareError> {
    let token = bearer_token(req)?;

    tokens::verify_token(token, expected_type, jwt_secret)
        .map_err(|_| AuthMiddlewareError::InvalidToken)
}

#[derive(Debug)]
pub enum AuthMiddlewareError {
    MissingToken,
    InvalidToken,
}

impl std::fmt::Display for AuthMiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMiddlewareError::MissingToken => write!(f, "Missing authorization token"),
            AuthMiddlewareError::InvalidToken => write!(f, "Invalid authorization token"),
        }
    }
}

impl std::error::Error for AuthMiddlewareError {}
