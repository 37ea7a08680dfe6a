use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Wrong token type")]
    WrongTokenType,
    #[error("Invalid token subject")]
    InvalidSubject,
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign a token for the given user, valid for `ttl` from now.
pub fn create_token(
    user_id: &Uuid,
    token_type: TokenType,
    secret: &str,
    ttl: Duration,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let exp = now + ttl;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature, expiry, and token type, returning the user id.
///
/// Expiry is checked without leeway so a token is rejected the moment
/// its `exp` passes.
pub fn verify_token(
    token: &str,
    expected_type: TokenType,
    secret: &str,
) -> Result<Uuid, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    if token_data.claims.token_type != expected_type {
        return Err(TokenError::WrongTokenType);
    }

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| TokenError::InvalidSubject)
}

/// Issue an access/refresh token pair for a freshly authenticated user.
pub fn issue_token_pair(user_id: &Uuid, config: &Config) -> Result<TokenPair, TokenError> {
    let access_token = create_token(
        user_id,
        TokenType::Access,
        &config.jwt_secret,
        Duration::minutes(config.access_token_ttl_minutes),
    )?;
    let refresh_token = create_token(
        user_id,
        TokenType::Refresh,
        &config.jwt_secret,
        Duration::days(config.refresh_token_ttl_days),
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchange a valid refresh token for a new access token.
pub fn refresh_access_token(refresh_token: &str, config: &Config) -> Result<String, TokenError> {
    let user_id = verify_token(refresh_token, TokenType::Refresh, &config.jwt_secret)?;

    create_token(
        &user_id,
        TokenType::Access,
        &config.jwt_secret,
        Duration::minutes(config.access_token_ttl_minutes),
    )
}
