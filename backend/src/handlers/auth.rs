use actix_web::{web, HttpResponse, Result};
use shared::{ApiError, ApiSuccess, AuthResponse, LoginRequest, RefreshResponse, SignupRequest};

use crate::middleware::auth as auth_middleware;
use crate::models::AppState;
use crate::services::auth as auth_service;
use crate::services::tokens::{self, TokenType};
use crate::services::validation;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/signup", web::post().to(signup))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .route("/me", web::get().to(me));
}

async fn signup(state: web::Data<AppState>, body: web::Json<SignupRequest>) -> Result<HttpResponse> {
    let request = body.into_inner();

    if let Err(e) = validation::validate_username(&request.username)
        .and_then(|_| validation::validate_email(&request.email))
        .and_then(|_| validation::validate_password(&request.password))
    {
        return Ok(HttpResponse::BadRequest().json(ApiError {
            error: "validation_error".to_string(),
            message: e.to_string(),
        }));
    }

    match auth_service::register_user(&state.db, &request).await {
        Ok(user) => Ok(HttpResponse::Created().json(ApiSuccess::new(user))),
        Err(auth_service::AuthError::UserAlreadyExists) => {
            Ok(HttpResponse::Conflict().json(ApiError {
                error: "conflict".to_string(),
                message: "Username or email already exists".to_string(),
            }))
        }
        Err(e) => {
            log::error!("Registration error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to create user".to_string(),
            }))
        }
    }
}

async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse> {
    let request = body.into_inner();

    if !state.login_rate_limiter.check(&request.username) {
        return Ok(HttpResponse::TooManyRequests().json(ApiError {
            error: "rate_limited".to_string(),
            message: "Too many login attempts, try again later".to_string(),
        }));
    }

    match auth_service::verify_credentials(&state.db, &request.username, &request.password).await {
        Ok(user) => {
            state.login_rate_limiter.clear(&request.username);
            match tokens::issue_token_pair(&user.id, &state.config) {
                Ok(pair) => Ok(HttpResponse::Ok().json(ApiSuccess::new(AuthResponse {
                    access_token: pair.access_token,
                    refresh_token: pair.refresh_token,
                    user,
                }))),
                Err(e) => {
                    log::error!("JWT creation error: {:?}", e);
                    Ok(HttpResponse::InternalServerError().json(ApiError {
                        error: "jwt_error".to_string(),
                        message: "Failed to create token".to_string(),
                    }))
                }
            }
        }
        Err(auth_service::AuthError::InvalidCredentials) => {
            state.login_rate_limiter.record(&request.username);
            Ok(HttpResponse::Unauthorized().json(ApiError {
                error: "authentication_error".to_string(),
                message: "Invalid username or password".to_string(),
            }))
        }
        Err(e) => {
            log::error!("Login error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to log in".to_string(),
            }))
        }
    }
}

async fn refresh(state: web::Data<AppState>, req: actix_web::HttpRequest) -> Result<HttpResponse> {
    let token = match auth_middleware::bearer_token(&req) {
        Ok(token) => token,
        Err(_) => {
            return Ok(HttpResponse::Unauthorized().json(ApiError {
                error: "unauthorized".to_string(),
                message: "Invalid or missing token".to_string(),
            }));
        }
    };

    match tokens::refresh_access_token(token, &state.config) {
        Ok(access_token) => {
            Ok(HttpResponse::Ok().json(ApiSuccess::new(RefreshResponse { access_token })))
        }
        Err(_) => Ok(HttpResponse::Unauthorized().json(ApiError {
            error: "unauthorized".to_string(),
            message: "Invalid or expired refresh token".to_string(),
        })),
    }
}

async fn me(state: web::Data<AppState>, req: actix_web::HttpRequest) -> Result<HttpResponse> {
    let user_id =
        match auth_middleware::extract_user_id(&req, &state.config.jwt_secret, TokenType::Access) {
            Ok(id) => id,
            Err(_) => {
                return Ok(HttpResponse::Unauthorized().json(ApiError {
                    error: "unauthorized".to_string(),
                    message: "Invalid or missing token".to_string(),
                }));
            }
        };

    match auth_service::get_user_by_id(&state.db, &user_id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiSuccess::new(user))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiError {
            error: "not_found".to_string(),
            message: "User not found".to_string(),
        })),
        Err(e) => {
            log::error!("Error fetching user: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to fetch user".to_string(),
            }))
        }
    }
}
