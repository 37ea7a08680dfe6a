use actix_web::{web, HttpResponse, Result};
use shared::{
    ApiError, ApiSuccess, AskQuestionRequest, AskQuestionResponse, ChatHistoryQuery,
    ChatHistoryResponse,
};
use uuid::Uuid;

use crate::middleware::auth as auth_middleware;
use crate::models::AppState;
use crate::services::answer::AnswerError;
use crate::services::auth as auth_service;
use crate::services::chat as chat_service;
use crate::services::tokens::TokenType;
use crate::services::validation;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ask-question", web::post().to(ask_question))
        .route("/chat-history", web::get().to(chat_history))
        .route("/chat-history/{chat_id}", web::get().to(chat_history_item));
}

/// Forward a question to the answer index and record the exchange.
///
/// Nothing is recorded when the upstream call fails.
async fn ask_question(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    body: web::Json<AskQuestionRequest>,
) -> Result<HttpResponse> {
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
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiError {
                error: "not_found".to_string(),
                message: "User not found".to_string(),
            }));
        }
        Err(e) => {
            log::error!("Error fetching user: {:?}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to fetch user".to_string(),
            }));
        }
    }

    let question = body.into_inner().question;
    let question = question.trim();

    if let Err(e) = validation::validate_question(question) {
        return Ok(HttpResponse::BadRequest().json(ApiError {
            error: "validation_error".to_string(),
            message: e.to_string(),
        }));
    }

    let answer = match state.answer_gateway.ask(question).await {
        Ok(answer) => answer,
        Err(AnswerError::Timeout) => {
            log::error!("Answer index timed out for user {}", user_id);
            return Ok(HttpResponse::GatewayTimeout().json(ApiError {
                error: "gateway_timeout".to_string(),
                message: "The answer service took too long to respond".to_string(),
            }));
        }
        Err(AnswerError::Upstream(detail)) => {
            log::error!("Answer index error for user {}: {}", user_id, detail);
            return Ok(HttpResponse::BadGateway().json(ApiError {
                error: "upstream_error".to_string(),
                message: "The answer service is unavailable".to_string(),
            }));
        }
    };

    match chat_service::record(&state.db, &user_id, question, &answer).await {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiSuccess::new(AskQuestionResponse {
            question: item.question,
            answer: item.answer,
            chat_id: item.id,
        }))),
        Err(e) => {
            log::error!("Error recording chat item: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to record chat item".to_string(),
            }))
        }
    }
}

/// List the authenticated user's chat history with pagination
async fn chat_history(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    query: web::Query<ChatHistoryQuery>,
) -> Result<HttpResponse> {
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

    // Out-of-range values fall back to the defaults
    let limit = query.limit.filter(|l| (1..=100).contains(l)).unwrap_or(10);
    let offset = query.offset.filter(|o| *o >= 0).unwrap_or(0);

    let items = match chat_service::list_for_user(&state.db, &user_id, limit, offset).await {
        Ok(items) => items,
        Err(e) => {
            log::error!("Error listing chat history: {:?}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to list chat history".to_string(),
            }));
        }
    };

    match chat_service::count_for_user(&state.db, &user_id).await {
        Ok(total) => Ok(HttpResponse::Ok().json(ApiSuccess::new(ChatHistoryResponse {
            chat_history: items,
            total,
            limit,
            offset,
        }))),
        Err(e) => {
            log::error!("Error counting chat history: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to list chat history".to_string(),
            }))
        }
    }
}

/// Fetch a single chat item owned by the authenticated user
async fn chat_history_item(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
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

    let chat_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiError {
                error: "invalid_id".to_string(),
                message: "Invalid chat item ID format".to_string(),
            }));
        }
    };

    match chat_service::get_for_user(&state.db, &user_id, &chat_id).await {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiSuccess::new(item))),
        Err(chat_service::ChatError::NotFound) => Ok(HttpResponse::NotFound().json(ApiError {
            error: "not_found".to_string(),
            message: "Chat item not found".to_string(),
        })),
        Err(e) => {
            log::error!("Error fetching chat item: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to fetch chat item".to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::handlers::test_support::{
        setup_test_db, test_config, FailingGateway, StaticGateway, TimeoutGateway,
    };
    use crate::middleware::RateLimiter;
    use crate::services::answer::AnswerGateway;

    async fn test_state(gateway: Arc<dyn AnswerGateway>) -> web::Data<AppState> {
        web::Data::new(AppState {
            db: setup_test_db().await,
            config: test_config(),
            answer_gateway: gateway,
            login_rate_limiter: Arc::new(RateLimiter::new(5, 15 * 60)),
        })
    }

    /// Sign up and log in a user through the API, returning an access token.
    async fn login_user(
        state: &web::Data<AppState>,
        username: &str,
        email: &str,
    ) -> String {
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_json(json!({
                "username": username,
                "email": email,
                "password": "Str0ng!pass"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"username": username, "password": "Str0ng!pass"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    #[actix_web::test]
    async fn test_ask_question_records_history() {
        let state = test_state(Arc::new(StaticGateway("Leadership is influence."))).await;
        let token = login_user(&state, "alice", "alice@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask-question")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"question": "What is leadership?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["question"], "What is leadership?");
        assert_eq!(body["data"]["answer"], "Leadership is influence.");
        let chat_id = body["data"]["chat_id"].as_str().unwrap().to_string();

        // History now contains exactly that one entry
        let req = test::TestRequest::get()
            .uri("/api/chat-history")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["chat_history"][0]["id"], chat_id.as_str());

        // The item is fetchable by id
        let req = test::TestRequest::get()
            .uri(&format!("/api/chat-history/{}", chat_id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["question"], "What is leadership?");
    }

    #[actix_web::test]
    async fn test_ask_question_requires_token() {
        let state = test_state(Arc::new(StaticGateway("answer"))).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask-question")
            .set_json(json!({"question": "What is leadership?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_ask_question_rejects_empty_question() {
        let state = test_state(Arc::new(StaticGateway("answer"))).await;
        let token = login_user(&state, "alice", "alice@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask-question")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"question": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_ask_question_timeout_records_nothing() {
        let state = test_state(Arc::new(TimeoutGateway)).await;
        let token = login_user(&state, "alice", "alice@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask-question")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"question": "What is leadership?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 504);

        let req = test::TestRequest::get()
            .uri("/api/chat-history")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total"], 0);
    }

    #[actix_web::test]
    async fn test_ask_question_upstream_error_bad_gateway() {
        let state = test_state(Arc::new(FailingGateway)).await;
        let token = login_user(&state, "alice", "alice@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask-question")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"question": "What is leadership?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 502);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "upstream_error");
        // Upstream detail is not leaked to the client
        assert_eq!(body["message"], "The answer service is unavailable");
    }

    #[actix_web::test]
    async fn test_chat_item_of_other_user_not_found() {
        let state = test_state(Arc::new(StaticGateway("answer"))).await;
        let alice_token = login_user(&state, "alice", "alice@example.com").await;
        let bob_token = login_user(&state, "bob", "bob@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask-question")
            .insert_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({"question": "What is leadership?"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        let chat_id = body["data"]["chat_id"].as_str().unwrap().to_string();

        // Bob gets NotFound for Alice's item, and an empty list
        let req = test::TestRequest::get()
            .uri(&format!("/api/chat-history/{}", chat_id))
            .insert_header(("Authorization", format!("Bearer {}", bob_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::get()
            .uri("/api/chat-history")
            .insert_header(("Authorization", format!("Bearer {}", bob_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total"], 0);
    }

    #[actix_web::test]
    async fn test_chat_item_invalid_id_bad_request() {
        let state = test_state(Arc::new(StaticGateway("answer"))).await;
        let token = login_user(&state, "alice", "alice@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/chat-history/not-a-uuid")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_chat_history_pagination_params() {
        let state = test_state(Arc::new(StaticGateway("answer"))).await;
        let token = login_user(&state, "alice", "alice@example.com").await;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::configure_routes),
        )
        .await;

        for i in 0..3 {
            let req = test::TestRequest::post()
                .uri("/api/ask-question")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .set_json(json!({ "question": format!("question {}?", i) }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
        }

        let req = test::TestRequest::get()
            .uri("/api/chat-history?limit=2&offset=1")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(body["data"]["total"], 3);
        assert_eq!(body["data"]["limit"], 2);
        assert_eq!(body["data"]["offset"], 1);
        assert_eq!(body["data"]["chat_history"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["chat_history"][0]["question"], "question 1?");

        // Out-of-range limit falls back to the default
        let req = test::TestRequest::get()
            .uri("/api/chat-history?limit=1000")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["limit"], 10);
    }
}
