use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::answer::{AnswerError, AnswerGateway};

/// In-memory database with the production schema, single connection so
/// every query sees the same memory store.
pub async fn setup_test_db() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_items (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(id),
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8080,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        access_token_ttl_minutes: 15,
        refresh_token_ttl_days: 7,
        answer_index_url: "https://index.example.com".to_string(),
        answer_index_api_key: String::new(),
        answer_index_name: "test-index".to_string(),
        answer_timeout_seconds: 5,
        answer_max_retries: 0,
        cors_origins: vec![],
    }
}

/// Gateway double for tests that never reach the ask-question flow.
pub struct NoopGateway;

#[async_trait]
impl AnswerGateway for NoopGateway {
    async fn ask(&self, _question: &str) -> Result<String, AnswerError> {
        Err(AnswerError::Upstream("no gateway in this test".to_string()))
    }
}

/// Gateway double returning a fixed answer.
pub struct StaticGateway(pub &'static str);

#[async_trait]
impl AnswerGateway for StaticGateway {
    async fn ask(&self, _question: &str) -> Result<String, AnswerError> {
        Ok(self.0.to_string())
    }
}

/// Gateway double that always times out.
pub struct TimeoutGateway;

#[async_trait]
impl AnswerGateway for TimeoutGateway {
    async fn ask(&self, _question: &str) -> Result<String, AnswerError> {
        Err(AnswerError::Timeout)
    }
}

/// Gateway double that always fails upstream.
pub struct FailingGateway;

#[async_trait]
impl AnswerGateway for FailingGateway {
    async fn ask(&self, _question: &str) -> Result<String, AnswerError> {
        Err(AnswerError::Upstream("index returned status 500".to_string()))
    }
}
