use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::middleware::RateLimiter;
use crate::services::answer::AnswerGateway;

pub mod chat_item;
pub mod user;

pub use chat_item::*;
pub use user::*;

/// Application state shared across all handlers
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub answer_gateway: Arc<dyn AnswerGateway>,
    pub login_rate_limiter: Arc<RateLimiter>,
}
