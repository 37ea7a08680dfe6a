use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for recorded question/answer exchanges
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatItemRow {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl ChatItemRow {
    pub fn to_shared(&self) -> shared::ChatItem {
        shared::ChatItem {
            id: Uuid::parse_str(&self.id).unwrap(),
            user_id: Uuid::parse_str(&self.user_id).unwrap(),
            question: self.question.clone(),
            answer: self.answer.clone(),
            created_at: self.created_at,
        }
    }
}
