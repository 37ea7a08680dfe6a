use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ChatItemRow;
use shared::ChatItem;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat item not found")]
    NotFound,
    #[error("Question cannot be empty")]
    EmptyQuestion,
    #[error("Answer cannot be empty")]
    EmptyAnswer,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Append an immutable question/answer record for a user.
pub async fn record(
    pool: &SqlitePool,
    user_id: &Uuid,
    question: &str,
    answer: &str,
) -> Result<ChatItem, ChatError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ChatError::EmptyQuestion);
    }
    if answer.is_empty() {
        return Err(ChatError::EmptyAnswer);
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO chat_items (id, user_id, question, answer, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(question)
    .bind(answer)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ChatItem {
        id,
        user_id: *user_id,
        question: question.to_string(),
        answer: answer.to_string(),
        created_at: now,
    })
}

/// List a user's chat items in creation order with limit/offset pagination.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<ChatItem>, ChatError> {
    let rows: Vec<ChatItemRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, question, answer, created_at
        FROM chat_items
        WHERE user_id = ?
        ORDER BY created_at ASC, id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|r| r.to_shared()).collect())
}

pub async fn count_for_user(pool: &SqlitePool, user_id: &Uuid) -> Result<i64, ChatError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_items WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(total)
}

/// Fetch one chat item, scoped to its owner.
///
/// An item owned by another user reports NotFound.
pub async fn get_for_user(
    pool: &SqlitePool,
    user_id: &Uuid,
    chat_id: &Uuid,
) -> Result<ChatItem, ChatError> {
    let row: Option<ChatItemRow> = sqlx::query_as(
        "SELECT id, user_id, question, answer, created_at FROM chat_items WHERE id = ? AND user_id = ?",
    )
    .bind(chat_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.to_shared()).ok_or(ChatError::NotFound)
}
