use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

const RETRY_BASE_DELAY_MS: u64 = 250;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("Answer index timed out")]
    Timeout,
    #[error("Answer index error: {0}")]
    Upstream(String),
}

/// Capability interface over the external Q&A index.
#[async_trait]
pub trait AnswerGateway: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, AnswerError>;
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    index: &'a str,
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    answer: String,
}

enum AttemptError {
    Timeout,
    // Connect failures may be retried; anything else is surfaced as-is
    Transient(String),
    Fatal(String),
}

/// Reqwest-backed adapter for a hosted answer index.
///
/// Owns transport details only: request shaping, the per-request timeout,
/// HTTP error mapping, and JSON decoding of the answer payload.
pub struct HttpAnswerGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    index_name: String,
    max_retries: u32,
}

impl HttpAnswerGateway {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.answer_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: query_endpoint(&config.answer_index_url),
            api_key: config.answer_index_api_key.clone(),
            index_name: config.answer_index_name.clone(),
            max_retries: config.answer_max_retries,
        })
    }

    async fn send_query(&self, question: &str) -> Result<String, AttemptError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&QueryRequest {
                index: &self.index_name,
                question,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Fatal(format!(
                "index returned status {}",
                status
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Fatal(format!("invalid answer payload: {}", e)))?;

        Ok(body.answer)
    }
}

#[async_trait]
impl AnswerGateway for HttpAnswerGateway {
    async fn ask(&self, question: &str) -> Result<String, AnswerError> {
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
        let mut attempt: u32 = 0;

        loop {
            match self.send_query(question).await {
                Ok(answer) => return Ok(answer),
                Err(AttemptError::Transient(message)) if attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Answer index unreachable ({}), retry {}/{}",
                        message,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(AttemptError::Transient(message)) => {
                    return Err(AnswerError::Upstream(message))
                }
                Err(AttemptError::Timeout) => return Err(AnswerError::Timeout),
                Err(AttemptError::Fatal(message)) => return Err(AnswerError::Upstream(message)),
            }
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Timeout
    } else if error.is_connect() {
        AttemptError::Transient(format!("connect error: {}", error))
    } else {
        AttemptError::Fatal(format!("transport error: {}", error))
    }
}

fn query_endpoint(base_url: &str) -> String {
    format!("{}/query", base_url.trim_end_matches('/'))
}
