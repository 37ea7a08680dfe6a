use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub answer_index_url: String,
    pub answer_index_api_key: String,
    pub answer_index_name: String,
    pub answer_timeout_seconds: u64,
    pub answer_max_retries: u32,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a number"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:mentor_chat.db?mode=rwc".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "development-secret-key-change-in-production".to_string()),
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("ACCESS_TOKEN_TTL_MINUTES must be a number"),
            refresh_token_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("REFRESH_TOKEN_TTL_DAYS must be a number"),
            answer_index_url: env::var("ANSWER_INDEX_URL")
                .unwrap_or_else(|_| "https://api.cloud.llamaindex.ai".to_string()),
            answer_index_api_key: env::var("ANSWER_INDEX_API_KEY").unwrap_or_default(),
            answer_index_name: env::var("ANSWER_INDEX_NAME")
                .unwrap_or_else(|_| "leadership-chatbot".to_string()),
            answer_timeout_seconds: env::var("ANSWER_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("ANSWER_TIMEOUT_SECONDS must be a number"),
            answer_max_retries: env::var("ANSWER_MAX_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("ANSWER_MAX_RETRIES must be a number"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }
}
