pub mod answer;
pub mod auth;
pub mod chat;
pub mod tokens;
pub mod validation;
